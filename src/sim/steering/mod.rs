//! Steering behaviors
//!
//! Every behavior is a plain function of the agent's tunables
//! (`BehaviorData`) and a read-only snapshot of the agent (`AgentView`),
//! returning a fresh `SteeringOutput`. Scratch values live on the stack, so a
//! single `Behavior` value can be shared by any number of agents. The only
//! agent state a behavior writes is the wander heading in `BehaviorData`.

mod avoidance;
mod group;
mod kinematic;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::agent::ObjectKind;
use super::arena::Handle;
use super::collider::Collider;

pub use avoidance::{collision_avoidance, obstacle_avoidance, separation};
pub use group::{BlendGroup, PrioritySteering};
pub use kinematic::{
    align, align_to, arrive, arrive_target_speed, evade, face, face_towards, flee, look_where_going,
    pursue, seek, seek_towards, velocity_match, wander,
};

/// Requested change in motion for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SteeringOutput {
    /// Linear acceleration
    pub linear: Vec2,
    /// Angular acceleration (radians/s²)
    pub angular: f32,
}

impl SteeringOutput {
    pub const ZERO: Self = Self {
        linear: Vec2::ZERO,
        angular: 0.0,
    };

    pub fn linear(linear: Vec2) -> Self {
        Self {
            linear,
            angular: 0.0,
        }
    }

    pub fn angular(angular: f32) -> Self {
        Self {
            linear: Vec2::ZERO,
            angular,
        }
    }

    /// Component-wise sum
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        Self {
            linear: self.linear + other.linear,
            angular: self.angular + other.angular,
        }
    }

    /// Scale both components
    #[must_use]
    pub fn scale(self, factor: f32) -> Self {
        Self {
            linear: self.linear * factor,
            angular: self.angular * factor,
        }
    }

    /// True when either component is above `epsilon`
    pub fn exceeds(&self, epsilon: f32) -> bool {
        self.linear.length() > epsilon || self.angular.abs() > epsilon
    }
}

/// Per-agent steering tunables and targets
///
/// Set at spawn from settings, retargeted by formation managers and AI, read
/// by every behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorData {
    // === Targets ===
    pub target_position: Vec2,
    pub target_orientation: f32,
    pub target_velocity: Vec2,

    // === Limits ===
    pub max_speed: f32,
    pub max_linear_acceleration: f32,
    /// Maximum rotation rate (radians/s)
    pub max_rotation: f32,
    pub max_angular_acceleration: f32,

    // === Arrive / Align ===
    pub linear_target_radius: f32,
    pub linear_slow_down_radius: f32,
    pub angular_target_radius: f32,
    pub angular_slow_down_radius: f32,
    /// Seconds over which to reach the target speed/rotation
    pub time_to_target: f32,

    // === Pursue / Evade ===
    pub max_prediction: f32,

    // === Separation ===
    pub separation_threshold: f32,
    pub decay_coefficient: f32,

    // === Wander ===
    pub wander_offset: f32,
    pub wander_radius: f32,
    pub wander_rate: f32,
    /// Accumulated wander heading, relative to the agent
    pub wander_orientation: f32,

    // === Obstacle avoidance ===
    pub look_ahead: f32,
    pub avoid_distance: f32,
}

impl Default for BehaviorData {
    fn default() -> Self {
        Self {
            target_position: Vec2::ZERO,
            target_orientation: 0.0,
            target_velocity: Vec2::ZERO,

            max_speed: 120.0,
            max_linear_acceleration: 400.0,
            max_rotation: std::f32::consts::TAU,
            max_angular_acceleration: 20.0,

            linear_target_radius: 4.0,
            linear_slow_down_radius: 64.0,
            angular_target_radius: 0.02,
            angular_slow_down_radius: 0.5,
            time_to_target: 0.1,

            max_prediction: 1.0,

            separation_threshold: 40.0,
            decay_coefficient: 20_000.0,

            wander_offset: 60.0,
            wander_radius: 30.0,
            wander_rate: 0.6,
            wander_orientation: 0.0,

            look_ahead: 120.0,
            avoid_distance: 40.0,
        }
    }
}

/// Snapshot of one spatial-query result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub handle: Handle,
    pub kind: ObjectKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub collider: Collider,
}

/// Read-only view of the agent being steered
#[derive(Debug, Clone, Copy)]
pub struct AgentView<'a> {
    pub handle: Option<Handle>,
    pub position: Vec2,
    pub orientation: f32,
    pub velocity: Vec2,
    /// Angular velocity (radians/s)
    pub rotation: f32,
    pub collider: Collider,
    /// This tick's spatial-query result, excluding the agent itself
    pub neighbors: &'a [Neighbor],
}

impl<'a> AgentView<'a> {
    /// View with no neighbors, handy for isolated evaluation
    pub fn new(position: Vec2, orientation: f32, velocity: Vec2, rotation: f32) -> Self {
        Self {
            handle: None,
            position,
            orientation,
            velocity,
            rotation,
            collider: Collider::circle(position, 0.0),
            neighbors: &[],
        }
    }

    /// Neighbors other than this agent
    pub fn others(&self) -> impl Iterator<Item = &'a Neighbor> + '_ {
        let me = self.handle;
        self.neighbors
            .iter()
            .filter(move |n| me != Some(n.handle))
    }
}

/// The closed set of steering behaviors
///
/// Behaviors carry no state; everything they read comes from `BehaviorData`
/// and `AgentView`. A variant doubles as the name groups use to add, remove
/// or replace it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Behavior {
    /// Rotate to `target_orientation`
    Align,
    /// Rotate to look at `target_position`
    Face,
    /// Rotate to face along the current velocity
    LookWhereYoureGoing,
    /// Move to `target_position`, slowing down on approach
    Arrive,
    Seek,
    Flee,
    /// Seek the predicted position of a target moving at `target_velocity`
    Pursue,
    Evade,
    /// Push away from close agents
    Separation,
    /// Steer away from the soonest predicted agent collision
    CollisionAvoidance,
    /// Detour around boxes found by forward rays
    ObstacleAvoidance,
    /// Match `target_velocity`
    VelocityMatch,
    Wander,
}

impl Behavior {
    /// Evaluate this behavior for one agent
    ///
    /// Only `Wander` touches `data` (its heading) or the RNG.
    pub fn steer<R: Rng>(
        self,
        data: &mut BehaviorData,
        view: &AgentView,
        rng: &mut R,
    ) -> SteeringOutput {
        match self {
            Behavior::Align => align(data, view),
            Behavior::Face => face(data, view),
            Behavior::LookWhereYoureGoing => look_where_going(data, view),
            Behavior::Arrive => arrive(data, view),
            Behavior::Seek => seek(data, view),
            Behavior::Flee => flee(data, view),
            Behavior::Pursue => pursue(data, view),
            Behavior::Evade => evade(data, view),
            Behavior::Separation => separation(data, view),
            Behavior::CollisionAvoidance => collision_avoidance(data, view),
            Behavior::ObstacleAvoidance => obstacle_avoidance(data, view),
            Behavior::VelocityMatch => velocity_match(data, view),
            Behavior::Wander => wander(data, view, rng),
        }
    }
}
