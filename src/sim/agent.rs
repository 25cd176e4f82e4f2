//! Simulated entities: enemies, player characters and static obstacles
//!
//! One struct covers all three; `kind` decides how neighbours treat it and
//! whether it moves at all.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::arena::Handle;
use super::collider::Collider;
use super::formation::Loadout;
use super::steering::{AgentView, BehaviorData, Neighbor, PrioritySteering, SteeringOutput};
use super::vector::clamp_length;
use crate::consts::AGENT_RADIUS;
use crate::normalize_angle;

/// Object-type tag seen by neighbours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Steered enemy
    Agent,
    /// Player character (formation target)
    Player,
    /// Static axis-aligned wall
    Obstacle,
}

/// A steerable (or static) entity
#[derive(Debug, Clone)]
pub struct Agent {
    pub kind: ObjectKind,
    pub position: Vec2,
    /// Heading in radians, kept in [-π, π)
    pub orientation: f32,
    pub velocity: Vec2,
    /// Angular velocity (radians/s)
    pub rotation: f32,
    pub collider: Collider,
    pub data: BehaviorData,
    pub steering: PrioritySteering,
    /// Equipped weapon, used for formation slot costs
    pub loadout: Loadout,
    /// Spatial-query result from the start of the current tick
    pub neighbors: Vec<Neighbor>,
}

impl Agent {
    /// Enemy with a circular collider and the chaser priority list
    pub fn enemy(position: Vec2, data: BehaviorData, loadout: Loadout) -> Self {
        Self {
            kind: ObjectKind::Agent,
            position,
            orientation: 0.0,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            collider: Collider::circle(position, AGENT_RADIUS),
            data,
            steering: PrioritySteering::chaser(),
            loadout,
            neighbors: Vec::new(),
        }
    }

    /// Player character; moved by whatever steering the caller installs
    pub fn player(position: Vec2, data: BehaviorData) -> Self {
        Self {
            kind: ObjectKind::Player,
            steering: PrioritySteering::default(),
            loadout: Loadout::Unarmed,
            ..Self::enemy(position, data, Loadout::Unarmed)
        }
    }

    /// Static box obstacle of full size `width` x `height`
    pub fn obstacle(position: Vec2, width: f32, height: f32) -> Self {
        Self {
            kind: ObjectKind::Obstacle,
            collider: Collider::aabb(position, width, height),
            steering: PrioritySteering::default(),
            loadout: Loadout::Unarmed,
            ..Self::enemy(position, BehaviorData::default(), Loadout::Unarmed)
        }
    }

    #[must_use]
    pub fn with_steering(mut self, steering: PrioritySteering) -> Self {
        self.steering = steering;
        self
    }

    /// Obstacles never move
    #[inline]
    pub fn is_static(&self) -> bool {
        self.kind == ObjectKind::Obstacle
    }

    /// Neighbour record other agents see for this one
    pub fn as_neighbor(&self, handle: Handle) -> Neighbor {
        Neighbor {
            handle,
            kind: self.kind,
            position: self.position,
            velocity: self.velocity,
            collider: self.collider,
        }
    }

    /// Run this agent's priority list against its cached neighbours
    pub fn steer<R: Rng>(&mut self, handle: Handle, rng: &mut R) -> SteeringOutput {
        if self.is_static() {
            return SteeringOutput::ZERO;
        }
        let view = AgentView {
            handle: Some(handle),
            position: self.position,
            orientation: self.orientation,
            velocity: self.velocity,
            rotation: self.rotation,
            collider: self.collider,
            neighbors: &self.neighbors,
        };
        self.steering.steer(&mut self.data, &view, rng)
    }

    /// Explicit Euler: advance position/orientation with the current
    /// velocities, then apply the steering accelerations
    ///
    /// Speed is capped at `max_speed` and rotation at `max_rotation`.
    pub fn integrate(&mut self, steering: &SteeringOutput, dt: f32) {
        if self.is_static() {
            return;
        }

        self.position += self.velocity * dt;
        self.orientation = normalize_angle(self.orientation + self.rotation * dt);

        self.velocity = clamp_length(self.velocity + steering.linear * dt, self.data.max_speed);
        self.rotation = (self.rotation + steering.angular * dt)
            .clamp(-self.data.max_rotation, self.data.max_rotation);

        self.collider.position = self.position;
    }

    /// Snap the collider back onto the entity (after external moves)
    pub fn sync_collider(&mut self) {
        self.collider.position = self.position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrate_moves_and_clamps() {
        let data = BehaviorData {
            max_speed: 10.0,
            ..Default::default()
        };
        let mut agent = Agent::enemy(Vec2::ZERO, data, Loadout::Sword);
        agent.velocity = Vec2::new(5.0, 0.0);

        let push = SteeringOutput {
            linear: Vec2::new(1000.0, 0.0),
            angular: 1000.0,
        };
        agent.integrate(&push, 0.5);

        // Position moves with the pre-step velocity
        assert!((agent.position.x - 2.5).abs() < 1e-5);
        assert!((agent.velocity.length() - 10.0).abs() < 1e-4);
        assert!(agent.rotation <= agent.data.max_rotation);
        assert_eq!(agent.collider.position, agent.position);
    }

    #[test]
    fn test_orientation_stays_wrapped() {
        let mut agent = Agent::enemy(Vec2::ZERO, BehaviorData::default(), Loadout::Sword);
        agent.rotation = agent.data.max_rotation;
        for _ in 0..100 {
            agent.integrate(&SteeringOutput::ZERO, 0.1);
        }
        assert!(agent.orientation >= -std::f32::consts::PI);
        assert!(agent.orientation < std::f32::consts::PI);
    }

    #[test]
    fn test_obstacle_never_moves() {
        let mut wall = Agent::obstacle(Vec2::new(5.0, 5.0), 10.0, 10.0);
        wall.velocity = Vec2::new(100.0, 0.0);
        wall.integrate(
            &SteeringOutput {
                linear: Vec2::X,
                angular: 1.0,
            },
            1.0,
        );
        assert_eq!(wall.position, Vec2::new(5.0, 5.0));
        assert!(wall.is_static());
    }
}
