//! Neighbour-driven behaviors: separation, collision avoidance and obstacle
//! avoidance. All three only look at this tick's spatial-query snapshot.

use glam::Vec2;
use std::f32::consts::FRAC_PI_4;

use super::kinematic::seek_towards;
use super::{AgentView, BehaviorData, Neighbor, SteeringOutput};
use crate::sim::agent::ObjectKind;
use crate::sim::raycast::{Ray, RayHit, cast_ray};
use crate::sim::vector::{VecExt, clamp_length};

/// Enemies and the player both count as bodies to keep clear of
fn is_body(neighbor: &Neighbor) -> bool {
    matches!(neighbor.kind, ObjectKind::Agent | ObjectKind::Player)
}

/// Whisker rays are this fraction of the forward ray
const WHISKER_SCALE: f32 = 0.75;

/// Predicted misses closer than this are treated as dead-centre hits
const MIN_MISS_DISTANCE: f32 = 1.0e-3;

/// Inverse-square push away from every body closer than the threshold
///
/// Each neighbour's push is capped at `max_linear_acceleration`, and so is the
/// summed push.
pub fn separation(data: &BehaviorData, view: &AgentView) -> SteeringOutput {
    let threshold_sq = data.separation_threshold * data.separation_threshold;
    let mut linear = Vec2::ZERO;

    for other in view.others().filter(|n| is_body(n)) {
        let away = view.position - other.position;
        let distance_sq = away.length_squared();
        if distance_sq >= threshold_sq || distance_sq <= f32::EPSILON {
            continue;
        }
        let strength = (data.decay_coefficient / distance_sq).min(data.max_linear_acceleration);
        linear += away.normalized() * strength;
    }

    SteeringOutput::linear(clamp_length(linear, data.max_linear_acceleration))
}

/// Steer away from the body we will hit soonest
pub fn collision_avoidance(data: &BehaviorData, view: &AgentView) -> SteeringOutput {
    let my_radius = view.collider.bounding_radius();

    // (time, relative position now, relative position at closest approach, combined radius)
    let mut soonest: Option<(f32, Vec2, Vec2, f32)> = None;

    for other in view.others().filter(|n| is_body(n)) {
        let relative_position = other.position - view.position;
        let relative_velocity = other.velocity - view.velocity;
        let relative_speed_sq = relative_velocity.length_squared();
        if relative_speed_sq <= f32::EPSILON {
            continue;
        }

        let time = -relative_position.dot(relative_velocity) / relative_speed_sq;
        if time <= 0.0 {
            continue;
        }

        let radii = my_radius + other.collider.bounding_radius();
        let at_closest = relative_position + relative_velocity * time;
        if at_closest.length() >= radii {
            continue;
        }

        if soonest.is_none_or(|(best, ..)| time < best) {
            soonest = Some((time, relative_position, at_closest, radii));
        }
    }

    let Some((_, relative_position, at_closest, radii)) = soonest else {
        return SteeringOutput::ZERO;
    };

    // Overlapping already, or a dead-centre hit: push apart along where they are now
    let relative = if relative_position.length() < radii || at_closest.length() <= MIN_MISS_DISTANCE {
        relative_position
    } else {
        at_closest
    };

    SteeringOutput::linear(-relative.normalized() * data.max_linear_acceleration)
}

/// Cast a forward ray and two whiskers; detour around the first box hit
pub fn obstacle_avoidance(data: &BehaviorData, view: &AgentView) -> SteeringOutput {
    let forward = view.velocity.normalized();
    if forward == Vec2::ZERO || data.look_ahead <= 0.0 {
        return SteeringOutput::ZERO;
    }

    let obstacles: Vec<_> = view
        .others()
        .filter(|n| n.kind == ObjectKind::Obstacle)
        .map(|n| n.collider)
        .collect();
    if obstacles.is_empty() {
        return SteeringOutput::ZERO;
    }

    let whisker = data.look_ahead * WHISKER_SCALE;
    let rays = [
        Ray::new(view.position, forward, data.look_ahead),
        Ray::new(view.position, forward.rotated(FRAC_PI_4), whisker),
        Ray::new(view.position, forward.rotated(-FRAC_PI_4), whisker),
    ];

    let hit: Option<RayHit> = rays.iter().find_map(|ray| cast_ray(ray, obstacles.iter()));
    match hit {
        Some(hit) => {
            let detour = hit.point + hit.normal * data.avoid_distance;
            seek_towards(data, view, detour, false)
        }
        None => SteeringOutput::ZERO,
    }
}
