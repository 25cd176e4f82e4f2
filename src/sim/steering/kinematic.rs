//! Target-seeking behaviors: orientation (align, face) and position (arrive,
//! seek, pursue) plus wander.

use glam::Vec2;
use rand::Rng;

use super::{AgentView, BehaviorData, SteeringOutput};
use crate::sim::vector::{VecExt, clamp_length};
use crate::{normalize_angle, orientation_to_vec};

/// Floor for `time_to_target` so the division below stays finite
const MIN_TIME_TO_TARGET: f32 = 1.0e-3;

#[inline]
fn time_to_target(data: &BehaviorData) -> f32 {
    data.time_to_target.max(MIN_TIME_TO_TARGET)
}

/// Rotate toward an explicit orientation
pub fn align_to(data: &BehaviorData, view: &AgentView, target_orientation: f32) -> SteeringOutput {
    let rotation = normalize_angle(target_orientation - view.orientation);
    let size = rotation.abs();
    if size < data.angular_target_radius {
        return SteeringOutput::ZERO;
    }

    let target_rotation = if size > data.angular_slow_down_radius {
        data.max_rotation
    } else {
        data.max_rotation * size / data.angular_slow_down_radius.max(f32::EPSILON)
    } * rotation.signum();

    let angular = ((target_rotation - view.rotation) / time_to_target(data)).clamp(
        -data.max_angular_acceleration,
        data.max_angular_acceleration,
    );
    SteeringOutput::angular(angular)
}

/// Rotate toward `data.target_orientation`
pub fn align(data: &BehaviorData, view: &AgentView) -> SteeringOutput {
    align_to(data, view, data.target_orientation)
}

/// Rotate to look at an explicit point
pub fn face_towards(data: &BehaviorData, view: &AgentView, target: Vec2) -> SteeringOutput {
    let direction = target - view.position;
    if direction == Vec2::ZERO {
        return SteeringOutput::ZERO;
    }
    align_to(data, view, direction.orientation())
}

/// Rotate to look at `data.target_position`
pub fn face(data: &BehaviorData, view: &AgentView) -> SteeringOutput {
    face_towards(data, view, data.target_position)
}

/// Rotate to face along the current velocity
pub fn look_where_going(data: &BehaviorData, view: &AgentView) -> SteeringOutput {
    if view.velocity == Vec2::ZERO {
        return SteeringOutput::ZERO;
    }
    align_to(data, view, view.velocity.orientation())
}

/// Desired speed at `distance` from the target, before acceleration clamping
///
/// `None` inside the target radius (already arrived).
pub fn arrive_target_speed(data: &BehaviorData, distance: f32) -> Option<f32> {
    if distance < data.linear_target_radius {
        return None;
    }
    if distance > data.linear_slow_down_radius {
        Some(data.max_speed)
    } else {
        Some(data.max_speed * distance / data.linear_slow_down_radius.max(f32::EPSILON))
    }
}

/// Move to `data.target_position`, slowing inside the slow-down radius
pub fn arrive(data: &BehaviorData, view: &AgentView) -> SteeringOutput {
    let direction = data.target_position - view.position;
    let Some(target_speed) = arrive_target_speed(data, direction.length()) else {
        return SteeringOutput::ZERO;
    };

    let target_velocity = direction.normalized() * target_speed;
    let linear = (target_velocity - view.velocity) / time_to_target(data);
    SteeringOutput::linear(clamp_length(linear, data.max_linear_acceleration))
}

/// Full acceleration toward (or away from) `target`
///
/// The result is additionally capped at `max_speed`.
pub fn seek_towards(data: &BehaviorData, view: &AgentView, target: Vec2, away: bool) -> SteeringOutput {
    let mut direction = (target - view.position).normalized();
    if away {
        direction = -direction;
    }
    let linear = direction * data.max_linear_acceleration;
    SteeringOutput::linear(clamp_length(linear, data.max_speed))
}

pub fn seek(data: &BehaviorData, view: &AgentView) -> SteeringOutput {
    seek_towards(data, view, data.target_position, false)
}

pub fn flee(data: &BehaviorData, view: &AgentView) -> SteeringOutput {
    seek_towards(data, view, data.target_position, true)
}

/// Where the target will be by the time we could reach it
fn predicted_target(data: &BehaviorData, view: &AgentView) -> Vec2 {
    let distance = (data.target_position - view.position).length();
    let speed = view.velocity.length();
    let prediction = if speed <= distance / data.max_prediction.max(f32::EPSILON) {
        data.max_prediction
    } else {
        distance / speed
    };
    data.target_position + data.target_velocity * prediction
}

/// Seek the predicted target position
pub fn pursue(data: &BehaviorData, view: &AgentView) -> SteeringOutput {
    seek_towards(data, view, predicted_target(data, view), false)
}

/// Flee the predicted target position
pub fn evade(data: &BehaviorData, view: &AgentView) -> SteeringOutput {
    seek_towards(data, view, predicted_target(data, view), true)
}

/// Accelerate toward `data.target_velocity`
pub fn velocity_match(data: &BehaviorData, view: &AgentView) -> SteeringOutput {
    let linear = (data.target_velocity - view.velocity) / time_to_target(data);
    SteeringOutput::linear(clamp_length(linear, data.max_linear_acceleration))
}

/// Random walk of a target on a circle ahead of the agent
///
/// The heading perturbation accumulates in `data.wander_orientation`.
pub fn wander<R: Rng>(data: &mut BehaviorData, view: &AgentView, rng: &mut R) -> SteeringOutput {
    let binomial = rng.random::<f32>() - rng.random::<f32>();
    data.wander_orientation = normalize_angle(data.wander_orientation + binomial * data.wander_rate);

    let heading = orientation_to_vec(view.orientation);
    let target_orientation = data.wander_orientation + view.orientation;
    let center = view.position + heading * data.wander_offset;
    let target = center + orientation_to_vec(target_orientation) * data.wander_radius;

    let mut output = face_towards(data, view, target);
    output.linear = heading * data.max_linear_acceleration;
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn data_toward(target: Vec2) -> BehaviorData {
        BehaviorData {
            target_position: target,
            ..Default::default()
        }
    }

    #[test]
    fn test_arrive_full_throttle_when_far() {
        let data = BehaviorData {
            target_position: Vec2::new(1000.0, 0.0),
            max_speed: 50.0,
            linear_slow_down_radius: 50.0,
            max_linear_acceleration: 30.0,
            ..Default::default()
        };
        let view = AgentView::new(Vec2::ZERO, 0.0, Vec2::ZERO, 0.0);

        assert_eq!(arrive_target_speed(&data, 1000.0), Some(50.0));
        let out = arrive(&data, &view);
        assert!((out.linear.length() - 30.0).abs() < 1e-3);
        assert!(out.linear.x > 0.0);
        assert!(out.linear.y.abs() < 1e-6);
    }

    #[test]
    fn test_arrive_stops_inside_target_radius() {
        let data = data_toward(Vec2::new(2.0, 0.0));
        let view = AgentView::new(Vec2::ZERO, 0.0, Vec2::new(5.0, 5.0), 0.0);
        assert_eq!(arrive(&data, &view), SteeringOutput::ZERO);
        assert_eq!(arrive_target_speed(&data, 2.0), None);
    }

    #[test]
    fn test_arrive_slows_inside_slow_radius() {
        let data = data_toward(Vec2::new(32.0, 0.0));
        let speed = arrive_target_speed(&data, 32.0).unwrap();
        assert!((speed - data.max_speed * 0.5).abs() < 1e-3);

        // Moving too fast toward the target means braking
        let view = AgentView::new(Vec2::ZERO, 0.0, Vec2::new(data.max_speed, 0.0), 0.0);
        assert!(arrive(&data, &view).linear.x < 0.0);
    }

    #[test]
    fn test_align_within_target_radius_is_zero() {
        let data = BehaviorData {
            target_orientation: 0.01,
            ..Default::default()
        };
        let view = AgentView::new(Vec2::ZERO, 0.0, Vec2::ZERO, 0.0);
        assert_eq!(align(&data, &view), SteeringOutput::ZERO);
    }

    #[test]
    fn test_align_takes_short_way_round() {
        // From just below +π to just above -π is a small positive turn
        let data = BehaviorData {
            target_orientation: -PI + 0.3,
            ..Default::default()
        };
        let view = AgentView::new(Vec2::ZERO, PI - 0.3, Vec2::ZERO, 0.0);
        let out = align(&data, &view);
        assert!(out.angular > 0.0);
        assert!(out.angular <= data.max_angular_acceleration);
    }

    #[test]
    fn test_face_zero_direction_is_noop() {
        let data = data_toward(Vec2::new(5.0, 5.0));
        let view = AgentView::new(Vec2::new(5.0, 5.0), 1.0, Vec2::ZERO, 0.0);
        assert_eq!(face(&data, &view), SteeringOutput::ZERO);
    }

    #[test]
    fn test_face_turns_toward_target() {
        let data = data_toward(Vec2::new(0.0, 100.0));
        let view = AgentView::new(Vec2::ZERO, 0.0, Vec2::ZERO, 0.0);
        assert!(face(&data, &view).angular > 0.0);

        let view = AgentView::new(Vec2::ZERO, PI, Vec2::ZERO, 0.0);
        assert!(face(&data, &view).angular < 0.0);
    }

    #[test]
    fn test_look_where_going() {
        let data = BehaviorData::default();
        let still = AgentView::new(Vec2::ZERO, 0.0, Vec2::ZERO, 0.0);
        assert_eq!(look_where_going(&data, &still), SteeringOutput::ZERO);

        let moving = AgentView::new(Vec2::ZERO, 0.0, Vec2::new(0.0, -10.0), 0.0);
        assert!(look_where_going(&data, &moving).angular < 0.0);
    }

    #[test]
    fn test_seek_and_flee_are_opposite() {
        let data = data_toward(Vec2::new(100.0, 0.0));
        let view = AgentView::new(Vec2::ZERO, 0.0, Vec2::ZERO, 0.0);
        let s = seek(&data, &view);
        let f = flee(&data, &view);
        assert!(s.linear.x > 0.0);
        assert!((s.linear + f.linear).length() < 1e-4);
        assert!(s.linear.length() <= data.max_speed + 1e-3);
    }

    #[test]
    fn test_pursue_leads_moving_target() {
        let data = BehaviorData {
            target_position: Vec2::new(100.0, 0.0),
            target_velocity: Vec2::new(0.0, 100.0),
            ..Default::default()
        };
        let view = AgentView::new(Vec2::ZERO, 0.0, Vec2::ZERO, 0.0);
        let p = pursue(&data, &view);
        // Predicted point is above the target, so the steer has +y
        assert!(p.linear.y > 0.0);
        let e = evade(&data, &view);
        assert!(e.linear.y < 0.0);
    }

    #[test]
    fn test_velocity_match() {
        let data = BehaviorData {
            target_velocity: Vec2::new(10.0, 0.0),
            ..Default::default()
        };
        let view = AgentView::new(Vec2::ZERO, 0.0, Vec2::new(10.0, 0.0), 0.0);
        assert_eq!(velocity_match(&data, &view), SteeringOutput::ZERO);

        let view = AgentView::new(Vec2::ZERO, 0.0, Vec2::ZERO, 0.0);
        assert!(velocity_match(&data, &view).linear.x > 0.0);
    }

    #[test]
    fn test_wander_moves_forward_and_accumulates() {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut data = BehaviorData::default();
        let view = AgentView::new(Vec2::ZERO, FRAC_PI_2, Vec2::ZERO, 0.0);

        let out = wander(&mut data, &view, &mut rng);
        assert!(out.linear.x.abs() < 1e-3);
        assert!((out.linear.y - data.max_linear_acceleration).abs() < 1e-3);

        let before = data.wander_orientation;
        for _ in 0..10 {
            wander(&mut data, &view, &mut rng);
        }
        assert_ne!(before, data.wander_orientation);
        assert!(data.wander_orientation.abs() <= PI);
    }
}
