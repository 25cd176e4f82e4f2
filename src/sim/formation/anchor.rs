//! The point a formation is laid out around

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::vector::VecExt;

/// Moves at constant speed toward its target, turning to face its travel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorPoint {
    pub position: Vec2,
    pub orientation: f32,
    pub target: Vec2,
    /// Units per second
    pub speed: f32,
}

impl AnchorPoint {
    pub fn new(position: Vec2, speed: f32) -> Self {
        Self {
            position,
            orientation: 0.0,
            target: position,
            speed: speed.max(0.0),
        }
    }

    pub fn distance_to_target(&self) -> f32 {
        self.position.distance(self.target)
    }

    /// Step toward the target, landing exactly on it rather than overshooting
    pub fn advance(&mut self, dt: f32) {
        let to_target = self.target - self.position;
        let distance = to_target.length();
        if distance <= f32::EPSILON {
            return;
        }

        self.orientation = to_target.orientation();
        let step = self.speed * dt;
        if step >= distance {
            self.position = self.target;
        } else {
            self.position += to_target.normalized() * step;
        }
    }
}
