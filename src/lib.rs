//! Horde - simulation core for a top-down action game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (steering, spatial index, formations)
//! - `settings`: Data-driven tunables loaded from JSON

pub mod settings;
pub mod sim;

pub use settings::{Settings, SettingsError};

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// World defaults (pixels)
    pub const WORLD_WIDTH: f32 = 2048.0;
    pub const WORLD_HEIGHT: f32 = 2048.0;

    /// Visible screen rectangle defaults (pixels)
    pub const VIEW_WIDTH: f32 = 1280.0;
    pub const VIEW_HEIGHT: f32 = 720.0;

    /// Items stored per quadtree node before it subdivides
    pub const QUADTREE_CAPACITY: usize = 8;
    /// Radius of the per-agent neighbourhood query
    pub const QUERY_RADIUS: f32 = 150.0;
    /// Maximum live entities in the simulation pool
    pub const MAX_ENTITIES: usize = 4096;

    /// Steering group output below this is treated as "inactive"
    pub const PRIORITY_EPSILON: f32 = 1.0e-3;

    /// Default agent collider radius
    pub const AGENT_RADIUS: f32 = 12.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        return 0.0;
    }
    // Bring far-away angles close first so the loops below stay short
    if angle.abs() > 4.0 * PI {
        angle %= TAU;
    }
    while angle >= PI {
        angle -= TAU;
    }
    while angle < -PI {
        angle += TAU;
    }
    angle
}

/// Unit vector pointing along an orientation (radians, 0 = +x)
#[inline]
pub fn orientation_to_vec(orientation: f32) -> Vec2 {
    Vec2::new(orientation.cos(), orientation.sin())
}

/// Orientation (radians) of a direction vector
#[inline]
pub fn vec_to_orientation(direction: Vec2) -> f32 {
    direction.y.atan2(direction.x)
}
