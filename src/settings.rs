//! Simulation settings
//!
//! Loaded from JSON; every field is optional and falls back to its default.
//! Values that would break the simulation (non-finite, negative radii, zero
//! capacities) are reset by `sanitize`.

use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::collider::Collider;
use crate::sim::formation::FormationParams;
use crate::sim::steering::BehaviorData;

/// Failure while reading or writing settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Parameters of the headless demo run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoSettings {
    pub seed: u64,
    /// Number of fixed steps to simulate
    pub ticks: u32,
    /// Log a progress line every this many ticks (0 = never)
    pub log_every: u32,
    pub circle_members: usize,
    pub v_members: usize,
    pub wanderers: usize,
    pub obstacles: usize,
    /// Constant player velocity
    pub player_velocity: Vec2,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            ticks: 1200,
            log_every: 120,
            circle_members: 8,
            v_members: 7,
            wanderers: 6,
            obstacles: 5,
            player_velocity: Vec2::new(20.0, 10.0),
        }
    }
}

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === World ===
    pub world_width: f32,
    pub world_height: f32,
    /// Hard cap on live entities
    pub max_entities: usize,

    // === Spatial queries ===
    /// Items per quadtree node before it subdivides
    pub quadtree_capacity: usize,
    /// Radius of each agent's neighbour query
    pub query_radius: f32,

    // === Steering ===
    /// Priority groups at or below this output are skipped
    pub priority_epsilon: f32,
    /// Template copied into every spawned enemy
    pub enemy: BehaviorData,

    // === Formations ===
    pub formation: FormationParams,
    /// Visible region, centred on the player
    pub view_width: f32,
    pub view_height: f32,

    pub demo: DemoSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            max_entities: MAX_ENTITIES,

            quadtree_capacity: QUADTREE_CAPACITY,
            query_radius: QUERY_RADIUS,

            priority_epsilon: PRIORITY_EPSILON,
            enemy: BehaviorData::default(),

            formation: FormationParams::default(),
            view_width: VIEW_WIDTH,
            view_height: VIEW_HEIGHT,

            demo: DemoSettings::default(),
        }
    }
}

/// `value` if finite and at least `min`, otherwise `fallback`
fn at_least(value: f32, min: f32, fallback: f32) -> f32 {
    if value.is_finite() && value >= min {
        value
    } else {
        fallback
    }
}

impl Settings {
    /// Parse and sanitize
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Read a JSON settings file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reset out-of-range values to their defaults
    pub fn sanitize(&mut self) {
        let defaults = Self::default();

        self.world_width = at_least(self.world_width, 1.0, defaults.world_width);
        self.world_height = at_least(self.world_height, 1.0, defaults.world_height);
        if self.max_entities == 0 {
            self.max_entities = defaults.max_entities;
        }
        self.quadtree_capacity = self.quadtree_capacity.max(1);
        self.query_radius = at_least(self.query_radius, 0.0, defaults.query_radius);
        self.priority_epsilon = at_least(self.priority_epsilon, 0.0, defaults.priority_epsilon);
        self.view_width = at_least(self.view_width, 1.0, defaults.view_width);
        self.view_height = at_least(self.view_height, 1.0, defaults.view_height);

        let f = &mut self.formation;
        let fd = defaults.formation;
        f.anchor_speed = at_least(f.anchor_speed, 0.0, fd.anchor_speed);
        f.arrival_tolerance = at_least(f.arrival_tolerance, 0.0, fd.arrival_tolerance);
        f.slot_spacing = at_least(f.slot_spacing, 0.0, fd.slot_spacing);
        f.visible_fraction = if f.visible_fraction.is_finite() {
            f.visible_fraction.clamp(0.0, 1.0)
        } else {
            fd.visible_fraction
        };

        let e = &mut self.enemy;
        let ed = defaults.enemy;
        e.max_speed = at_least(e.max_speed, 0.0, ed.max_speed);
        e.max_linear_acceleration = at_least(e.max_linear_acceleration, 0.0, ed.max_linear_acceleration);
        e.max_rotation = at_least(e.max_rotation, 0.0, ed.max_rotation);
        e.max_angular_acceleration = at_least(e.max_angular_acceleration, 0.0, ed.max_angular_acceleration);
        e.linear_target_radius = at_least(e.linear_target_radius, 0.0, ed.linear_target_radius);
        e.linear_slow_down_radius = at_least(e.linear_slow_down_radius, 0.0, ed.linear_slow_down_radius);
        e.angular_target_radius = at_least(e.angular_target_radius, 0.0, ed.angular_target_radius);
        e.angular_slow_down_radius = at_least(e.angular_slow_down_radius, 0.0, ed.angular_slow_down_radius);
        e.time_to_target = at_least(e.time_to_target, 0.0, ed.time_to_target);
        e.max_prediction = at_least(e.max_prediction, 0.0, ed.max_prediction);
        e.separation_threshold = at_least(e.separation_threshold, 0.0, ed.separation_threshold);
        e.decay_coefficient = at_least(e.decay_coefficient, 0.0, ed.decay_coefficient);
        e.look_ahead = at_least(e.look_ahead, 0.0, ed.look_ahead);
        e.avoid_distance = at_least(e.avoid_distance, 0.0, ed.avoid_distance);
    }

    /// Whole world as a box collider with its min corner at the origin
    pub fn world_bounds(&self) -> Collider {
        Collider::from_min_max(Vec2::ZERO, Vec2::new(self.world_width, self.world_height))
    }

    /// Visible region centred on `center`
    pub fn view_rect(&self, center: Vec2) -> Collider {
        Collider::aabb(center, self.view_width, self.view_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings = Settings::from_json(r#"{ "query_radius": 90.0 }"#).unwrap();
        assert_eq!(settings.query_radius, 90.0);
        assert_eq!(settings.quadtree_capacity, QUADTREE_CAPACITY);
        assert_eq!(settings.enemy, BehaviorData::default());
    }

    #[test]
    fn test_nested_partial_override() {
        let json = r#"{ "enemy": { "max_speed": 60.0 }, "formation": { "visible_fraction": 0.5 } }"#;
        let settings = Settings::from_json(json).unwrap();
        assert_eq!(settings.enemy.max_speed, 60.0);
        assert_eq!(settings.enemy.look_ahead, BehaviorData::default().look_ahead);
        assert_eq!(settings.formation.visible_fraction, 0.5);
    }

    #[test]
    fn test_sanitize_repairs_bad_values() {
        let json = r#"{
            "quadtree_capacity": 0,
            "query_radius": -5.0,
            "world_width": 0.0,
            "formation": { "visible_fraction": 3.0, "anchor_speed": -1.0 },
            "enemy": { "max_speed": -10.0 }
        }"#;
        let settings = Settings::from_json(json).unwrap();
        assert_eq!(settings.quadtree_capacity, 1);
        assert_eq!(settings.query_radius, QUERY_RADIUS);
        assert_eq!(settings.world_width, WORLD_WIDTH);
        assert_eq!(settings.formation.visible_fraction, 1.0);
        assert_eq!(settings.formation.anchor_speed, FormationParams::default().anchor_speed);
        assert_eq!(settings.enemy.max_speed, BehaviorData::default().max_speed);
    }

    #[test]
    fn test_json_round_trip() {
        let mut settings = Settings::default();
        settings.demo.wanderers = 2;
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(Settings::from_json("{ not json"), Err(SettingsError::Parse(_))));
        let missing = Settings::load("/definitely/not/here/settings.json");
        assert!(matches!(missing, Err(SettingsError::Io { .. })));
    }

    #[test]
    fn test_rects() {
        let settings = Settings::default();
        let world = settings.world_bounds();
        assert_eq!(world.min(), Vec2::ZERO);
        assert_eq!(world.max(), Vec2::new(WORLD_WIDTH, WORLD_HEIGHT));
        let view = settings.view_rect(Vec2::new(100.0, 100.0));
        assert!(view.contains_point(Vec2::new(100.0 + VIEW_WIDTH * 0.5 - 1.0, 100.0)));
    }
}
