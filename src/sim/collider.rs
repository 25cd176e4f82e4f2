//! Collider primitives and overlap tests
//!
//! Every entity carries one collider, either a circle or an axis-aligned box,
//! moved every tick to follow the entity. The quadtree and the steering code
//! only ever ask "do these two overlap?".

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Collider geometry, relative to the collider position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { radius: f32 },
    /// Axis-aligned box centred on the collider position
    Box { half_width: f32, half_height: f32 },
}

/// A positioned collision shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub shape: Shape,
    /// Centre of the shape in world space
    pub position: Vec2,
    /// Inactive colliders never report an overlap
    pub active: bool,
}

impl Collider {
    pub fn circle(position: Vec2, radius: f32) -> Self {
        Self {
            shape: Shape::Circle {
                radius: radius.max(0.0),
            },
            position,
            active: true,
        }
    }

    /// Axis-aligned box centred at `position` with full `width`/`height`
    pub fn aabb(position: Vec2, width: f32, height: f32) -> Self {
        Self {
            shape: Shape::Box {
                half_width: (width * 0.5).max(0.0),
                half_height: (height * 0.5).max(0.0),
            },
            position,
            active: true,
        }
    }

    /// Box spanning `min`..`max`
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        let size = max - min;
        Self::aabb(min + size * 0.5, size.x, size.y)
    }

    /// Lower-left corner of the bounding box
    #[inline]
    pub fn min(&self) -> Vec2 {
        self.position - self.half_extents()
    }

    /// Upper-right corner of the bounding box
    #[inline]
    pub fn max(&self) -> Vec2 {
        self.position + self.half_extents()
    }

    /// Half-size of the bounding box
    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        match self.shape {
            Shape::Circle { radius } => Vec2::splat(radius),
            Shape::Box {
                half_width,
                half_height,
            } => Vec2::new(half_width, half_height),
        }
    }

    /// Radius of the smallest circle around the shape
    pub fn bounding_radius(&self) -> f32 {
        match self.shape {
            Shape::Circle { radius } => radius,
            Shape::Box {
                half_width,
                half_height,
            } => Vec2::new(half_width, half_height).length(),
        }
    }

    /// Check whether a point lies inside (or on) the shape
    pub fn contains_point(&self, point: Vec2) -> bool {
        match self.shape {
            Shape::Circle { radius } => point.distance_squared(self.position) <= radius * radius,
            Shape::Box { .. } => {
                let (min, max) = (self.min(), self.max());
                point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
            }
        }
    }

    /// Overlap test covering every shape pairing
    pub fn intersects(&self, other: &Collider) -> bool {
        if !self.active || !other.active {
            return false;
        }
        match (self.shape, other.shape) {
            (Shape::Circle { radius: a }, Shape::Circle { radius: b }) => {
                circle_circle(self.position, a, other.position, b)
            }
            (Shape::Box { .. }, Shape::Box { .. }) => {
                box_box(self.min(), self.max(), other.min(), other.max())
            }
            (Shape::Box { .. }, Shape::Circle { radius }) => {
                box_circle(self.min(), self.max(), other.position, radius)
            }
            (Shape::Circle { radius }, Shape::Box { .. }) => {
                box_circle(other.min(), other.max(), self.position, radius)
            }
        }
    }
}

/// Circles overlap when centre distance is within the summed radii
#[inline]
pub fn circle_circle(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    let sum = radius_a + radius_b;
    a.distance_squared(b) <= sum * sum
}

/// Separating-axis test on extents. Touching edges do not count.
#[inline]
pub fn box_box(min_a: Vec2, max_a: Vec2, min_b: Vec2, max_b: Vec2) -> bool {
    min_a.x < max_b.x && max_a.x > min_b.x && min_a.y < max_b.y && max_a.y > min_b.y
}

/// Clamp the circle centre into the box and compare against the radius
#[inline]
pub fn box_circle(min: Vec2, max: Vec2, center: Vec2, radius: f32) -> bool {
    let closest = center.clamp(min, max);
    closest.distance_squared(center) <= radius * radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_box_touching_edges_do_not_intersect() {
        let a = Collider::aabb(Vec2::new(0.0, 0.0), 10.0, 10.0);
        let b = Collider::aabb(Vec2::new(10.0, 0.0), 10.0, 10.0);
        assert!(!a.intersects(&b));

        let c = Collider::aabb(Vec2::new(9.5, 3.0), 10.0, 10.0);
        assert!(a.intersects(&c));
    }

    #[test]
    fn test_circle_circle() {
        let a = Collider::circle(Vec2::ZERO, 5.0);
        let b = Collider::circle(Vec2::new(9.0, 0.0), 5.0);
        let c = Collider::circle(Vec2::new(11.0, 0.0), 5.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_box_circle_both_orders() {
        let boxed = Collider::aabb(Vec2::new(100.0, 100.0), 50.0, 50.0);
        let near = Collider::circle(Vec2::new(70.0, 100.0), 6.0);
        let far = Collider::circle(Vec2::new(60.0, 60.0), 6.0);
        assert!(boxed.intersects(&near));
        assert!(near.intersects(&boxed));
        assert!(!boxed.intersects(&far));
        assert!(!far.intersects(&boxed));
    }

    #[test]
    fn test_point_collider_inside_box() {
        let world = Collider::aabb(Vec2::ZERO, 100.0, 100.0);
        let point = Collider::circle(Vec2::new(10.0, -20.0), 0.0);
        assert!(world.intersects(&point));
    }

    #[test]
    fn test_inactive_never_intersects() {
        let a = Collider::circle(Vec2::ZERO, 5.0);
        let mut b = Collider::circle(Vec2::ZERO, 5.0);
        b.active = false;
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
    }

    #[test]
    fn test_extents_and_bounding_radius() {
        let b = Collider::from_min_max(Vec2::new(0.0, 0.0), Vec2::new(6.0, 8.0));
        assert_eq!(b.position, Vec2::new(3.0, 4.0));
        assert_eq!(b.min(), Vec2::ZERO);
        assert_eq!(b.max(), Vec2::new(6.0, 8.0));
        assert!((b.bounding_radius() - 5.0).abs() < 1e-6);
        assert!(b.contains_point(Vec2::new(6.0, 8.0)));
        assert!(!b.contains_point(Vec2::new(6.1, 8.0)));
    }
}
