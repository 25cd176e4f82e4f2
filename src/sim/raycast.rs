//! Ray casting against axis-aligned boxes
//!
//! Used by obstacle avoidance: each box is treated as four wall segments and
//! the ray is intersected with each wall.

use glam::Vec2;

use super::collider::{Collider, Shape};
use super::vector::VecExt;

/// Parallel-line threshold for the segment solve
const PARALLEL_EPSILON: f32 = 1.0e-6;

/// A ray with a finite reach
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec2,
    /// Unit direction (zero for a degenerate ray)
    pub direction: Vec2,
    /// Hits further than this are ignored
    pub length: f32,
}

impl Ray {
    pub fn new(origin: Vec2, direction: Vec2, length: f32) -> Self {
        Self {
            origin,
            direction: direction.normalized(),
            length: length.max(0.0),
        }
    }

    /// Point at distance `distance` along the ray
    #[inline]
    pub fn at(&self, distance: f32) -> Vec2 {
        self.origin + self.direction * distance
    }
}

/// Where a ray struck a wall
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec2,
    /// Unit surface normal, facing the side the ray came from
    pub normal: Vec2,
    /// Distance from the ray origin
    pub distance: f32,
}

/// Intersect `ray` with one wall segment `a`..`b`
///
/// `t` runs along the wall, `u` along the ray. A hit needs `0 < t < 1` and
/// `u > 0`.
fn ray_segment(ray: &Ray, a: Vec2, b: Vec2) -> Option<RayHit> {
    let wall = b - a;
    let denom = ray.direction.perp_dot(wall);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }

    let to_wall = a - ray.origin;
    let u = to_wall.perp_dot(wall) / denom;
    let t = to_wall.perp_dot(ray.direction) / denom;
    if t <= 0.0 || t >= 1.0 || u <= 0.0 {
        return None;
    }

    let point = ray.at(u);
    let mut normal = wall.perp_ccw().normalized();
    if normal.dot(ray.origin - point) < 0.0 {
        normal = -normal;
    }
    Some(RayHit {
        point,
        normal,
        distance: u,
    })
}

/// Cast a ray against one box collider
///
/// Circles and inactive colliders are never hit.
pub fn cast_ray_against_box(ray: &Ray, collider: &Collider) -> Option<RayHit> {
    if !collider.active || ray.direction == Vec2::ZERO {
        return None;
    }
    let Shape::Box { .. } = collider.shape else {
        return None;
    };

    let (min, max) = (collider.min(), collider.max());
    let corners = [
        Vec2::new(min.x, min.y),
        Vec2::new(max.x, min.y),
        Vec2::new(max.x, max.y),
        Vec2::new(min.x, max.y),
    ];

    (0..4)
        .filter_map(|i| ray_segment(ray, corners[i], corners[(i + 1) % 4]))
        .filter(|hit| hit.distance <= ray.length)
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

/// Cast a ray against many colliders, returning the nearest hit
pub fn cast_ray<'a, I>(ray: &Ray, colliders: I) -> Option<RayHit>
where
    I: IntoIterator<Item = &'a Collider>,
{
    colliders
        .into_iter()
        .filter_map(|c| cast_ray_against_box(ray, c))
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_hits_near_face() {
        let obstacle = Collider::aabb(Vec2::new(100.0, 100.0), 50.0, 50.0);
        let ray = Ray::new(Vec2::new(0.0, 100.0), Vec2::new(1.0, 0.0), 200.0);

        let hit = cast_ray_against_box(&ray, &obstacle).expect("ray should hit");
        assert!((hit.point - Vec2::new(75.0, 100.0)).length() < 1e-3);
        assert!((hit.normal - Vec2::new(-1.0, 0.0)).length() < 1e-5);
        assert!((hit.distance - 75.0).abs() < 1e-3);
    }

    #[test]
    fn test_ray_too_short() {
        let obstacle = Collider::aabb(Vec2::new(100.0, 100.0), 50.0, 50.0);
        let ray = Ray::new(Vec2::new(0.0, 100.0), Vec2::new(1.0, 0.0), 70.0);
        assert!(cast_ray_against_box(&ray, &obstacle).is_none());
    }

    #[test]
    fn test_ray_pointing_away() {
        let obstacle = Collider::aabb(Vec2::new(100.0, 100.0), 50.0, 50.0);
        let ray = Ray::new(Vec2::new(0.0, 100.0), Vec2::new(-1.0, 0.0), 500.0);
        assert!(cast_ray_against_box(&ray, &obstacle).is_none());
    }

    #[test]
    fn test_ray_from_above_gets_up_normal() {
        let obstacle = Collider::aabb(Vec2::new(0.0, 0.0), 20.0, 20.0);
        let ray = Ray::new(Vec2::new(3.0, 50.0), Vec2::new(0.0, -1.0), 100.0);
        let hit = cast_ray_against_box(&ray, &obstacle).expect("ray should hit");
        assert!((hit.point.y - 10.0).abs() < 1e-4);
        assert!((hit.normal - Vec2::Y).length() < 1e-5);
    }

    #[test]
    fn test_circles_are_ignored() {
        let ray = Ray::new(Vec2::ZERO, Vec2::X, 100.0);
        let circle = Collider::circle(Vec2::new(50.0, 0.0), 10.0);
        assert!(cast_ray_against_box(&ray, &circle).is_none());
    }

    #[test]
    fn test_cast_ray_picks_nearest_box() {
        let boxes = [
            Collider::aabb(Vec2::new(200.0, 0.0), 20.0, 20.0),
            Collider::aabb(Vec2::new(100.0, 0.0), 20.0, 20.0),
        ];
        let ray = Ray::new(Vec2::ZERO, Vec2::X, 500.0);
        let hit = cast_ray(&ray, boxes.iter()).expect("ray should hit");
        assert!((hit.point.x - 90.0).abs() < 1e-3);
    }
}
