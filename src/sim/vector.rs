//! 2D vector helpers on top of `glam::Vec2`
//!
//! glam covers add/sub/scale, dot and distance. The steering code also needs
//! rotation by an angle, a zero-safe normalize and a heading.

use glam::Vec2;

/// Extra vector algebra used throughout the simulation
pub trait VecExt: Sized {
    /// Unit vector in the same direction, or zero for the zero vector
    fn normalized(self) -> Self;
    /// Normalize in place (zero stays zero)
    fn normalize_in_place(&mut self);
    /// Copy rotated counter-clockwise by `angle` radians
    fn rotated(self, angle: f32) -> Self;
    /// Rotate in place by `angle` radians
    fn rotate_by(&mut self, angle: f32);
    /// Magnitude
    fn absolute(self) -> f32;
    /// Heading in radians (0 for the zero vector)
    fn orientation(self) -> f32;
    /// Counter-clockwise perpendicular
    fn perp_ccw(self) -> Self;
}

impl VecExt for Vec2 {
    #[inline]
    fn normalized(self) -> Self {
        let len = self.length();
        if len <= f32::EPSILON {
            Vec2::ZERO
        } else {
            self / len
        }
    }

    #[inline]
    fn normalize_in_place(&mut self) {
        *self = self.normalized();
    }

    #[inline]
    fn rotated(self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Vec2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    #[inline]
    fn rotate_by(&mut self, angle: f32) {
        let (sin, cos) = angle.sin_cos();
        // y must see the pre-rotation x
        let x = self.x;
        self.x = x * cos - self.y * sin;
        self.y = x * sin + self.y * cos;
    }

    #[inline]
    fn absolute(self) -> f32 {
        self.length()
    }

    #[inline]
    fn orientation(self) -> f32 {
        if self == Vec2::ZERO {
            0.0
        } else {
            crate::vec_to_orientation(self)
        }
    }

    #[inline]
    fn perp_ccw(self) -> Self {
        Vec2::new(-self.y, self.x)
    }
}

/// Scale `v` down so its length is at most `max`
#[inline]
pub fn clamp_length(v: Vec2, max: f32) -> Vec2 {
    if max <= 0.0 {
        return Vec2::ZERO;
    }
    let len_sq = v.length_squared();
    if len_sq > max * max {
        v * (max / len_sq.sqrt())
    } else {
        v
    }
}
