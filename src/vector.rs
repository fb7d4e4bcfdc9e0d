/*
 * Vector Module
 *
 * Small 2D vector helpers on top of nannou's Vec2. Every operation that
 * divides by a length guards the zero vector so NaN never reaches the
 * simulation state.
 */

use nannou::prelude::*;

// Length of the vector
#[inline]
pub fn magnitude(v: Vec2) -> f32 {
    v.length()
}

// Unit vector in the same direction, or zero for a zero (or non-finite) input
#[inline]
pub fn normalize(v: Vec2) -> Vec2 {
    let len = v.length();
    if len > 0.0 && len.is_finite() {
        v / len
    } else {
        Vec2::ZERO
    }
}

// Scale the vector down so its length does not exceed `max`
#[inline]
pub fn clamp_magnitude(v: Vec2, max: f32) -> Vec2 {
    let max = max.max(0.0);
    let len_sq = v.length_squared();
    if len_sq > max * max {
        normalize(v) * max
    } else {
        v
    }
}

// Vector of length `len` pointing the same way (zero stays zero)
#[inline]
pub fn with_magnitude(v: Vec2, len: f32) -> Vec2 {
    normalize(v) * len
}

// Angle in radians measured from the +x axis
#[inline]
pub fn angle_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

// Unit vector for an angle in radians
#[inline]
pub fn from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

// Rotate counter-clockwise by `angle` radians
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

// Reynolds steering: desired velocity minus current velocity, limited to max_force
#[inline]
pub fn steer_towards(desired: Vec2, velocity: Vec2, max_speed: f32, max_force: f32) -> Vec2 {
    if desired.length_squared() == 0.0 {
        return Vec2::ZERO;
    }
    clamp_magnitude(with_magnitude(desired, max_speed) - velocity, max_force)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_zero_is_zero() {
        let n = normalize(Vec2::ZERO);
        assert_eq!(n, Vec2::ZERO);
        assert!(!n.x.is_nan() && !n.y.is_nan());
    }

    #[test]
    fn normalize_has_unit_length() {
        let n = normalize(Vec2::new(3.0, 4.0));
        assert!((magnitude(n) - 1.0).abs() < 1e-6);
        assert!((n.x - 0.6).abs() < 1e-6);
    }

    #[test]
    fn clamp_only_shrinks() {
        let long = clamp_magnitude(Vec2::new(10.0, 0.0), 2.0);
        assert!((long.x - 2.0).abs() < 1e-6);

        let short = clamp_magnitude(Vec2::new(1.0, 1.0), 5.0);
        assert_eq!(short, Vec2::new(1.0, 1.0));

        assert_eq!(clamp_magnitude(Vec2::new(1.0, 0.0), -1.0), Vec2::ZERO);
    }

    #[test]
    fn rotate_quarter_turn() {
        let r = rotate(Vec2::new(1.0, 0.0), std::f32::consts::FRAC_PI_2);
        assert!(r.x.abs() < 1e-6);
        assert!((r.y - 1.0).abs() < 1e-6);
        assert!((angle_of(r) - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn steer_towards_zero_desired_is_zero() {
        assert_eq!(steer_towards(Vec2::ZERO, Vec2::new(1.0, 0.0), 4.0, 0.1), Vec2::ZERO);
    }
}
