//! Small vector and polygon helpers shared by the flattening, stroking
//! and triangulation code.

use crate::{point, vector, Point, Vector};

/// Positive if a polygon's vertices wind counter-clockwise, negative
/// otherwise.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Winding {
    Positive,
    Negative,
}

/// Unit-length copy of `v`.
///
/// Vectors too short to normalize yield the positive x axis, so that
/// downstream math never observes NaN.
#[inline]
pub fn safe_normalize(v: Vector) -> Vector {
    debug_assert!(!v.x.is_nan() && !v.y.is_nan());

    let sq = v.square_length();
    if sq < 1e-12 {
        return vector(1.0, 0.0);
    }

    v / sq.sqrt()
}

/// Rotate `v` by 90° counter-clockwise.
#[inline]
pub fn perp(v: Vector) -> Vector {
    vector(-v.y, v.x)
}

/// Angle from `a` to `b` in `[0, 2π)`.
pub fn directed_angle(a: Vector, b: Vector) -> f32 {
    let angle = b.y.atan2(b.x) - a.y.atan2(a.x);
    if angle < 0.0 {
        angle + 2.0 * core::f32::consts::PI
    } else {
        angle
    }
}

/// Signed area of a polygon via the shoelace formula.
///
/// Positive for counter-clockwise winding, negative for clockwise.
pub fn signed_area(points: &[Point]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    let mut prev = points[n - 1];
    for &p in points {
        area += prev.x * p.y - p.x * prev.y;
        prev = p;
    }

    area * 0.5
}

/// The winding of a polygon, from the sign of its shoelace area.
pub fn winding(points: &[Point]) -> Winding {
    if signed_area(points) >= 0.0 {
        Winding::Positive
    } else {
        Winding::Negative
    }
}

/// Interpolate between two points.
#[inline]
pub fn lerp(a: Point, b: Point, t: f32) -> Point {
    point(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}
