//! Cubic bézier segments and their adaptive flattening.

use crate::quadratic_bezier::MAX_FLATTENING_DEPTH;
use crate::utils::lerp;
use crate::Point;

/// A 2D cubic bézier curve segment.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct CubicBezierSegment {
    pub from: Point,
    pub ctrl1: Point,
    pub ctrl2: Point,
    pub to: Point,
}

impl CubicBezierSegment {
    /// Sample the curve at parameter `t` (expected to be between 0 and 1).
    pub fn sample(&self, t: f32) -> Point {
        let t2 = t * t;
        let t3 = t2 * t;
        let one_t = 1.0 - t;
        let one_t2 = one_t * one_t;
        let one_t3 = one_t2 * one_t;

        let x = self.from.x * one_t3
            + self.ctrl1.x * 3.0 * one_t2 * t
            + self.ctrl2.x * 3.0 * one_t * t2
            + self.to.x * t3;
        let y = self.from.y * one_t3
            + self.ctrl1.y * 3.0 * one_t2 * t
            + self.ctrl2.y * 3.0 * one_t * t2
            + self.to.y * t3;

        Point::new(x, y)
    }

    /// Split this curve in two sub-curves at parameter `t`, using the
    /// de Casteljau construction.
    pub fn split(&self, t: f32) -> (CubicBezierSegment, CubicBezierSegment) {
        let ctrl1a = lerp(self.from, self.ctrl1, t);
        let ctrl2a = lerp(self.ctrl1, self.ctrl2, t);
        let ctrl1aa = lerp(ctrl1a, ctrl2a, t);
        let ctrl3a = lerp(self.ctrl2, self.to, t);
        let ctrl2aa = lerp(ctrl2a, ctrl3a, t);
        let split_point = lerp(ctrl1aa, ctrl2aa, t);

        (
            CubicBezierSegment {
                from: self.from,
                ctrl1: ctrl1a,
                ctrl2: ctrl1aa,
                to: split_point,
            },
            CubicBezierSegment {
                from: split_point,
                ctrl1: ctrl2aa,
                ctrl2: ctrl3a,
                to: self.to,
            },
        )
    }

    /// Whether both control points are close enough to the chord for the
    /// segment to be drawn as a straight line.
    ///
    /// The combined perpendicular distance of the two control points is
    /// compared unnormalized against the tolerance scaled by the squared
    /// chord length.
    pub fn is_flat(&self, tolerance: f32) -> bool {
        debug_assert!(!self.from.x.is_nan() && !self.from.y.is_nan());
        debug_assert!(!self.ctrl1.x.is_nan() && !self.ctrl1.y.is_nan());
        debug_assert!(!self.ctrl2.x.is_nan() && !self.ctrl2.y.is_nan());
        debug_assert!(!self.to.x.is_nan() && !self.to.y.is_nan());

        let chord = self.to - self.from;
        let chord_sq = chord.square_length();
        let d1 = (self.ctrl1 - self.from).cross(chord).abs();
        let d2 = (self.ctrl2 - self.from).cross(chord).abs();

        d1 + d2 <= tolerance * chord_sq
    }

    /// Approximate the curve with a sequence of line segments, invoking the
    /// callback for each point after `from`, ending exactly at `to`.
    pub fn for_each_flattened<F: FnMut(Point)>(&self, tolerance: f32, callback: &mut F) {
        self.flatten_recursive(tolerance, 0, callback);
    }

    fn flatten_recursive<F: FnMut(Point)>(&self, tolerance: f32, depth: u32, callback: &mut F) {
        if depth >= MAX_FLATTENING_DEPTH || self.is_flat(tolerance) {
            callback(self.to);
            return;
        }

        let (first, second) = self.split(0.5);
        first.flatten_recursive(tolerance, depth + 1, callback);
        second.flatten_recursive(tolerance, depth + 1, callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point;

    #[test]
    fn sample_endpoints() {
        let curve = CubicBezierSegment {
            from: point(0.0, 0.0),
            ctrl1: point(1.0, 2.0),
            ctrl2: point(3.0, 2.0),
            to: point(4.0, 0.0),
        };
        assert_eq!(curve.sample(0.0), curve.from);
        assert_eq!(curve.sample(1.0), curve.to);
    }

    #[test]
    fn split_is_continuous() {
        let curve = CubicBezierSegment {
            from: point(0.0, 0.0),
            ctrl1: point(10.0, 30.0),
            ctrl2: point(30.0, -10.0),
            to: point(40.0, 0.0),
        };

        let (a, b) = curve.split(0.5);
        assert_eq!(a.to, b.from);
        assert_eq!(a.from, curve.from);
        assert_eq!(b.to, curve.to);

        let mid = curve.sample(0.5);
        assert!((a.to - mid).square_length() < 1e-6);
    }

    #[test]
    fn flattened_ends_at_to() {
        let curve = CubicBezierSegment {
            from: point(0.0, 0.0),
            ctrl1: point(0.0, 20.0),
            ctrl2: point(20.0, 20.0),
            to: point(20.0, 0.0),
        };

        let mut last = curve.from;
        let mut count = 0;
        curve.for_each_flattened(0.01, &mut |p| {
            last = p;
            count += 1;
        });

        assert_eq!(last, curve.to);
        assert!(count > 2);
    }

    #[test]
    fn flat_curve_emits_single_segment() {
        let line = CubicBezierSegment {
            from: point(0.0, 0.0),
            ctrl1: point(1.0, 0.0),
            ctrl2: point(2.0, 0.0),
            to: point(3.0, 0.0),
        };

        let mut count = 0;
        line.for_each_flattened(0.1, &mut |_| count += 1);
        assert_eq!(count, 1);
    }

    #[test]
    fn recursion_cap_terminates() {
        // A pathological curve with an extreme control excursion still
        // produces a bounded number of points.
        let curve = CubicBezierSegment {
            from: point(0.0, 0.0),
            ctrl1: point(1e20, 1e20),
            ctrl2: point(-1e20, 1e20),
            to: point(1.0, 0.0),
        };

        let mut count: u32 = 0;
        curve.for_each_flattened(0.01, &mut |_| count += 1);
        assert!(count <= 1 << MAX_FLATTENING_DEPTH);
    }
}
