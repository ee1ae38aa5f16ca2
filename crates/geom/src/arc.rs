//! Elliptic arcs in SVG endpoint parameterization and center
//! parameterization, with conversion following the SVG implementation notes
//! (sections F.6.5 and F.6.6).

use crate::utils::directed_angle;
use crate::{point, vector, Angle, Point, Vector};

use core::f32::consts::PI;

/// Flag parameters for arcs as described by the SVG specification.
///
/// For most situations using the SVG arc notation, the sweep and large-arc
/// flags are easier to understand than the center parameterization.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct ArcFlags {
    /// Of the four candidate arcs, pick the one spanning more than 180°.
    pub large_arc: bool,
    /// Of the two remaining candidates, pick the one of positive angle
    /// direction.
    pub sweep: bool,
}

/// An elliptic arc in endpoint parameterization, as written in SVG path
/// data.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct SvgArc {
    pub from: Point,
    pub to: Point,
    pub radii: Vector,
    pub x_rotation: Angle,
    pub flags: ArcFlags,
}

/// An elliptic arc in center parameterization.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Arc {
    pub center: Point,
    pub radii: Vector,
    pub start_angle: Angle,
    pub sweep_angle: Angle,
    pub x_rotation: Angle,
}

impl SvgArc {
    /// Whether the arc degenerates into a line segment.
    ///
    /// Happens when either radius is too small or the endpoints coincide,
    /// per the SVG out-of-range parameter rules.
    pub fn is_straight_line(&self) -> bool {
        self.radii.x.abs() < 1e-6
            || self.radii.y.abs() < 1e-6
            || (self.to - self.from).square_length() < 1e-12
    }

    /// Convert to center parameterization.
    pub fn to_arc(&self) -> Arc {
        Arc::from_svg_arc(self)
    }
}

impl Arc {
    /// Convert from endpoint to center parameterization, following the SVG
    /// implementation notes F.6.5, including the F.6.6 correction of
    /// under-sized radii.
    ///
    /// The arc must not be a straight line (see
    /// [`SvgArc::is_straight_line`]).
    pub fn from_svg_arc(arc: &SvgArc) -> Arc {
        debug_assert!(!arc.from.x.is_nan() && !arc.from.y.is_nan());
        debug_assert!(!arc.to.x.is_nan() && !arc.to.y.is_nan());
        debug_assert!(!arc.radii.x.is_nan() && !arc.radii.y.is_nan());
        debug_assert!(!arc.x_rotation.radians.is_nan());
        debug_assert!(!arc.is_straight_line());

        let mut rx = arc.radii.x.abs();
        let mut ry = arc.radii.y.abs();

        let xr = arc.x_rotation.radians % (2.0 * PI);
        let cos_phi = xr.cos();
        let sin_phi = xr.sin();
        let hd_x = (arc.from.x - arc.to.x) / 2.0;
        let hd_y = (arc.from.y - arc.to.y) / 2.0;
        let hs_x = (arc.from.x + arc.to.x) / 2.0;
        let hs_y = (arc.from.y + arc.to.y) / 2.0;

        // F6.5.1
        let p = point(
            cos_phi * hd_x + sin_phi * hd_y,
            -sin_phi * hd_x + cos_phi * hd_y,
        );

        // F6.6: if the endpoints are further apart than the radii allow,
        // scale the radii up uniformly until the ellipse fits.
        let lambda = (p.x / rx) * (p.x / rx) + (p.y / ry) * (p.y / ry);
        if lambda > 1.0 {
            let scale = lambda.sqrt();
            rx *= scale;
            ry *= scale;
        }

        let rxry = rx * ry;
        let rxpy = rx * p.y;
        let rypx = ry * p.x;
        let sum_of_sq = rxpy * rxpy + rypx * rypx;

        debug_assert_ne!(sum_of_sq, 0.0);

        let sign_coe = if arc.flags.large_arc == arc.flags.sweep {
            -1.0
        } else {
            1.0
        };
        let coe = sign_coe * ((rxry * rxry - sum_of_sq) / sum_of_sq).abs().sqrt();

        let transformed_cx = coe * rxpy / ry;
        let transformed_cy = -coe * rypx / rx;

        // F6.5.3
        let center = point(
            cos_phi * transformed_cx - sin_phi * transformed_cy + hs_x,
            sin_phi * transformed_cx + cos_phi * transformed_cy + hs_y,
        );

        // F6.5.5 / F6.5.6
        let a = vector((p.x - transformed_cx) / rx, (p.y - transformed_cy) / ry);
        let b = vector((-p.x - transformed_cx) / rx, (-p.y - transformed_cy) / ry);

        let start_angle = Angle::radians(directed_angle(vector(1.0, 0.0), a));

        let sign_delta = if arc.flags.sweep { 1.0 } else { -1.0 };
        let sweep_angle = Angle::radians(sign_delta * (directed_angle(a, b).abs() % (2.0 * PI)));

        Arc {
            center,
            radii: vector(rx, ry),
            start_angle,
            sweep_angle,
            x_rotation: arc.x_rotation,
        }
    }

    /// Sample the arc at parameter `t` (expected to be between 0 and 1).
    pub fn sample(&self, t: f32) -> Point {
        let angle = self.start_angle.radians + self.sweep_angle.radians * t;
        let cos_phi = self.x_rotation.radians.cos();
        let sin_phi = self.x_rotation.radians.sin();
        let x = self.radii.x * angle.cos();
        let y = self.radii.y * angle.sin();

        point(
            self.center.x + cos_phi * x - sin_phi * y,
            self.center.y + sin_phi * x + cos_phi * y,
        )
    }

    /// Approximate the arc with a sequence of line segments, invoking the
    /// callback for each point after the start point, ending exactly at the
    /// arc's endpoint.
    ///
    /// The subdivision count keeps the arc sagitta under the tolerance and
    /// never drops below 4 segments.
    pub fn for_each_flattened<F: FnMut(Point)>(&self, tolerance: f32, callback: &mut F) {
        let num_segments = self.flattening_segment_count(tolerance);

        for i in 1..=num_segments {
            callback(self.sample(i as f32 / num_segments as f32));
        }
    }

    fn flattening_segment_count(&self, tolerance: f32) -> u32 {
        let radius = self.radii.x.abs().max(self.radii.y.abs());
        if radius <= tolerance {
            return 4;
        }

        // sagitta = r * (1 - cos(θ/2)) <= tolerance
        let max_step = 2.0 * (1.0 - tolerance / radius).acos();
        if max_step < 1e-6 {
            return 4;
        }

        let num_segments = (self.sweep_angle.radians.abs() / max_step).ceil();

        (num_segments as u32).max(4)
    }
}
