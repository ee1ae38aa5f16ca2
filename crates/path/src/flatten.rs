//! Flattening of a command stream into sub-polygons of line segments.

use crate::{IndexSlice, Positioning, SvgCommand, SvgPath};
use nib_geom::arrayvec::ArrayVec;
use nib_geom::limits::{MAX_FLATTENED_POINTS, MAX_PATH_VERTICES, MAX_SUB_POLYGONS};
use nib_geom::{
    point, vector, Angle, ArcFlags, CubicBezierSegment, Point, QuadraticBezierSegment, SvgArc,
};

use thiserror::Error;

/// Flattened points of a whole path, addressed by [`IndexSlice`]s.
pub type PolyPointBuf = ArrayVec<Point, MAX_FLATTENED_POINTS>;

/// The sub-polygon ranges of a flattened path.
pub type PolygonBuf = ArrayVec<IndexSlice, MAX_SUB_POLYGONS>;

#[non_exhaustive]
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlattenError {
    #[error("Too many vertices in one flattened polygon.")]
    TooManyVertices,
    #[error("Too many sub-polygons in one path.")]
    TooManyPolygons,
}

/// Walk the command stream and emit flattened sub-polygons.
///
/// Points are appended to `points`; each sub-polygon's half-open range is
/// appended to `polygons`. The buffers are not cleared first, so several
/// paths can share one buffer pair; on failure they retain the work
/// accepted before the failure.
pub fn flatten_path(
    path: &SvgPath,
    tolerance: f32,
    points: &mut PolyPointBuf,
    polygons: &mut PolygonBuf,
) -> Result<(), FlattenError> {
    debug_assert!(tolerance > 0.0 && !tolerance.is_nan());

    let mut flattener = Flattener {
        points,
        polygons,
        tolerance,
        pen: point(0.0, 0.0),
        first: point(0.0, 0.0),
        subpath_start: 0,
        open: false,
        prev_cubic_ctrl: None,
        prev_quad_ctrl: None,
    };

    for (command, ops) in path.iter() {
        flattener.command(command, ops)?;
    }

    flattener.end()
}

struct Flattener<'l> {
    points: &'l mut PolyPointBuf,
    polygons: &'l mut PolygonBuf,
    tolerance: f32,
    pen: Point,
    first: Point,
    subpath_start: u32,
    open: bool,
    prev_cubic_ctrl: Option<Point>,
    prev_quad_ctrl: Option<Point>,
}

impl<'l> Flattener<'l> {
    fn command(&mut self, command: SvgCommand, ops: &[f32]) -> Result<(), FlattenError> {
        match command {
            SvgCommand::MoveTo(positioning) => {
                let to = self.resolve(positioning, ops[0], ops[1]);
                self.end_polygon()?;
                self.begin(to)?;
            }
            SvgCommand::LineTo(positioning) => {
                let to = self.resolve(positioning, ops[0], ops[1]);
                self.line_to(to)?;
            }
            SvgCommand::HorizontalLineTo(positioning) => {
                let mut x = ops[0];
                if positioning.is_relative() {
                    x += self.pen.x;
                }
                let to = point(x, self.pen.y);
                self.line_to(to)?;
            }
            SvgCommand::VerticalLineTo(positioning) => {
                let mut y = ops[0];
                if positioning.is_relative() {
                    y += self.pen.y;
                }
                let to = point(self.pen.x, y);
                self.line_to(to)?;
            }
            SvgCommand::CubicTo(positioning) => {
                let ctrl1 = self.resolve(positioning, ops[0], ops[1]);
                let ctrl2 = self.resolve(positioning, ops[2], ops[3]);
                let to = self.resolve(positioning, ops[4], ops[5]);
                self.cubic_to(ctrl1, ctrl2, to)?;
            }
            SvgCommand::SmoothCubicTo(positioning) => {
                let ctrl1 = self.smooth_ctrl(self.prev_cubic_ctrl);
                let ctrl2 = self.resolve(positioning, ops[0], ops[1]);
                let to = self.resolve(positioning, ops[2], ops[3]);
                self.cubic_to(ctrl1, ctrl2, to)?;
            }
            SvgCommand::QuadraticTo(positioning) => {
                let ctrl = self.resolve(positioning, ops[0], ops[1]);
                let to = self.resolve(positioning, ops[2], ops[3]);
                self.quadratic_to(ctrl, to)?;
            }
            SvgCommand::SmoothQuadraticTo(positioning) => {
                let ctrl = self.smooth_ctrl(self.prev_quad_ctrl);
                let to = self.resolve(positioning, ops[0], ops[1]);
                self.quadratic_to(ctrl, to)?;
            }
            SvgCommand::ArcTo(positioning) => {
                let to = self.resolve(positioning, ops[5], ops[6]);
                self.arc_to(
                    vector(ops[0], ops[1]),
                    Angle::degrees(ops[2]),
                    ArcFlags {
                        large_arc: ops[3] != 0.0,
                        sweep: ops[4] != 0.0,
                    },
                    to,
                )?;
            }
            SvgCommand::Close => {
                self.end_polygon()?;
                self.pen = self.first;
            }
        }

        // Smooth commands reflect the previous control point only when the
        // immediately previous command was of the same curve family.
        match command {
            SvgCommand::CubicTo(_) | SvgCommand::SmoothCubicTo(_) => {
                self.prev_quad_ctrl = None;
            }
            SvgCommand::QuadraticTo(_) | SvgCommand::SmoothQuadraticTo(_) => {
                self.prev_cubic_ctrl = None;
            }
            _ => {
                self.prev_cubic_ctrl = None;
                self.prev_quad_ctrl = None;
            }
        }

        Ok(())
    }

    fn end(&mut self) -> Result<(), FlattenError> {
        self.end_polygon()
    }

    fn resolve(&self, positioning: Positioning, x: f32, y: f32) -> Point {
        if positioning.is_relative() {
            point(self.pen.x + x, self.pen.y + y)
        } else {
            point(x, y)
        }
    }

    fn smooth_ctrl(&self, prev_ctrl: Option<Point>) -> Point {
        match prev_ctrl {
            Some(prev) => self.pen + (self.pen - prev),
            None => self.pen,
        }
    }

    fn begin(&mut self, at: Point) -> Result<(), FlattenError> {
        self.pen = at;
        self.first = at;
        self.subpath_start = self.points.len() as u32;
        self.open = true;
        self.push_point(at)
    }

    /// Open a sub-polygon at the pen if a drawing command arrives with no
    /// explicit move-to (at the start of a stream, or right after a close).
    fn ensure_open(&mut self) -> Result<(), FlattenError> {
        if !self.open {
            let at = self.pen;
            self.begin(at)?;
        }
        Ok(())
    }

    fn line_to(&mut self, to: Point) -> Result<(), FlattenError> {
        self.ensure_open()?;
        self.pen = to;
        self.push_point(to)
    }

    fn cubic_to(&mut self, ctrl1: Point, ctrl2: Point, to: Point) -> Result<(), FlattenError> {
        self.ensure_open()?;
        let curve = CubicBezierSegment {
            from: self.pen,
            ctrl1,
            ctrl2,
            to,
        };

        let mut result = Ok(());
        let tolerance = self.tolerance;
        curve.for_each_flattened(tolerance, &mut |p| {
            if result.is_ok() {
                result = self.push_point(p);
            }
        });
        self.pen = to;
        self.prev_cubic_ctrl = Some(ctrl2);

        result
    }

    fn quadratic_to(&mut self, ctrl: Point, to: Point) -> Result<(), FlattenError> {
        self.ensure_open()?;
        let curve = QuadraticBezierSegment {
            from: self.pen,
            ctrl,
            to,
        };

        let mut result = Ok(());
        let tolerance = self.tolerance;
        curve.for_each_flattened(tolerance, &mut |p| {
            if result.is_ok() {
                result = self.push_point(p);
            }
        });
        self.pen = to;
        self.prev_quad_ctrl = Some(ctrl);

        result
    }

    fn arc_to(
        &mut self,
        radii: nib_geom::Vector,
        x_rotation: Angle,
        flags: ArcFlags,
        to: Point,
    ) -> Result<(), FlattenError> {
        self.ensure_open()?;
        let arc = SvgArc {
            from: self.pen,
            to,
            radii,
            x_rotation,
            flags,
        };

        let mut result = Ok(());
        if arc.is_straight_line() {
            result = self.push_point(to);
        } else {
            let tolerance = self.tolerance;
            arc.to_arc().for_each_flattened(tolerance, &mut |p| {
                if result.is_ok() {
                    result = self.push_point(p);
                }
            });
        }
        self.pen = to;

        result
    }

    fn push_point(&mut self, p: Point) -> Result<(), FlattenError> {
        // Zero-length segments add nothing and would upset the triangulator.
        if self.points.len() as u32 > self.subpath_start && *self.points.last().unwrap() == p {
            return Ok(());
        }

        if self.points.len() as u32 - self.subpath_start >= MAX_PATH_VERTICES as u32 {
            return Err(FlattenError::TooManyVertices);
        }

        self.points
            .try_push(p)
            .map_err(|_| FlattenError::TooManyVertices)
    }

    fn end_polygon(&mut self) -> Result<(), FlattenError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;

        let start = self.subpath_start;
        let mut end = self.points.len() as u32;

        // A closing segment back to the first point is implicit.
        if end - start > 1 && self.points[end as usize - 1] == self.points[start as usize] {
            self.points.pop();
            end -= 1;
        }

        if end == start {
            return Ok(());
        }

        self.polygons
            .try_push(IndexSlice { start, end })
            .map_err(|_| FlattenError::TooManyPolygons)
    }
}
