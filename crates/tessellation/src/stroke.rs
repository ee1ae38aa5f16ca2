//! Expansion of polylines into stroke outlines or directly-indexed triangle
//! meshes.
//!
//! The outline path produces a single closed polygon (caps and joins
//! included) meant to be fed to the triangulator. The direct path emits
//! left/right offset vertices in parallel and indexes them as quads,
//! bypassing triangulation; closed round strokes should prefer it, since
//! the outline of a closed stroke keeps a seam at the wrap index.

use crate::{LineCap, LineJoin, StrokeError, StrokeStyle};
use nib_geom::arrayvec::ArrayVec;
use nib_geom::limits::{MAX_STROKE_INPUT, MAX_STROKE_OUTPUT, ROUND_SEGMENTS};
use nib_geom::utils::{perp, safe_normalize};
use nib_geom::{vector, Point, Vector};

use core::f32::consts::PI;

/// Cap on emitted mesh indices.
const MAX_STROKE_INDICES: usize = MAX_STROKE_OUTPUT * 3;

/// Below this cross product (with aligned directions) a join is treated as
/// a continuation of a straight line.
const COLLINEAR_CROSS_EPSILON: f32 = 1e-6;
const COLLINEAR_DOT_MIN: f32 = 0.9;

/// Near-180° turns cannot miter regardless of the miter limit.
const MIN_MITER_DOT: f32 = 0.1;

/// A stroke expanded into a single closed outline polygon.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpandedStroke {
    pub points: ArrayVec<Point, MAX_STROKE_OUTPUT>,
    pub closed: bool,
}

/// A stroke expanded into an indexed triangle mesh, ready for submission.
#[derive(Clone, Debug)]
pub struct StrokeTriangles {
    pub vertices: ArrayVec<Point, MAX_STROKE_OUTPUT>,
    pub indices: ArrayVec<u32, MAX_STROKE_INDICES>,
}

/// Expand a polyline into a closed outline polygon.
///
/// Open paths receive caps at both ends; closed paths wrap around and take
/// joins at every vertex. The outline is assembled as start cap, left
/// offsets forward, end cap, right offsets in reverse.
pub fn expand_stroke(
    points: &[Point],
    style: &StrokeStyle,
    closed: bool,
) -> Result<ExpandedStroke, StrokeError> {
    validate(points, style)?;

    let half_width = style.width * 0.5;
    let n = points.len();

    let mut out = ArrayVec::new();
    let mut right: ArrayVec<Point, MAX_STROKE_OUTPUT> = ArrayVec::new();

    if closed {
        for i in 0..n {
            let in_dir = dir_between(points, (i + n - 1) % n, i);
            let out_dir = dir_between(points, i, (i + 1) % n);
            emit_join(&mut out, points[i], in_dir, out_dir, 1.0, half_width, style)?;
        }
        for i in 0..n {
            let in_dir = dir_between(points, (i + n - 1) % n, i);
            let out_dir = dir_between(points, i, (i + 1) % n);
            emit_join(&mut right, points[i], in_dir, out_dir, -1.0, half_width, style)?;
        }

        while let Some(p) = right.pop() {
            push(&mut out, p)?;
        }

        return Ok(ExpandedStroke {
            points: out,
            closed: true,
        });
    }

    let start_dir = dir_between(points, 0, 1);
    let end_dir = dir_between(points, n - 2, n - 1);
    let start_normal = perp(start_dir);
    let end_normal = perp(end_dir);

    // Round caps contribute their interior arc points; butt and square caps
    // only adjust the endpoint offsets.
    if style.cap == LineCap::Round {
        emit_cap_arc(&mut out, points[0], -start_normal, -start_dir, half_width)?;
    }

    push(
        &mut out,
        cap_offset(points[0], start_dir, start_normal, 1.0, half_width, style.cap, true),
    )?;
    for i in 1..n - 1 {
        let in_dir = dir_between(points, i - 1, i);
        let out_dir = dir_between(points, i, i + 1);
        emit_join(&mut out, points[i], in_dir, out_dir, 1.0, half_width, style)?;
    }
    push(
        &mut out,
        cap_offset(points[n - 1], end_dir, end_normal, 1.0, half_width, style.cap, false),
    )?;

    if style.cap == LineCap::Round {
        emit_cap_arc(&mut out, points[n - 1], end_normal, end_dir, half_width)?;
    }

    push(
        &mut right,
        cap_offset(points[0], start_dir, start_normal, -1.0, half_width, style.cap, true),
    )?;
    for i in 1..n - 1 {
        let in_dir = dir_between(points, i - 1, i);
        let out_dir = dir_between(points, i, i + 1);
        emit_join(&mut right, points[i], in_dir, out_dir, -1.0, half_width, style)?;
    }
    push(
        &mut right,
        cap_offset(points[n - 1], end_dir, end_normal, -1.0, half_width, style.cap, false),
    )?;

    while let Some(p) = right.pop() {
        push(&mut out, p)?;
    }

    Ok(ExpandedStroke {
        points: out,
        closed: false,
    })
}

/// Expand a polyline directly into an indexed triangle mesh.
///
/// Left and right offset vertices are emitted in parallel (`L_i` at `2i`,
/// `R_i` at `2i + 1`); each segment contributes the quad
/// `(L_i, L_{i+1}, R_{i+1})`, `(L_i, R_{i+1}, R_i)`. Caps append a fan or a
/// rectangle patch referencing the outermost left/right indices.
pub fn expand_stroke_to_triangles(
    points: &[Point],
    style: &StrokeStyle,
    closed: bool,
) -> Result<StrokeTriangles, StrokeError> {
    validate(points, style)?;

    let half_width = style.width * 0.5;
    let n = points.len();

    let mut mesh = StrokeTriangles {
        vertices: ArrayVec::new(),
        indices: ArrayVec::new(),
    };

    for i in 0..n {
        let (left, right) = vertex_offsets(points, i, closed, half_width);
        push(&mut mesh.vertices, left)?;
        push(&mut mesh.vertices, right)?;
    }

    let num_segments = if closed { n } else { n - 1 };
    for i in 0..num_segments {
        let li = (2 * i) as u32;
        let ri = li + 1;
        let lj = (2 * ((i + 1) % n)) as u32;
        let rj = lj + 1;

        push_triangle(&mut mesh.indices, li, lj, rj)?;
        push_triangle(&mut mesh.indices, li, rj, ri)?;
    }

    if !closed {
        let start_dir = dir_between(points, 0, 1);
        let end_dir = dir_between(points, n - 2, n - 1);
        let last_left = (2 * (n - 1)) as u32;
        let last_right = last_left + 1;

        emit_cap_patch(&mut mesh, points[0], -start_dir, 1, 0, half_width, style.cap)?;
        emit_cap_patch(
            &mut mesh,
            points[n - 1],
            end_dir,
            last_left,
            last_right,
            half_width,
            style.cap,
        )?;
    }

    Ok(mesh)
}

fn validate(points: &[Point], style: &StrokeStyle) -> Result<(), StrokeError> {
    if points.len() > MAX_STROKE_INPUT {
        return Err(StrokeError::TooManyInputPoints);
    }
    if points.len() < 2 {
        return Err(StrokeError::DegeneratePath);
    }
    // The comparisons also reject NaN.
    if !(style.width > 0.0) || !(style.miter_limit > 0.0) {
        return Err(StrokeError::DegeneratePath);
    }

    Ok(())
}

fn push(
    out: &mut ArrayVec<Point, MAX_STROKE_OUTPUT>,
    p: Point,
) -> Result<(), StrokeError> {
    out.try_push(p).map_err(|_| StrokeError::TooManyOutputPoints)
}

fn push_triangle(
    indices: &mut ArrayVec<u32, MAX_STROKE_INDICES>,
    a: u32,
    b: u32,
    c: u32,
) -> Result<(), StrokeError> {
    indices.try_push(a).map_err(|_| StrokeError::TooManyOutputPoints)?;
    indices.try_push(b).map_err(|_| StrokeError::TooManyOutputPoints)?;
    indices.try_push(c).map_err(|_| StrokeError::TooManyOutputPoints)?;

    Ok(())
}

/// Unit direction from `points[i]` to `points[j]`.
///
/// Zero-length segments fall back to the positive x axis (see
/// `safe_normalize`), so duplicate input points cannot produce NaN offsets.
fn dir_between(points: &[Point], i: usize, j: usize) -> Vector {
    safe_normalize(points[j] - points[i])
}

/// Offset of an open-path endpoint, on one side, adjusted for the cap.
fn cap_offset(
    position: Point,
    dir: Vector,
    normal: Vector,
    side: f32,
    half_width: f32,
    cap: LineCap,
    is_start: bool,
) -> Point {
    let offset = position + normal * (side * half_width);
    match cap {
        LineCap::Butt | LineCap::Round => offset,
        LineCap::Square => {
            let extent = if is_start { -half_width } else { half_width };
            offset + dir * extent
        }
    }
}

/// Emit the join geometry of one interior (or closed-path) vertex on one
/// side of the stroke.
///
/// The outer side of the turn takes the configured join; the inner side
/// takes a single offset at the segment intersection, clamped to avoid
/// self-intersection on sharp turns.
fn emit_join(
    out: &mut ArrayVec<Point, MAX_STROKE_OUTPUT>,
    position: Point,
    in_dir: Vector,
    out_dir: Vector,
    side: f32,
    half_width: f32,
    style: &StrokeStyle,
) -> Result<(), StrokeError> {
    let n0 = perp(in_dir);
    let n1 = perp(out_dir);
    let cross = in_dir.cross(out_dir);
    let dot = in_dir.dot(out_dir);

    if cross.abs() < COLLINEAR_CROSS_EPSILON && dot > COLLINEAR_DOT_MIN {
        let avg = safe_normalize(n0 + n1);
        return push(out, position + avg * (side * half_width));
    }

    let avg = safe_normalize(n0 + n1);
    let miter_dot = avg.dot(n0);

    // A positive cross turns towards the left side, making the right side
    // the outer one.
    let outer_side = if cross > 0.0 { -1.0 } else { 1.0 };

    if side != outer_side {
        let d = (half_width / miter_dot).clamp(0.5 * half_width, 2.0 * half_width);
        return push(out, position + avg * (side * d));
    }

    match style.join {
        LineJoin::Bevel => {
            push(out, position + n0 * (side * half_width))?;
            push(out, position + n1 * (side * half_width))
        }
        LineJoin::Miter => {
            // miter_length / half_width = 1 / miter_dot.
            if miter_dot.abs() < MIN_MITER_DOT || (1.0 / miter_dot).abs() > style.miter_limit {
                push(out, position + n0 * (side * half_width))?;
                push(out, position + n1 * (side * half_width))
            } else {
                push(out, position + avg * (side * half_width / miter_dot))
            }
        }
        LineJoin::Round => {
            let from = n0 * side;
            let to = n1 * side;

            let a0 = from.y.atan2(from.x);
            let a1 = to.y.atan2(to.x);
            let mut delta = a1 - a0;
            if delta > PI {
                delta -= 2.0 * PI;
            } else if delta < -PI {
                delta += 2.0 * PI;
            }

            for k in 0..=ROUND_SEGMENTS {
                let a = a0 + delta * k as f32 / ROUND_SEGMENTS as f32;
                push(out, position + vector(a.cos(), a.sin()) * half_width)?;
            }

            Ok(())
        }
    }
}

/// Interior points of a semicircular cap, from the offset in `from_dir` to
/// its opposite, bulging towards `outward`. Both arc endpoints are emitted
/// by the adjacent side runs.
fn emit_cap_arc(
    out: &mut ArrayVec<Point, MAX_STROKE_OUTPUT>,
    center: Point,
    from_dir: Vector,
    outward: Vector,
    half_width: f32,
) -> Result<(), StrokeError> {
    let sign = if perp(from_dir).dot(outward) >= 0.0 {
        1.0
    } else {
        -1.0
    };
    let a0 = from_dir.y.atan2(from_dir.x);

    for k in 1..ROUND_SEGMENTS {
        let a = a0 + sign * PI * k as f32 / ROUND_SEGMENTS as f32;
        push(out, center + vector(a.cos(), a.sin()) * half_width)?;
    }

    Ok(())
}

/// The single left/right offset pair of one vertex for the direct mesh.
fn vertex_offsets(points: &[Point], i: usize, closed: bool, half_width: f32) -> (Point, Point) {
    let n = points.len();
    let position = points[i];

    if !closed && i == 0 {
        let normal = perp(dir_between(points, 0, 1));
        return (
            position + normal * half_width,
            position - normal * half_width,
        );
    }
    if !closed && i == n - 1 {
        let normal = perp(dir_between(points, n - 2, n - 1));
        return (
            position + normal * half_width,
            position - normal * half_width,
        );
    }

    let in_dir = dir_between(points, (i + n - 1) % n, i);
    let out_dir = dir_between(points, i, (i + 1) % n);
    let n0 = perp(in_dir);
    let n1 = perp(out_dir);
    let avg = safe_normalize(n0 + n1);

    let cross = in_dir.cross(out_dir);
    let dot = in_dir.dot(out_dir);

    let d = if cross.abs() < COLLINEAR_CROSS_EPSILON && dot > COLLINEAR_DOT_MIN {
        half_width
    } else {
        (half_width / avg.dot(n0)).clamp(0.5 * half_width, 2.0 * half_width)
    };

    (position + avg * d, position - avg * d)
}

/// Cap geometry for the direct mesh: nothing for butt, a rectangle patch
/// for square, a fan for round. New vertices connect to the existing
/// outermost left/right indices.
fn emit_cap_patch(
    mesh: &mut StrokeTriangles,
    position: Point,
    outward: Vector,
    left: u32,
    right: u32,
    half_width: f32,
    cap: LineCap,
) -> Result<(), StrokeError> {
    match cap {
        LineCap::Butt => Ok(()),
        LineCap::Square => {
            let normal = perp(outward);
            let a = mesh.vertices.len() as u32;
            push(&mut mesh.vertices, position + (normal + outward) * half_width)?;
            let b = mesh.vertices.len() as u32;
            push(&mut mesh.vertices, position + (outward - normal) * half_width)?;

            push_triangle(&mut mesh.indices, left, a, b)?;
            push_triangle(&mut mesh.indices, left, b, right)
        }
        LineCap::Round => {
            let anchor_dir = safe_normalize(mesh.vertices[left as usize] - position);
            let sign = if perp(anchor_dir).dot(outward) >= 0.0 {
                1.0
            } else {
                -1.0
            };
            let a0 = anchor_dir.y.atan2(anchor_dir.x);

            // Fan anchored at the existing left index, walking the arc
            // towards the right index.
            let mut prev = None;
            for k in 1..ROUND_SEGMENTS {
                let a = a0 + sign * PI * k as f32 / ROUND_SEGMENTS as f32;
                let idx = mesh.vertices.len() as u32;
                push(
                    &mut mesh.vertices,
                    position + vector(a.cos(), a.sin()) * half_width,
                )?;
                if let Some(prev) = prev {
                    push_triangle(&mut mesh.indices, left, prev, idx)?;
                }
                prev = Some(idx);
            }
            if let Some(prev) = prev {
                push_triangle(&mut mesh.indices, left, prev, right)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nib_geom::point;

    fn contains(points: &[Point], expected: Point) -> bool {
        points
            .iter()
            .any(|p| (*p - expected).square_length() < 1e-6)
    }

    #[test]
    fn horizontal_line_butt_miter() {
        let line = [point(0.0, 0.0), point(100.0, 0.0)];
        let style = StrokeStyle::DEFAULT.with_width(10.0);

        let stroke = expand_stroke(&line, &style, false).unwrap();

        assert_eq!(stroke.points.len(), 4);
        assert!(!stroke.closed);
        for expected in &[
            point(0.0, 5.0),
            point(100.0, 5.0),
            point(100.0, -5.0),
            point(0.0, -5.0),
        ] {
            assert!(contains(&stroke.points, *expected));
        }
    }

    #[test]
    fn open_miter_outline_has_two_points_per_vertex() {
        // A gentle zig-zag, no miter limit triggered.
        let polyline = [
            point(0.0, 0.0),
            point(10.0, 1.0),
            point(20.0, 0.0),
            point(30.0, 2.0),
        ];
        let style = StrokeStyle::DEFAULT.with_width(2.0);

        let stroke = expand_stroke(&polyline, &style, false).unwrap();
        assert_eq!(stroke.points.len(), 2 * polyline.len());
    }

    #[test]
    fn square_cap_extends_past_endpoints() {
        let line = [point(0.0, 0.0), point(10.0, 0.0)];
        let style = StrokeStyle::DEFAULT
            .with_width(4.0)
            .with_cap(LineCap::Square);

        let stroke = expand_stroke(&line, &style, false).unwrap();

        assert_eq!(stroke.points.len(), 4);
        assert!(contains(&stroke.points, point(-2.0, 2.0)));
        assert!(contains(&stroke.points, point(12.0, -2.0)));
    }

    #[test]
    fn round_cap_point_count_and_radius() {
        let line = [point(0.0, 0.0), point(10.0, 0.0)];
        let style = StrokeStyle::DEFAULT
            .with_width(6.0)
            .with_cap(LineCap::Round);

        let stroke = expand_stroke(&line, &style, false).unwrap();

        // 4 side points plus the interior points of both semicircles.
        assert_eq!(stroke.points.len(), 4 + 2 * (ROUND_SEGMENTS - 1));

        for p in &stroke.points {
            let from_start = (*p - point(0.0, 0.0)).length();
            let from_end = (*p - point(10.0, 0.0)).length();
            assert!((from_start - 3.0).abs() < 1e-4 || (from_end - 3.0).abs() < 1e-4);
        }
    }

    #[test]
    fn bevel_join_point_count() {
        let bend = [point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0)];
        let style = StrokeStyle::DEFAULT
            .with_width(2.0)
            .with_join(LineJoin::Bevel);

        let stroke = expand_stroke(&bend, &style, false).unwrap();
        // One side gets the two-point bevel, the other the single clamped
        // inner offset.
        assert_eq!(stroke.points.len(), 7);
    }

    #[test]
    fn miter_join_point_count_and_tip() {
        let bend = [point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0)];
        let style = StrokeStyle::DEFAULT.with_width(2.0);

        let stroke = expand_stroke(&bend, &style, false).unwrap();
        assert_eq!(stroke.points.len(), 6);

        // The outer miter tip of a right angle sits on the corner diagonal,
        // sqrt(2) half-widths away.
        assert!(contains(&stroke.points, point(11.0, -1.0)));
    }

    #[test]
    fn miter_limit_falls_back_to_bevel() {
        // This turn has a miter length of about 4.3 half-widths.
        let spike = [point(0.0, 0.0), point(10.0, 0.0), point(0.0, 5.0)];

        let strict = StrokeStyle::DEFAULT.with_width(2.0).with_miter_limit(1.5);
        let stroke = expand_stroke(&spike, &strict, false).unwrap();
        // Bevel fallback: 2 outer points at the join instead of 1.
        assert_eq!(stroke.points.len(), 7);

        let generous = StrokeStyle::DEFAULT.with_width(2.0).with_miter_limit(5.0);
        let stroke = expand_stroke(&spike, &generous, false).unwrap();
        assert_eq!(stroke.points.len(), 6);
    }

    #[test]
    fn round_join_point_count() {
        let bend = [point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0)];
        let style = StrokeStyle::DEFAULT
            .with_width(2.0)
            .with_join(LineJoin::Round);

        let stroke = expand_stroke(&bend, &style, false).unwrap();
        assert_eq!(stroke.points.len(), ROUND_SEGMENTS + 6);
    }

    #[test]
    fn closed_outline_wraps() {
        let square = [
            point(0.0, 0.0),
            point(10.0, 0.0),
            point(10.0, 10.0),
            point(0.0, 10.0),
        ];
        let style = StrokeStyle::DEFAULT.with_width(2.0);

        let stroke = expand_stroke(&square, &style, true).unwrap();
        assert!(stroke.closed);
        // Miter joins: one point per vertex per side.
        assert_eq!(stroke.points.len(), 8);

        // Outer corners extend beyond the square, inner corners stay
        // within it.
        assert!(contains(&stroke.points, point(-1.0, -1.0)));
        assert!(contains(&stroke.points, point(11.0, 11.0)));
    }

    #[test]
    fn degenerate_inputs() {
        let style = StrokeStyle::DEFAULT;

        assert_eq!(
            expand_stroke(&[point(0.0, 0.0)], &style, false),
            Err(StrokeError::DegeneratePath)
        );

        let line = [point(0.0, 0.0), point(1.0, 0.0)];
        assert_eq!(
            expand_stroke(&line, &StrokeStyle::DEFAULT.with_width(0.0), false),
            Err(StrokeError::DegeneratePath)
        );
        assert_eq!(
            expand_stroke(&line, &StrokeStyle::DEFAULT.with_miter_limit(-1.0), false),
            Err(StrokeError::DegeneratePath)
        );

        let too_many = vec![point(0.0, 0.0); MAX_STROKE_INPUT + 1];
        assert_eq!(
            expand_stroke(&too_many, &style, false),
            Err(StrokeError::TooManyInputPoints)
        );
    }

    #[test]
    fn duplicate_points_stay_finite() {
        let degenerate = [point(5.0, 5.0), point(5.0, 5.0), point(10.0, 5.0)];
        let style = StrokeStyle::DEFAULT.with_width(2.0);

        let stroke = expand_stroke(&degenerate, &style, false).unwrap();
        for p in &stroke.points {
            assert!(p.x.is_finite() && p.y.is_finite());
        }
    }

    #[test]
    fn line_mesh_layout() {
        let line = [point(0.0, 0.0), point(100.0, 0.0)];
        let style = StrokeStyle::DEFAULT.with_width(10.0);

        let mesh = expand_stroke_to_triangles(&line, &style, false).unwrap();

        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.vertices[0], point(0.0, 5.0));
        assert_eq!(mesh.vertices[1], point(0.0, -5.0));
        assert_eq!(mesh.vertices[2], point(100.0, 5.0));
        assert_eq!(mesh.vertices[3], point(100.0, -5.0));
        assert_eq!(&mesh.indices[..], &[0, 2, 3, 0, 3, 1]);
    }

    #[test]
    fn closed_mesh_wraps_with_a_quad() {
        let square = [
            point(0.0, 0.0),
            point(10.0, 0.0),
            point(10.0, 10.0),
            point(0.0, 10.0),
        ];
        let style = StrokeStyle::DEFAULT.with_width(2.0);

        let mesh = expand_stroke_to_triangles(&square, &style, true).unwrap();

        assert_eq!(mesh.vertices.len(), 8);
        // Four segments including the wrap, two triangles each.
        assert_eq!(mesh.indices.len(), 4 * 6);

        // The wrap quad references the first vertex pair again.
        let tail = &mesh.indices[18..];
        assert!(tail.contains(&0) && tail.contains(&1));
    }

    #[test]
    fn square_cap_mesh_patches() {
        let line = [point(0.0, 0.0), point(10.0, 0.0)];
        let style = StrokeStyle::DEFAULT
            .with_width(4.0)
            .with_cap(LineCap::Square);

        let mesh = expand_stroke_to_triangles(&line, &style, false).unwrap();

        // 4 side vertices + 2 per cap patch.
        assert_eq!(mesh.vertices.len(), 8);
        // Segment quad + 2 triangles per cap.
        assert_eq!(mesh.indices.len(), 6 + 6 + 6);
    }

    #[test]
    fn round_cap_mesh_fans() {
        let line = [point(0.0, 0.0), point(10.0, 0.0)];
        let style = StrokeStyle::DEFAULT
            .with_width(4.0)
            .with_cap(LineCap::Round);

        let mesh = expand_stroke_to_triangles(&line, &style, false).unwrap();

        assert_eq!(mesh.vertices.len(), 4 + 2 * (ROUND_SEGMENTS - 1));
        assert_eq!(mesh.indices.len(), 6 + 2 * 3 * (ROUND_SEGMENTS - 1));

        for p in &mesh.vertices {
            assert!(p.x.is_finite() && p.y.is_finite());
        }
    }
}
