//! Ear-clipping triangulation with a reflex-vertex set.
//!
//! Only reflex vertices can lie inside an ear candidate's triangle, so the
//! containment scan is restricted to the reflex set. This brings the cost
//! from O(n²) per clipped ear down to O(n·r) for the whole polygon, where
//! r is the reflex count.

use crate::TriangulationError;
use nib_geom::arrayvec::ArrayVec;
use nib_geom::limits::{MAX_FLATTENED_POINTS, MAX_PATH_VERTICES};
use nib_geom::utils::signed_area;
use nib_geom::Point;
use nib_path::IndexSlice;

/// Signed areas below this threshold count as degenerate.
const AREA_EPSILON: f32 = 1e-10;

/// The index buffer accumulates every sub-polygon of a maximal path between
/// resets.
const INDEX_BUFFER_CAPACITY: usize = 3 * (MAX_FLATTENED_POINTS - 2);

/// Fixed-capacity bitset marking which vertices of the active polygon are
/// currently concave. Rebuilt on every `triangulate` call and kept in sync
/// during ear removal.
struct ReflexSet {
    bits: [u64; MAX_PATH_VERTICES / 64],
}

impl ReflexSet {
    fn new() -> Self {
        ReflexSet {
            bits: [0; MAX_PATH_VERTICES / 64],
        }
    }

    fn clear(&mut self) {
        for word in &mut self.bits {
            *word = 0;
        }
    }

    #[inline]
    fn set(&mut self, index: usize, reflex: bool) {
        debug_assert!(index < MAX_PATH_VERTICES);
        if reflex {
            self.bits[index / 64] |= 1 << (index % 64);
        } else {
            self.bits[index / 64] &= !(1 << (index % 64));
        }
    }

    #[inline]
    fn contains(&self, index: usize) -> bool {
        self.bits[index / 64] & (1 << (index % 64)) != 0
    }
}

/// Converts one simple polygon at a time into CCW triangle indices
/// referencing the caller's vertex buffer.
///
/// The triangulator owns its working memory; create one per worker and
/// reuse it across frames with [`Triangulator::reset`].
pub struct Triangulator {
    indices: Vec<u32>,
    active: ArrayVec<u32, MAX_PATH_VERTICES>,
    reflex: ReflexSet,
}

impl Default for Triangulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Triangulator {
    /// A triangulator with its index buffer allocated up front.
    pub fn new() -> Self {
        Triangulator {
            indices: Vec::with_capacity(INDEX_BUFFER_CAPACITY),
            active: ArrayVec::new(),
            reflex: ReflexSet::new(),
        }
    }

    /// Return the index buffer to empty without deallocating.
    pub fn reset(&mut self) {
        self.indices.clear();
    }

    /// Triangulate one sub-polygon of `points`, appending to the internal
    /// index buffer and returning the indices emitted by this call.
    ///
    /// Emitted indices are offset by `polygon.start` so they address the
    /// caller's point buffer directly. Output triangles are CCW regardless
    /// of the input winding. For an accepted polygon of `n` vertices,
    /// exactly `3 * (n - 2)` indices are emitted.
    pub fn triangulate(
        &mut self,
        points: &[Point],
        polygon: IndexSlice,
    ) -> Result<&[u32], TriangulationError> {
        let n = polygon.len() as usize;

        if n < 3 {
            return Err(TriangulationError::DegeneratePolygon);
        }
        if n > MAX_PATH_VERTICES || self.indices.len() + 3 * (n - 2) > INDEX_BUFFER_CAPACITY {
            return Err(TriangulationError::TooManyVertices);
        }

        let pts = &points[polygon.range()];

        let area = signed_area(pts);
        if area.abs() < AREA_EPSILON {
            return Err(TriangulationError::DegeneratePolygon);
        }

        // Process in CCW order so that every emitted (prev, curr, next)
        // triangle is CCW no matter the input winding.
        self.active.clear();
        for i in 0..n as u32 {
            self.active.push(i);
        }
        if area < 0.0 {
            self.active.reverse();
        }

        self.reflex.clear();
        for pos in 0..n {
            self.update_reflex_at(pts, pos);
        }

        let base = polygon.start;
        let first_index = self.indices.len();

        // The guard bounds the total number of candidate checks; running
        // out means the simple-polygon precondition does not hold.
        let mut iterations = n * n + n;

        'clip: while self.active.len() > 3 {
            let len = self.active.len();

            for pos in 0..len {
                if iterations == 0 {
                    log::warn!(
                        "ear clipping guard exhausted after {} iterations, {} of {} vertices remaining",
                        n * n + n,
                        self.active.len(),
                        n,
                    );
                    self.indices.truncate(first_index);
                    return Err(TriangulationError::EarClippingFailed);
                }
                iterations -= 1;

                let curr = self.active[pos] as usize;
                if self.reflex.contains(curr) {
                    continue;
                }

                let prev = self.active[(pos + len - 1) % len] as usize;
                let next = self.active[(pos + 1) % len] as usize;

                // Convexity can be stale between reflex updates; recheck.
                if corner_cross(pts[prev], pts[curr], pts[next]) <= 0.0 {
                    continue;
                }

                if !self.is_ear(pts, prev, curr, next) {
                    continue;
                }

                self.indices.push(base + prev as u32);
                self.indices.push(base + curr as u32);
                self.indices.push(base + next as u32);

                self.active.remove(pos);
                self.reflex.set(curr, false);

                // Removing the ear can make its neighbours convex.
                let len = self.active.len();
                self.update_reflex_at(pts, (pos + len - 1) % len);
                self.update_reflex_at(pts, pos % len);

                continue 'clip;
            }

            log::warn!(
                "no ear found after {} iterations, {} of {} vertices remaining",
                n * n + n - iterations,
                self.active.len(),
                n,
            );
            self.indices.truncate(first_index);
            return Err(TriangulationError::EarClippingFailed);
        }

        self.indices.push(base + self.active[0]);
        self.indices.push(base + self.active[1]);
        self.indices.push(base + self.active[2]);

        Ok(&self.indices[first_index..])
    }

    /// Recompute the reflex bit of the active vertex at `pos`.
    fn update_reflex_at(&mut self, pts: &[Point], pos: usize) {
        let len = self.active.len();
        let prev = self.active[(pos + len - 1) % len] as usize;
        let curr = self.active[pos] as usize;
        let next = self.active[(pos + 1) % len] as usize;

        self.reflex
            .set(curr, corner_cross(pts[prev], pts[curr], pts[next]) <= 0.0);
    }

    /// An ear is a convex corner whose triangle contains no active reflex
    /// vertex.
    fn is_ear(&self, pts: &[Point], prev: usize, curr: usize, next: usize) -> bool {
        for &w in &self.active {
            let w = w as usize;
            if w == prev || w == curr || w == next {
                continue;
            }
            if !self.reflex.contains(w) {
                continue;
            }
            if point_in_triangle(pts[prev], pts[curr], pts[next], pts[w]) {
                return false;
            }
        }

        true
    }
}

/// Cross product of the corner `(curr - prev) × (next - curr)`; negative or
/// zero for a reflex corner of a CCW polygon.
#[inline]
fn corner_cross(prev: Point, curr: Point, next: Point) -> f32 {
    (curr - prev).cross(next - curr)
}

/// Three half-plane sign tests against a CCW triangle. Points exactly on an
/// edge count as inside, which keeps ears conservative.
#[inline]
fn point_in_triangle(a: Point, b: Point, c: Point, p: Point) -> bool {
    (b - a).cross(p - a) >= 0.0 && (c - b).cross(p - b) >= 0.0 && (a - c).cross(p - c) >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use nib_geom::point;

    fn slice(start: u32, end: u32) -> IndexSlice {
        IndexSlice { start, end }
    }

    /// Sum of the signed areas of the emitted triangles.
    fn triangulated_area(points: &[Point], indices: &[u32]) -> f32 {
        let mut area = 0.0;
        for tri in indices.chunks(3) {
            let a = points[tri[0] as usize];
            let b = points[tri[1] as usize];
            let c = points[tri[2] as usize];
            area += (b - a).cross(c - a) * 0.5;
        }
        area
    }

    fn assert_all_ccw(points: &[Point], indices: &[u32]) {
        for tri in indices.chunks(3) {
            let a = points[tri[0] as usize];
            let b = points[tri[1] as usize];
            let c = points[tri[2] as usize];
            assert!(
                (b - a).cross(c - a) > 0.0,
                "triangle {:?} is not CCW",
                tri
            );
        }
    }

    #[test]
    fn ccw_square() {
        let points = [
            point(0.0, 0.0),
            point(1.0, 0.0),
            point(1.0, 1.0),
            point(0.0, 1.0),
        ];

        let mut triangulator = Triangulator::new();
        let indices = triangulator.triangulate(&points, slice(0, 4)).unwrap();

        assert_eq!(indices.len(), 6);
        assert_all_ccw(&points, indices);
        assert!((triangulated_area(&points, indices) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cw_square() {
        let points = [
            point(0.0, 0.0),
            point(0.0, 1.0),
            point(1.0, 1.0),
            point(1.0, 0.0),
        ];
        assert!(signed_area(&points) < 0.0);

        let mut triangulator = Triangulator::new();
        let indices = triangulator.triangulate(&points, slice(0, 4)).unwrap();

        assert_eq!(indices.len(), 6);
        // Output triangles are CCW even though the input is CW.
        assert_all_ccw(&points, indices);
        assert!((triangulated_area(&points, indices) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn l_shape() {
        let points = [
            point(0.0, 0.0),
            point(2.0, 0.0),
            point(2.0, 1.0),
            point(1.0, 1.0),
            point(1.0, 2.0),
            point(0.0, 2.0),
        ];

        let mut triangulator = Triangulator::new();
        let indices = triangulator.triangulate(&points, slice(0, 6)).unwrap();

        assert_eq!(indices.len(), 12);
        assert_all_ccw(&points, indices);
        assert!((triangulated_area(&points, indices) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn sub_polygon_offsets() {
        // The second polygon of a shared point buffer; indices must address
        // the buffer, not the sub-slice.
        let points = [
            point(9.0, 9.0),
            point(9.0, 9.0),
            point(0.0, 0.0),
            point(1.0, 0.0),
            point(1.0, 1.0),
        ];

        let mut triangulator = Triangulator::new();
        let indices = triangulator.triangulate(&points, slice(2, 5)).unwrap();

        assert_eq!(indices, &[2, 3, 4]);
    }

    #[test]
    fn accumulates_until_reset() {
        let points = [
            point(0.0, 0.0),
            point(1.0, 0.0),
            point(1.0, 1.0),
            point(2.0, 2.0),
            point(3.0, 2.0),
            point(3.0, 3.0),
        ];

        let mut triangulator = Triangulator::new();
        let first = triangulator
            .triangulate(&points, slice(0, 3))
            .unwrap()
            .to_vec();
        let second = triangulator
            .triangulate(&points, slice(3, 6))
            .unwrap()
            .to_vec();

        assert_eq!(first, vec![0, 1, 2]);
        assert_eq!(second, vec![3, 4, 5]);

        // Same input yields the same output given a reset between calls.
        triangulator.reset();
        let again = triangulator.triangulate(&points, slice(0, 3)).unwrap();
        assert_eq!(again, &first[..]);
    }

    #[test]
    fn degenerate_inputs() {
        let mut triangulator = Triangulator::new();

        let too_few = [point(0.0, 0.0), point(1.0, 0.0)];
        assert_eq!(
            triangulator.triangulate(&too_few, slice(0, 2)),
            Err(TriangulationError::DegeneratePolygon)
        );

        let collinear = [point(0.0, 0.0), point(1.0, 0.0), point(2.0, 0.0)];
        assert_eq!(
            triangulator.triangulate(&collinear, slice(0, 3)),
            Err(TriangulationError::DegeneratePolygon)
        );
    }

    #[test]
    fn concave_comb() {
        // A comb with several reflex teeth; a worst case for the reflex
        // containment scan.
        let points = [
            point(0.0, 0.0),
            point(6.0, 0.0),
            point(6.0, 3.0),
            point(5.0, 1.0),
            point(4.0, 3.0),
            point(3.0, 1.0),
            point(2.0, 3.0),
            point(1.0, 1.0),
            point(0.0, 3.0),
        ];

        let mut triangulator = Triangulator::new();
        let indices = triangulator.triangulate(&points, slice(0, 9)).unwrap();

        assert_eq!(indices.len(), 3 * (points.len() - 2));
        assert_all_ccw(&points, indices);
        let expected = signed_area(&points);
        assert!((triangulated_area(&points, indices) - expected).abs() < 1e-4);
    }
}
