#![deny(bare_trait_objects)]

//! The 2D vector path pipeline of the nib UI framework.
//!
//! # Crates
//!
//! This meta-crate (`nib`) reexports the following sub-crates for
//! convenience:
//!
//! * **nib_path** - SVG path data and element parsing, and flattening of
//!   command streams into sub-polygons.
//! * **nib_tessellation** - Stroke expansion and ear-clipping triangulation
//!   of flattened polygons.
//! * **nib_geom** - 2D maths for cubic and quadratic bézier curves, arcs
//!   and the shared static limits.
//! * **nib_cache** - Budgeted, thread-safe memoization of software
//!   rasterized icons in a texture atlas.
//!
//! Each `nib_<name>` crate is reexported as a `<name>` module in `nib`. For
//! example:
//!
//! ```ignore
//! use nib_tessellation::Triangulator;
//! ```
//!
//! Is equivalent to:
//!
//! ```ignore
//! use nib::tessellation::Triangulator;
//! ```
//!
//! # The pipeline
//!
//! SVG text parses into an `SvgPath` command stream, which flattens into a
//! point buffer plus sub-polygon slices. Filled polygons triangulate
//! through the `Triangulator`; stroked polylines expand through
//! `expand_stroke` (outline, then triangulate) or
//! `expand_stroke_to_triangles` (direct mesh). The resulting vertex and
//! index buffers are handed to the GPU layer, which is out of scope here.
//! Small icons take the alternative route through `cache::RasterCache`,
//! which memoizes software rasterizations in an atlas under a per-frame
//! budget.
//!
//! # Feature flags
//!
//! Serialization of the public option and key types using serde can be
//! enabled with the `serialization` feature flag (disabled by default).

pub use nib_cache as cache;
pub use nib_geom as geom;
pub use nib_path as path;
pub use nib_tessellation as tessellation;

#[cfg(test)]
mod tests {
    use crate::path::{flatten, parser, SvgPath};
    use crate::tessellation::Triangulator;

    // The whole fill pipeline: text to triangles.
    #[test]
    fn parse_flatten_triangulate() {
        let mut path = SvgPath::new();
        parser::parse(&mut path, "M 0 0 L 2 0 L 2 1 L 1 1 L 1 2 L 0 2 Z").unwrap();

        let mut points = flatten::PolyPointBuf::new();
        let mut polygons = flatten::PolygonBuf::new();
        flatten::flatten_path(&path, 0.1, &mut points, &mut polygons).unwrap();

        let mut triangulator = Triangulator::new();
        let mut total = 0;
        for polygon in &polygons {
            total += triangulator.triangulate(&points, *polygon).unwrap().len();
        }

        assert_eq!(total, 12);
    }
}
