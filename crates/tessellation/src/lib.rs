#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::float_cmp)]

//! Triangulation of 2D fill and stroke geometry.
//!
//! This crate is reexported in the `nib` umbrella crate.
//!
//! ## Overview
//!
//! The most interesting types of this crate are:
//!
//! * [`Triangulator`] - Ear-clipping triangulation of simple (possibly
//!   concave) polygons into a triangle index buffer.
//! * [`expand_stroke`] - Expansion of a polyline and a [`StrokeStyle`] into
//!   a closed outline polygon, ready for the triangulator.
//! * [`expand_stroke_to_triangles`] - Expansion of a polyline directly into
//!   an indexed triangle mesh, bypassing triangulation.
//!
//! The triangulators produce geometry in the form of vertex and index
//! buffers which are expected to be rendered using the equivalent of
//! OpenGL's `glDrawElements` with mode `GL_TRIANGLES`.
//!
//! Inputs are flattened ahead of time (see `nib_path::flatten`); this crate
//! only ever sees straight line segments.

pub use nib_geom as geom;
pub use nib_path as path;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

mod earcut;
mod error;
mod stroke;

#[doc(inline)]
pub use crate::earcut::Triangulator;

#[doc(inline)]
pub use crate::error::{StrokeError, TriangulationError};

#[doc(inline)]
pub use crate::stroke::{expand_stroke, expand_stroke_to_triangles, ExpandedStroke, StrokeTriangles};

/// Line cap as defined by the SVG specification.
///
/// Default value: `LineCap::Butt`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum LineCap {
    /// The stroke is squared off at the endpoint of the path.
    Butt,
    /// A semicircle of the stroke's half width is drawn around the
    /// endpoint.
    Round,
    /// The stroke extends past the endpoint by half the stroke width.
    Square,
}

/// Line join as defined by the SVG specification.
///
/// Default value: `LineJoin::Miter`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum LineJoin {
    /// A sharp corner extended to the outer segment intersection, falling
    /// back to bevel past the miter limit.
    Miter,
    /// A circular arc between the two outer segment edges.
    Round,
    /// A flat cut between the two outer segment edges.
    Bevel,
}

/// Parameters for the stroke expander.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct StrokeStyle {
    /// Line width, in the polyline's coordinate space.
    ///
    /// Must be greater than zero.
    /// Default value: `StrokeStyle::DEFAULT_WIDTH`.
    pub width: f32,

    /// What cap to use at the free ends of an open path.
    ///
    /// Default value: `LineCap::Butt`.
    pub cap: LineCap,

    /// What join to use between segments.
    ///
    /// Default value: `LineJoin::Miter`.
    pub join: LineJoin,

    /// See the SVG specification.
    ///
    /// Must be greater than zero.
    /// Default value: `StrokeStyle::DEFAULT_MITER_LIMIT`.
    pub miter_limit: f32,
}

impl StrokeStyle {
    /// Default miter limit as defined by the SVG specification.
    pub const DEFAULT_MITER_LIMIT: f32 = 4.0;
    pub const DEFAULT_WIDTH: f32 = 1.0;
    pub const DEFAULT_CAP: LineCap = LineCap::Butt;
    pub const DEFAULT_JOIN: LineJoin = LineJoin::Miter;

    pub const DEFAULT: Self = StrokeStyle {
        width: Self::DEFAULT_WIDTH,
        cap: Self::DEFAULT_CAP,
        join: Self::DEFAULT_JOIN,
        miter_limit: Self::DEFAULT_MITER_LIMIT,
    };

    #[inline]
    pub const fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    #[inline]
    pub const fn with_cap(mut self, cap: LineCap) -> Self {
        self.cap = cap;
        self
    }

    #[inline]
    pub const fn with_join(mut self, join: LineJoin) -> Self {
        self.join = join;
        self
    }

    #[inline]
    pub const fn with_miter_limit(mut self, limit: f32) -> Self {
        self.miter_limit = limit;
        self
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self::DEFAULT
    }
}
