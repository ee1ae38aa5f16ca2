#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::many_single_char_names)]

//! Simple 2D geometric primitives on top of euclid, plus the adaptive
//! flattening routines used by the rest of the nib vector pipeline.
//!
//! This crate is reexported in the `nib` umbrella crate.
//!
//! # Overview
//!
//! This crate implements the maths to work with:
//!
//! - quadratic and cubic bézier curves,
//! - elliptic arcs in both SVG endpoint and center parameterizations,
//! - the stroke/join normal computations shared with the tessellation crate.
//!
//! # Flattening
//!
//! Flattening is the action of approximating a curve with a succession of
//! line segments. The tolerance threshold taken as input by the flattening
//! routines corresponds to the maximum distance between the curve and its
//! linear approximation, relative to the length of the approximated chord.
//! The smaller the tolerance, the more precise the approximation and the
//! more segments are generated. This value is typically chosen in function
//! of the zoom level.

// Reexport dependencies.
pub use arrayvec;
pub use euclid;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub mod arc;
pub mod cubic_bezier;
pub mod limits;
pub mod quadratic_bezier;
pub mod utils;

#[doc(inline)]
pub use crate::arc::{Arc, ArcFlags, SvgArc};
#[doc(inline)]
pub use crate::cubic_bezier::CubicBezierSegment;
#[doc(inline)]
pub use crate::quadratic_bezier::QuadraticBezierSegment;

/// Alias for `euclid::default::Point2D<f32>`.
pub type Point = euclid::default::Point2D<f32>;

/// Alias for `euclid::default::Vector2D<f32>`.
pub type Vector = euclid::default::Vector2D<f32>;

/// An angle in radians.
pub type Angle = euclid::Angle<f32>;

/// Alias for `euclid::default::Box2D<f32>`.
pub type Box2D = euclid::default::Box2D<f32>;

/// Alias for `euclid::default::Size2D<f32>`.
pub type Size = euclid::default::Size2D<f32>;

/// Shorthand for `Point::new`.
#[inline]
pub fn point(x: f32, y: f32) -> Point {
    Point::new(x, y)
}

/// Shorthand for `Vector::new`.
#[inline]
pub fn vector(x: f32, y: f32) -> Vector {
    Vector::new(x, y)
}
