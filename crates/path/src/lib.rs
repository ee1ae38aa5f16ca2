#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]

//! Parsing and flattening of SVG path data for the nib vector pipeline.
//!
//! This crate is reexported in the `nib` umbrella crate.
//!
//! Paths come in as raw SVG path data (`"M10 20 L30 40 Z"`) or as an XML
//! fragment of a small element subset, are stored as an [`SvgPath`] command
//! stream, and are flattened into sub-polygons of line segments that the
//! tessellation crate consumes.
//!
//! ```
//! use nib_path::{parser, flatten, SvgPath};
//!
//! let mut path = SvgPath::new();
//! parser::parse(&mut path, "M 0 0 L 10 0 L 10 10 Z").unwrap();
//!
//! let mut points = flatten::PolyPointBuf::new();
//! let mut polygons = flatten::PolygonBuf::new();
//! flatten::flatten_path(&path, 0.1, &mut points, &mut polygons).unwrap();
//!
//! assert_eq!(polygons.len(), 1);
//! ```

pub use nib_geom as geom;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

mod commands;
pub mod elements;
pub mod flatten;
pub mod parser;

#[doc(inline)]
pub use crate::commands::{Positioning, SvgCommand, SvgPath, SvgPathIter};
#[doc(inline)]
pub use crate::flatten::{flatten_path, FlattenError, PolyPointBuf, PolygonBuf};
#[doc(inline)]
pub use crate::parser::{append_path, parse, ParseError};

/// A half-open range `[start, end)` of vertex indices into a shared point
/// buffer, delineating one sub-polygon of a multi-polygon path.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct IndexSlice {
    pub start: u32,
    pub end: u32,
}

impl IndexSlice {
    #[inline]
    pub fn len(self) -> u32 {
        debug_assert!(self.end >= self.start);
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.end == self.start
    }

    /// The slice as a `usize` range, for indexing the point buffer.
    #[inline]
    pub fn range(self) -> core::ops::Range<usize> {
        self.start as usize..self.end as usize
    }
}
