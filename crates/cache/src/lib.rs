#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]

//! Memoization of software-rasterized icons in a growable texture atlas.
//!
//! This crate is reexported in the `nib` umbrella crate.
//!
//! [`RasterCache`] keys icons by their path data, device size and style
//! ([`RasterKey`]), rasterizes misses through a pluggable [`RasterBackend`],
//! and packs the results into one RGBA atlas. Rasterization work is bounded
//! per frame; misses past the budget return
//! [`CacheError::RasterizationDeferred`] and flip a flag the host observes
//! to schedule another render pass.
//!
//! The cache is the one shared-mutable piece of the pipeline: a single
//! coarse mutex guards the map, the atlas, the scratch buffer and the frame
//! counters, so multiple render threads of a multi-window host can share
//! one instance.

pub use nib_geom as geom;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

mod atlas;
mod backend;
mod cache;
mod id;
mod key;

#[doc(inline)]
pub use crate::atlas::{AtlasRegion, AtlasSlot};
#[doc(inline)]
pub use crate::backend::{NullBackend, RasterBackend, RasterRequest, RasterizedIcon};
#[doc(inline)]
pub use crate::cache::{AtlasView, RasterCache};
#[doc(inline)]
pub use crate::id::{ElementId, ElementIdMap, IdentityBuildHasher, IdentityHasher};
#[doc(inline)]
pub use crate::key::RasterKey;

use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum CacheError {
    /// The per-frame rasterization budget is exhausted. Not an input error:
    /// suppress the element for this frame and request another one.
    #[error("Rasterization deferred to the next frame.")]
    RasterizationDeferred,
    /// The icon cannot fit the scratch buffer or the atlas at its maximum
    /// size.
    #[error("Icon too large to rasterize.")]
    IconTooLarge,
    /// The provided pixel buffer is too small for the request.
    #[error("Pixel buffer too small.")]
    BufferTooSmall,
    /// Empty path data cannot produce an icon.
    #[error("Empty path.")]
    EmptyPath,
    /// The platform rasterizer failed.
    #[error("Graphics backend error: {0}.")]
    Graphics(String),
}
