//! Compile-time bounds shared across the pipeline.
//!
//! Every per-frame operation in the pipeline works out of caller-owned
//! slices or fixed-capacity buffers sized by these constants, so that the
//! hot path never allocates. Raising a limit grows the corresponding
//! scratch buffers; it never changes behavior below the limit.

/// Upper bound on parsed commands per path.
pub const MAX_PATH_COMMANDS: usize = 2048;

/// Upper bound on vertices per flattened sub-polygon.
///
/// Sizes the triangulator's active list and reflex set.
pub const MAX_PATH_VERTICES: usize = 512;

/// Upper bound on indices emitted for a single sub-polygon.
pub const MAX_PATH_INDICES: usize = 3 * (MAX_PATH_VERTICES - 2);

/// Upper bound on flattened points for a whole path, across sub-polygons.
pub const MAX_FLATTENED_POINTS: usize = 2048;

/// Upper bound on sub-polygons per path.
pub const MAX_SUB_POLYGONS: usize = 64;

/// Upper bound on the polyline length accepted by the stroke expander.
pub const MAX_STROKE_INPUT: usize = 256;

/// Upper bound on emitted stroke outline / mesh vertices.
pub const MAX_STROKE_OUTPUT: usize = 4096;

/// Subdivision count for round caps and joins.
pub const ROUND_SEGMENTS: usize = 8;

/// Rasterization work budget per frame.
pub const MAX_RASTERIZATIONS_PER_FRAME: u32 = 4;

/// Largest icon edge in device pixels; sizes the rasterization scratch
/// buffer.
pub const MAX_RASTER_SIZE: u32 = 256;

/// Edge of the atlas texture at creation.
pub const INITIAL_ATLAS_SIZE: u32 = 512;

/// Edge the atlas may grow to by doubling.
pub const MAX_ATLAS_SIZE: u32 = 4096;

/// Per-frame glyph instance cap, consumed by the scene layer.
pub const MAX_GLYPHS_PER_FRAME: usize = 4096;

/// Per-frame quad instance cap, consumed by the scene layer.
pub const MAX_QUADS_PER_FRAME: usize = 4096;
