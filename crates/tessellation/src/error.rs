/// The triangulator's error enumeration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TriangulationError {
    /// The polygon exceeds `MAX_PATH_VERTICES` or the index buffer is full.
    TooManyVertices,
    /// Fewer than three vertices, or a near-zero signed area.
    DegeneratePolygon,
    /// No ear was found in a full pass, or the iteration guard ran out.
    /// Indicates a self-intersecting or collinear-degenerate input.
    EarClippingFailed,
}

impl core::fmt::Display for TriangulationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TriangulationError::TooManyVertices => {
                write!(f, "Too many vertices")
            }
            TriangulationError::DegeneratePolygon => {
                write!(f, "Degenerate polygon")
            }
            TriangulationError::EarClippingFailed => {
                write!(f, "Ear clipping failed")
            }
        }
    }
}

impl std::error::Error for TriangulationError {}

/// The stroke expander's error enumeration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StrokeError {
    /// Fewer than two input points, or a pen that cannot mark (non-positive
    /// width or miter limit).
    DegeneratePath,
    /// More input points than `MAX_STROKE_INPUT`.
    TooManyInputPoints,
    /// A fixed-capacity output buffer overflowed mid-expansion.
    TooManyOutputPoints,
}

impl core::fmt::Display for StrokeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StrokeError::DegeneratePath => {
                write!(f, "Degenerate path")
            }
            StrokeError::TooManyInputPoints => {
                write!(f, "Too many input points")
            }
            StrokeError::TooManyOutputPoints => {
                write!(f, "Too many output points")
            }
        }
    }
}

impl std::error::Error for StrokeError {}
