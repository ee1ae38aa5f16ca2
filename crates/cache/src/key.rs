//! Memoization keys for rasterized icons.

/// The cache key of one rasterized icon variant.
///
/// The stroke width is quantized to 0.25-unit granularity so that animated
/// or interpolated widths cannot explode the cache cardinality.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct RasterKey {
    pub path_hash: u64,
    pub device_size: u16,
    pub has_fill: bool,
    pub has_stroke: bool,
    pub stroke_width_q: u8,
}

impl RasterKey {
    pub fn new(
        path_data: &str,
        logical_size: f32,
        scale_factor: f32,
        has_fill: bool,
        stroke_width: Option<f32>,
    ) -> Self {
        debug_assert!(logical_size >= 0.0 && scale_factor > 0.0);

        let device_size = (logical_size * scale_factor)
            .round()
            .clamp(0.0, u16::MAX as f32) as u16;

        let (has_stroke, stroke_width_q) = match stroke_width {
            Some(width) => (true, quantize_stroke_width(width)),
            None => (false, 0),
        };

        RasterKey {
            path_hash: wyhash::wyhash(path_data.as_bytes(), 0),
            device_size,
            has_fill,
            has_stroke,
            stroke_width_q,
        }
    }

    /// The width the rasterizer should draw with: the quantized value, not
    /// the caller's, so that equal keys rasterize identically.
    pub fn stroke_width(&self) -> Option<f32> {
        if self.has_stroke {
            Some(self.stroke_width_q as f32 / 4.0)
        } else {
            None
        }
    }
}

/// `min(255, round(width * 4))`.
fn quantize_stroke_width(width: f32) -> u8 {
    (width * 4.0).round().clamp(0.0, 255.0) as u8
}
