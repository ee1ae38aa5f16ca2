//! The platform rasterizer interface and its deterministic test double.

use crate::CacheError;
use nib_geom::limits::MAX_RASTER_SIZE;
use nib_geom::Box2D;

/// What the rasterizer produced for one icon: a tight bitmap of
/// `width × height` pixels at the top-left of the scratch rows, positioned
/// at `(offset_x, offset_y)` relative to the logical icon origin.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RasterizedIcon {
    pub width: u32,
    pub height: u32,
    pub offset_x: i16,
    pub offset_y: i16,
}

/// One rasterization request.
///
/// The stroke width has already been quantized through the cache key, so
/// equal keys produce pixel-identical output.
#[derive(Clone, Debug)]
pub struct RasterRequest<'l> {
    pub path_data: &'l str,
    pub view_box: Box2D,
    pub device_size: u16,
    pub has_fill: bool,
    pub stroke_width: Option<f32>,
}

/// A software rasterizer.
///
/// Expected implementations wrap CoreGraphics, Cairo or Canvas2D; CI uses
/// [`NullBackend`]. `scratch` is an RGBA8 buffer of `MAX_RASTER_SIZE` rows
/// with a row stride of `MAX_RASTER_SIZE * 4` bytes, cleared by the cache
/// before the call.
pub trait RasterBackend {
    fn rasterize(
        &self,
        request: &RasterRequest,
        scratch: &mut [u8],
    ) -> Result<RasterizedIcon, CacheError>;
}

/// Deterministic stand-in rasterizer: an opaque white square covering the
/// whole device size, with no bearing offsets.
pub struct NullBackend;

impl RasterBackend for NullBackend {
    fn rasterize(
        &self,
        request: &RasterRequest,
        scratch: &mut [u8],
    ) -> Result<RasterizedIcon, CacheError> {
        let size = u32::from(request.device_size);
        if size > MAX_RASTER_SIZE {
            return Err(CacheError::IconTooLarge);
        }

        let stride = (MAX_RASTER_SIZE * 4) as usize;
        if scratch.len() < stride * size as usize {
            return Err(CacheError::BufferTooSmall);
        }

        for row in 0..size as usize {
            let start = row * stride;
            for byte in &mut scratch[start..start + size as usize * 4] {
                *byte = 0xff;
            }
        }

        Ok(RasterizedIcon {
            width: size,
            height: size,
            offset_x: 0,
            offset_y: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nib_geom::point;

    fn request(device_size: u16) -> RasterRequest<'static> {
        RasterRequest {
            path_data: "M 0 0 L 1 1",
            view_box: Box2D::new(point(0.0, 0.0), point(24.0, 24.0)),
            device_size,
            has_fill: true,
            stroke_width: None,
        }
    }

    #[test]
    fn null_backend_fills_the_device_square() {
        let mut scratch = vec![0u8; (MAX_RASTER_SIZE * MAX_RASTER_SIZE * 4) as usize];
        let raster = NullBackend.rasterize(&request(4), &mut scratch).unwrap();

        assert_eq!((raster.width, raster.height), (4, 4));
        assert_eq!((raster.offset_x, raster.offset_y), (0, 0));

        let stride = (MAX_RASTER_SIZE * 4) as usize;
        assert_eq!(&scratch[..16], &[0xff; 16]);
        // Outside the tight size the buffer is untouched.
        assert_eq!(scratch[16], 0);
        assert_eq!(scratch[4 * stride], 0);
    }

    #[test]
    fn short_scratch_is_rejected() {
        let mut scratch = vec![0u8; 64];
        assert_eq!(
            NullBackend.rasterize(&request(4), &mut scratch),
            Err(CacheError::BufferTooSmall)
        );
    }

    #[test]
    fn oversized_request_is_rejected() {
        let mut scratch = vec![0u8; (MAX_RASTER_SIZE * MAX_RASTER_SIZE * 4) as usize];
        assert_eq!(
            NullBackend.rasterize(&request(MAX_RASTER_SIZE as u16 + 1), &mut scratch),
            Err(CacheError::IconTooLarge)
        );
    }
}
