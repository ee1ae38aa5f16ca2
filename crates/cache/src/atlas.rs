//! A growable RGBA atlas with shelf packing.

use nib_geom::limits::{INITIAL_ATLAS_SIZE, MAX_ATLAS_SIZE};
use nib_geom::{point, Box2D};

/// A rectangle of atlas pixels, in texels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct AtlasRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Where a rasterized icon landed in the atlas.
///
/// `atlas_size` is the atlas edge captured at insertion time. The cache
/// rewrites the field on every growth event, so UVs computed against it are
/// always consistent with the atlas that actually contains the region.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct AtlasSlot {
    pub region: AtlasRegion,
    pub offset_x: i16,
    pub offset_y: i16,
    pub atlas_size: u32,
}

impl AtlasSlot {
    /// Normalized texture coordinates of the region.
    pub fn uv_bounds(&self) -> Box2D {
        let size = self.atlas_size as f32;
        Box2D::new(
            point(self.region.x as f32 / size, self.region.y as f32 / size),
            point(
                (self.region.x + self.region.width) as f32 / size,
                (self.region.y + self.region.height) as f32 / size,
            ),
        )
    }
}

/// Shelf-packed pixel storage. Shelves fill left to right; a region that
/// does not fit the current shelf opens a new one below it.
pub(crate) struct Atlas {
    size: u32,
    pixels: Vec<u8>,
    shelf_x: u32,
    shelf_y: u32,
    shelf_height: u32,
}

impl Atlas {
    pub fn new() -> Self {
        Atlas {
            size: INITIAL_ATLAS_SIZE,
            pixels: vec![0; (INITIAL_ATLAS_SIZE * INITIAL_ATLAS_SIZE * 4) as usize],
            shelf_x: 0,
            shelf_y: 0,
            shelf_height: 0,
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Reserve a region, with one texel of padding against sampling bleed.
    pub fn allocate(&mut self, width: u32, height: u32) -> Option<AtlasRegion> {
        let padded_w = width + 1;
        let padded_h = height + 1;

        if padded_w > self.size {
            return None;
        }

        if self.shelf_x + padded_w > self.size {
            self.shelf_y += self.shelf_height;
            self.shelf_x = 0;
            self.shelf_height = 0;
        }

        if self.shelf_y + padded_h > self.size {
            return None;
        }

        let region = AtlasRegion {
            x: self.shelf_x,
            y: self.shelf_y,
            width,
            height,
        };

        self.shelf_x += padded_w;
        self.shelf_height = self.shelf_height.max(padded_h);

        Some(region)
    }

    /// Double the atlas edge, re-blitting existing rows so that previously
    /// returned regions stay valid at the same coordinates.
    pub fn grow(&mut self) -> bool {
        let new_size = self.size * 2;
        if new_size > MAX_ATLAS_SIZE {
            return false;
        }

        let mut pixels = vec![0u8; (new_size * new_size * 4) as usize];
        let old_stride = (self.size * 4) as usize;
        let new_stride = (new_size * 4) as usize;
        for row in 0..self.size as usize {
            pixels[row * new_stride..row * new_stride + old_stride]
                .copy_from_slice(&self.pixels[row * old_stride..(row + 1) * old_stride]);
        }

        self.pixels = pixels;
        self.size = new_size;

        true
    }

    /// Drop every region and zero the storage. The atlas keeps its current
    /// size.
    pub fn clear(&mut self) {
        for byte in &mut self.pixels {
            *byte = 0;
        }
        self.shelf_x = 0;
        self.shelf_y = 0;
        self.shelf_height = 0;
    }

    /// Copy `region.height` rows of `region.width` pixels out of a source
    /// buffer with the given stride (in bytes).
    pub fn write(&mut self, region: &AtlasRegion, src: &[u8], src_stride: usize) {
        let dst_stride = (self.size * 4) as usize;
        let row_bytes = region.width as usize * 4;

        for row in 0..region.height as usize {
            let src_start = row * src_stride;
            let dst_start = (region.y as usize + row) * dst_stride + region.x as usize * 4;
            self.pixels[dst_start..dst_start + row_bytes]
                .copy_from_slice(&src[src_start..src_start + row_bytes]);
        }
    }
}
