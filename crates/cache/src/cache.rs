//! The memoizing raster cache.

use crate::atlas::{Atlas, AtlasRegion, AtlasSlot};
use crate::backend::{RasterBackend, RasterRequest};
use crate::{CacheError, RasterKey};
use nib_geom::limits::{MAX_RASTERIZATIONS_PER_FRAME, MAX_RASTER_SIZE};
use nib_geom::Box2D;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// A thread-safe icon rasterization cache with a per-frame work budget.
///
/// One instance serves every render thread of a host; all state sits behind
/// one coarse mutex. The backend is chosen at construction and never leaks
/// into the public interface.
pub struct RasterCache<B> {
    backend: B,
    inner: Mutex<CacheInner>,
}

struct CacheInner {
    map: FxHashMap<RasterKey, AtlasSlot>,
    atlas: Atlas,
    scratch: Vec<u8>,
    rasterized_this_frame: u32,
    deferred_work: bool,
    scale_factor: f32,
}

/// Read-only view of the atlas storage, only reachable through
/// [`RasterCache::with_atlas_locked`] so that GPU upload scans cannot race
/// cache mutations.
pub struct AtlasView<'l> {
    pub size: u32,
    pub pixels: &'l [u8],
}

impl<B: RasterBackend> RasterCache<B> {
    pub fn new(backend: B) -> Self {
        RasterCache {
            backend,
            inner: Mutex::new(CacheInner {
                map: FxHashMap::default(),
                atlas: Atlas::new(),
                scratch: vec![0; (MAX_RASTER_SIZE * MAX_RASTER_SIZE * 4) as usize],
                rasterized_this_frame: 0,
                deferred_work: false,
                scale_factor: 1.0,
            }),
        }
    }

    /// Look up an icon, rasterizing it on a miss if the frame budget
    /// allows.
    ///
    /// `logical_size` is the icon's edge in logical pixels; the device size
    /// embedded in the key follows the current scale factor.
    pub fn get_or_rasterize(
        &self,
        path_data: &str,
        view_box: Box2D,
        logical_size: f32,
        has_fill: bool,
        stroke_width: Option<f32>,
    ) -> Result<AtlasSlot, CacheError> {
        if path_data.is_empty() {
            return Err(CacheError::EmptyPath);
        }

        let mut inner = self.inner.lock();
        let inner = &mut *inner;

        let key = RasterKey::new(
            path_data,
            logical_size,
            inner.scale_factor,
            has_fill,
            stroke_width,
        );

        if let Some(slot) = inner.map.get(&key) {
            return Ok(*slot);
        }

        if inner.rasterized_this_frame >= MAX_RASTERIZATIONS_PER_FRAME {
            inner.deferred_work = true;
            return Err(CacheError::RasterizationDeferred);
        }

        if u32::from(key.device_size) > MAX_RASTER_SIZE {
            return Err(CacheError::IconTooLarge);
        }

        for byte in &mut inner.scratch {
            *byte = 0;
        }

        let request = RasterRequest {
            path_data,
            view_box,
            device_size: key.device_size,
            has_fill,
            stroke_width: key.stroke_width(),
        };
        let raster = self.backend.rasterize(&request, &mut inner.scratch)?;
        inner.rasterized_this_frame += 1;

        let region = match inner.atlas.allocate(raster.width, raster.height) {
            Some(region) => region,
            None => allocate_with_growth(inner, raster.width, raster.height)?,
        };

        inner
            .atlas
            .write(&region, &inner.scratch, (MAX_RASTER_SIZE * 4) as usize);

        let slot = AtlasSlot {
            region,
            offset_x: raster.offset_x,
            offset_y: raster.offset_y,
            atlas_size: inner.atlas.size(),
        };
        inner.map.insert(key, slot);

        Ok(slot)
    }

    /// Clear the rasterization counter and the deferred flag. Must be
    /// called by the host render loop at the start of every frame.
    pub fn reset_frame_budget(&self) {
        let mut inner = self.inner.lock();
        inner.rasterized_this_frame = 0;
        inner.deferred_work = false;
    }

    /// Whether any lookup was deferred since the last budget reset. Hosts
    /// schedule another render pass when this is set.
    pub fn has_deferred_work(&self) -> bool {
        self.inner.lock().deferred_work
    }

    /// Change the device pixel ratio. Device sizes embedded in the keys go
    /// stale, so the whole cache is dropped.
    pub fn set_scale_factor(&self, scale_factor: f32) {
        let mut inner = self.inner.lock();
        if inner.scale_factor == scale_factor {
            return;
        }

        inner.scale_factor = scale_factor;
        inner.map.clear();
        inner.atlas.clear();
    }

    pub fn scale_factor(&self) -> f32 {
        self.inner.lock().scale_factor
    }

    /// Run `callback` with the atlas storage locked. Reads that escape the
    /// module (GPU uploads in particular) must go through here.
    pub fn with_atlas_locked<R>(&self, callback: impl FnOnce(&AtlasView) -> R) -> R {
        let inner = self.inner.lock();
        callback(&AtlasView {
            size: inner.atlas.size(),
            pixels: inner.atlas.pixels(),
        })
    }
}

/// Grow the atlas (doubling, up to the cap) until the region fits. If the
/// cap is reached the whole cache restarts from an empty atlas; a region
/// that does not fit even then is fatal.
fn allocate_with_growth(
    inner: &mut CacheInner,
    width: u32,
    height: u32,
) -> Result<AtlasRegion, CacheError> {
    while inner.atlas.grow() {
        let new_size = inner.atlas.size();
        // Previously handed out slots keep their UVs consistent by
        // observing the new edge through their `atlas_size` field. The walk
        // is O(cache size) but only runs on growth events.
        for slot in inner.map.values_mut() {
            slot.atlas_size = new_size;
        }
        log::debug!("icon atlas grown to {new_size}");

        if let Some(region) = inner.atlas.allocate(width, height) {
            return Ok(region);
        }
    }

    log::warn!(
        "icon atlas exhausted at maximum size; dropping {} cached icons",
        inner.map.len()
    );
    inner.map.clear();
    inner.atlas.clear();

    inner
        .atlas
        .allocate(width, height)
        .ok_or(CacheError::IconTooLarge)
}
