use crate::buffer::FrameBuffer;
use crate::color;
use crate::snapshot::{RenderBlock, WorldSnapshot};
use crate::tier::{RenderTier, TierError};
use crate::view::CameraView;
use glam::Vec3;
use tracing::trace;

/// Only blocks within this squared distance of the camera are considered.
const NEAR_RANGE_SQ: f32 = 400.0;
/// At most this many nearest blocks are painted per frame.
const MAX_BLOCKS: usize = 20;

#[derive(Debug, Default)]
struct NearCache {
    version: Option<u64>,
    camera_position: Vec3,
    /// Nearest blocks, sorted near to far.
    blocks: Vec<RenderBlock>,
}

/// Tier 0: screen-space rectangle painter.
///
/// Fills a horizon split derived from camera pitch, then paints the nearest
/// blocks as flat perspective-scaled rectangles, farthest first so nearer
/// blocks overwrite. Crude but very cheap; it is the preferred tier.
#[derive(Debug, Default)]
pub struct RasterProjector {
    cache: NearCache,
    rebuilds: u64,
}

impl RasterProjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times the nearest-block set has been recomputed.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    fn refresh_cache(&mut self, snapshot: &WorldSnapshot, view: &CameraView) {
        if self.cache.version == Some(snapshot.version)
            && self.cache.camera_position == view.position
        {
            return;
        }

        let mut near: Vec<(f32, RenderBlock)> = snapshot
            .blocks
            .iter()
            .filter_map(|b| {
                let dist_sq = b.position.distance_squared(view.position);
                (dist_sq < NEAR_RANGE_SQ).then_some((dist_sq, *b))
            })
            .collect();
        near.sort_by(|a, b| a.0.total_cmp(&b.0));
        near.truncate(MAX_BLOCKS);

        self.cache = NearCache {
            version: Some(snapshot.version),
            camera_position: view.position,
            blocks: near.into_iter().map(|(_, b)| b).collect(),
        };
        self.rebuilds += 1;
        trace!(version = snapshot.version, blocks = self.cache.blocks.len(), "raster cache rebuilt");
    }

    fn paint_horizon(view: &CameraView, buffer: &mut FrameBuffer) {
        let height = buffer.height();
        let horizon = (height as f32 * (0.5 + view.rotation.pitch / 180.0))
            .clamp(0.0, height as f32) as u32;
        let width = buffer.width() as i32;
        buffer.fill_rect(0, 0, width, horizon as i32, color::SKY);
        buffer.fill_rect(0, horizon as i32, width, height as i32, color::GROUND);
    }
}

impl RenderTier for RasterProjector {
    fn name(&self) -> &'static str {
        "raster"
    }

    fn render(
        &mut self,
        snapshot: &WorldSnapshot,
        view: &CameraView,
        buffer: &mut FrameBuffer,
    ) -> Result<(), TierError> {
        self.refresh_cache(snapshot, view);
        Self::paint_horizon(view, buffer);

        let width = buffer.width();
        let height = buffer.height();
        let aspect = width as f32 / height as f32;
        let focal = 1.0 / (view.fov_degrees.to_radians() * 0.5).tan();

        // Far to near, so near blocks overwrite far ones.
        for block in self.cache.blocks.iter().rev() {
            let Some((sx, sy, depth)) = view.project(block.position, width, height) else {
                continue;
            };
            let half_w = (block.size.x * 0.5 / depth) * (focal / aspect) * 0.5 * width as f32;
            let half_h = (block.size.y * 0.5 / depth) * focal * 0.5 * height as f32;
            buffer.fill_rect(
                (sx - half_w) as i32,
                (sy - half_h) as i32,
                (sx + half_w).ceil() as i32,
                (sy + half_h).ceil() as i32,
                block.color,
            );
        }
        Ok(())
    }
}
