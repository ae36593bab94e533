use crate::buffer::FrameBuffer;
use crate::color;
use crate::snapshot::WorldSnapshot;
use crate::tier::{RenderTier, TierError};
use crate::view::CameraView;
use cubecast_common::Aabb;
use glam::Vec3;
use tracing::trace;

/// Distance advanced per march step.
const STEP: f32 = 2.0;
/// Rays give up beyond this distance.
const MAX_DISTANCE: f32 = 20.0;
/// Rays are cast on this pixel stride; each hit fills a stride x stride tile.
const STRIDE: u32 = 2;
/// Blocks farther than this from the camera never enter the candidate set.
/// Slightly past MAX_DISTANCE so blocks straddling the boundary still count.
const CANDIDATE_RANGE: f32 = MAX_DISTANCE + 2.0;

#[derive(Debug)]
struct Candidate {
    volume: Aabb,
    /// Sum of half extents, used as a cheap reject radius.
    reach: f32,
    color: [u8; 3],
}

#[derive(Debug, Default)]
struct CandidateCache {
    version: Option<u64>,
    camera_position: Vec3,
    candidates: Vec<Candidate>,
}

/// Tier 1: coarse ray marcher.
///
/// Marches big fixed steps along subsampled rays and flat-shades the first
/// block a sample lands in. Misses fall back to the sky gradient. Slower than
/// the rectangle painter but honors occlusion exactly at sample points.
#[derive(Debug, Default)]
pub struct CoarseRayMarcher {
    cache: CandidateCache,
    rebuilds: u64,
}

impl CoarseRayMarcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    fn refresh_cache(&mut self, snapshot: &WorldSnapshot, view: &CameraView) {
        if self.cache.version == Some(snapshot.version)
            && self.cache.camera_position == view.position
        {
            return;
        }

        let candidates = snapshot
            .blocks
            .iter()
            .filter(|b| b.position.distance(view.position) < CANDIDATE_RANGE)
            .map(|b| Candidate {
                volume: Aabb::new(b.position, b.size),
                reach: (b.size.x + b.size.y + b.size.z) * 0.5,
                color: b.color,
            })
            .collect::<Vec<_>>();

        self.cache = CandidateCache {
            version: Some(snapshot.version),
            camera_position: view.position,
            candidates,
        };
        self.rebuilds += 1;
        trace!(
            version = snapshot.version,
            candidates = self.cache.candidates.len(),
            "march candidate cache rebuilt"
        );
    }

    /// First candidate containing any sample along the ray, or the sky.
    fn march(&self, origin: Vec3, dir: Vec3) -> [u8; 3] {
        let mut t = STEP;
        while t <= MAX_DISTANCE {
            let sample = origin + dir * t;
            for c in &self.cache.candidates {
                // Manhattan pre-filter before the exact box test.
                let d = sample - c.volume.center;
                if d.x.abs() + d.y.abs() + d.z.abs() > c.reach {
                    continue;
                }
                if c.volume.contains_point(sample) {
                    return c.color;
                }
            }
            t += STEP;
        }
        color::sky_color(dir.y)
    }
}

impl RenderTier for CoarseRayMarcher {
    fn name(&self) -> &'static str {
        "coarse_march"
    }

    fn render(
        &mut self,
        snapshot: &WorldSnapshot,
        view: &CameraView,
        buffer: &mut FrameBuffer,
    ) -> Result<(), TierError> {
        self.refresh_cache(snapshot, view);

        let width = buffer.width();
        let height = buffer.height();
        let mut py = 0;
        while py < height {
            let mut px = 0;
            while px < width {
                let dir = view.ray_direction(px, py, width, height);
                let shade = self.march(view.position, dir);
                buffer.fill_rect(
                    px as i32,
                    py as i32,
                    (px + STRIDE) as i32,
                    (py + STRIDE) as i32,
                    shade,
                );
                px += STRIDE;
            }
            py += STRIDE;
        }
        Ok(())
    }
}
