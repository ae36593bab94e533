use crate::buffer::FrameBuffer;
use crate::overlay;
use crate::raster::RasterProjector;
use crate::raymarch::CoarseRayMarcher;
use crate::reference::ReferenceRayMarcher;
use crate::snapshot::WorldSnapshot;
use crate::tier::{RenderTier, TierError};
use crate::view::CameraView;
use cubecast_common::Resolution;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, warn};

/// Internal renders are halved once the configured resolution crosses this
/// pixel count; the result is upscaled as a post-process.
const FULL_RES_PIXEL_LIMIT: u32 = 640 * 480;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("all {attempted} render tiers failed")]
    AllTiersFailed { attempted: usize },
}

/// Ordered tier chain with strict fallback.
///
/// Tiers are attempted in index order; the first success wins. A camera can
/// pin a tier, which moves that tier to the front of the attempt order for
/// its frames but never removes the fallback chain behind it. The pin is the
/// only ordering hint; a tier failure on one frame does not demote it for
/// the next.
pub struct RenderPipeline {
    tiers: Vec<Box<dyn RenderTier>>,
    disabled: BTreeSet<usize>,
    scratch: FrameBuffer,
    output: FrameBuffer,
}

impl RenderPipeline {
    pub fn new(tiers: Vec<Box<dyn RenderTier>>) -> Self {
        Self {
            tiers,
            disabled: BTreeSet::new(),
            scratch: FrameBuffer::new(Resolution::default()),
            output: FrameBuffer::new(Resolution::default()),
        }
    }

    /// The standard CPU chain: rectangle painter, coarse marcher, reference
    /// marcher. Accelerated tiers slot in between with [`insert_tier`].
    ///
    /// [`insert_tier`]: Self::insert_tier
    pub fn with_default_tiers() -> Self {
        Self::new(vec![
            Box::new(RasterProjector::new()),
            Box::new(CoarseRayMarcher::new()),
            Box::new(ReferenceRayMarcher::new()),
        ])
    }

    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    pub fn tier_names(&self) -> Vec<&'static str> {
        self.tiers.iter().map(|t| t.name()).collect()
    }

    /// Insert a tier at `index` (clamped to the end of the chain).
    pub fn insert_tier(&mut self, index: usize, tier: Box<dyn RenderTier>) {
        let index = index.min(self.tiers.len());
        self.tiers.insert(index, tier);
        // Keep the disabled set pointing at the same tiers.
        self.disabled = self
            .disabled
            .iter()
            .map(|&i| if i >= index { i + 1 } else { i })
            .collect();
    }

    pub fn set_tier_enabled(&mut self, index: usize, enabled: bool) {
        if enabled {
            self.disabled.remove(&index);
        } else {
            self.disabled.insert(index);
        }
    }

    fn attempt_order(&self, pinned: Option<usize>) -> Vec<usize> {
        let mut order: Vec<usize> = Vec::with_capacity(self.tiers.len());
        if let Some(p) = pinned {
            if p < self.tiers.len() {
                order.push(p);
            }
        }
        order.extend((0..self.tiers.len()).filter(|i| Some(*i) != pinned));
        order
    }

    fn internal_resolution(resolution: Resolution) -> Resolution {
        if resolution.width * resolution.height > FULL_RES_PIXEL_LIMIT {
            Resolution::new((resolution.width / 2).max(1), (resolution.height / 2).max(1))
        } else {
            resolution
        }
    }

    /// Render one frame. Always returns exactly
    /// `resolution.width * resolution.height * 3` bytes on success.
    pub fn render(
        &mut self,
        snapshot: &WorldSnapshot,
        view: &CameraView,
        frame_counter: u64,
    ) -> Result<Vec<u8>, PipelineError> {
        let internal = Self::internal_resolution(view.resolution);
        if self.scratch.resolution() != internal {
            self.scratch = FrameBuffer::new(internal);
        }

        let mut attempted = 0;
        let mut rendered = false;
        for index in self.attempt_order(view.pinned_tier) {
            if self.disabled.contains(&index) {
                continue;
            }
            attempted += 1;
            let tier = &mut self.tiers[index];
            match tier.render(snapshot, view, &mut self.scratch) {
                Ok(()) => {
                    debug!(tier = tier.name(), frame = frame_counter, "frame rendered");
                    rendered = true;
                    break;
                }
                Err(err) => {
                    warn!(tier = tier.name(), error = %err, "tier failed, falling back");
                }
            }
        }
        if !rendered {
            return Err(PipelineError::AllTiersFailed { attempted });
        }

        let frame = if internal == view.resolution {
            overlay::apply(&mut self.scratch, frame_counter);
            self.scratch.to_vec()
        } else {
            if self.output.resolution() != view.resolution {
                self.output = FrameBuffer::new(view.resolution);
            }
            self.output.upscale_from(&self.scratch);
            overlay::apply(&mut self.output, frame_counter);
            self.output.to_vec()
        };
        debug_assert_eq!(frame.len(), view.resolution.byte_len());
        Ok(frame)
    }
}
