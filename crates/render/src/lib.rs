//! Tiered rendering: turns a world snapshot and a camera view into RGB frames.
//!
//! Tiers are ordered by speed preference and attempted strictly in order;
//! the first tier that completes produces the frame. Tier failures never
//! escape the pipeline; they trigger fallback.
//!
//! # Invariants
//! - Output buffers are exactly `width * height * 3` bytes regardless of tier.
//! - Tiers read the snapshot only; world truth stays behind the world lock.
//! - Geometry caches are keyed to the snapshot version; no rebuild happens
//!   while the version is unchanged.

pub mod buffer;
pub mod color;
pub mod overlay;
pub mod pipeline;
pub mod raster;
pub mod raymarch;
pub mod reference;
pub mod snapshot;
pub mod tier;
pub mod view;

pub use buffer::FrameBuffer;
pub use pipeline::{PipelineError, RenderPipeline};
pub use raster::RasterProjector;
pub use raymarch::CoarseRayMarcher;
pub use reference::ReferenceRayMarcher;
pub use snapshot::{RenderBlock, WorldSnapshot};
pub use tier::{RenderTier, TierError};
pub use view::CameraView;
