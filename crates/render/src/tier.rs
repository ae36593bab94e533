use crate::buffer::FrameBuffer;
use crate::snapshot::WorldSnapshot;
use crate::view::CameraView;
use thiserror::Error;

/// Why a single tier could not produce a frame. These never escape the
/// pipeline; they only drive fallback to the next tier.
#[derive(Debug, Error)]
pub enum TierError {
    /// The tier's backend cannot run in this environment (e.g. no GPU).
    #[error("tier unavailable: {0}")]
    Unavailable(String),
    /// The tier was administratively disabled.
    #[error("tier disabled")]
    Disabled,
    /// The tier started but could not complete the frame.
    #[error("tier failed: {0}")]
    Failed(String),
}

/// One rendering strategy in the fallback chain.
///
/// A tier draws into the buffer it is handed, which may be smaller than the
/// camera's configured resolution when the pipeline renders internally at
/// reduced scale. Implementations must fully cover the buffer on success.
pub trait RenderTier: Send {
    fn name(&self) -> &'static str;

    fn render(
        &mut self,
        snapshot: &WorldSnapshot,
        view: &CameraView,
        buffer: &mut FrameBuffer,
    ) -> Result<(), TierError>;
}
