//! Optional GPU render tier.
//!
//! Rasterizes the world snapshot as instanced cubes into an offscreen texture
//! and reads the pixels back to the CPU. Slots into the tier chain between
//! the coarse marcher and the reference marcher; when no adapter is available
//! the tier simply is not registered and the CPU chain carries the load.
//!
//! # Invariants
//! - Never touches world state; renders from the snapshot only.
//! - Readback frames are tightly packed RGB, matching the CPU tiers' format.

mod gpu;
mod shaders;

pub use gpu::{GpuError, GpuTier};
