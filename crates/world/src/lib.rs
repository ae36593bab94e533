//! World model: authoritative cube entity state and placement invariants.
//!
//! # Invariants
//! - All state mutations flow through explicit operations.
//! - Non-traversable volumes never overlap.
//! - The version counter increases on every structural mutation.

pub mod cube;
pub mod error;
pub mod model;
pub mod record;
pub mod shared;
pub mod worldgen;

pub use cube::{AgentState, BehaviorState, CameraState, Cube, PlayerState, Sensor, Variant, VariantKind};
pub use error::{PlacementReason, WorldError};
pub use model::WorldModel;
pub use record::CubeRecord;
pub use shared::SharedWorld;
