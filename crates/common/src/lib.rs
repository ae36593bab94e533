//! Shared types for the cubecast engine.
//!
//! # Invariants
//! - `CubeId` values are globally unique for the lifetime of a world.
//! - `Aabb` extents are strictly positive on every axis.

pub mod aabb;
pub mod types;

pub use aabb::Aabb;
pub use types::{BlockType, CubeId, Resolution, Rotation};
