//! AI behavior engine: per-agent state machines advanced by discrete ticks.
//!
//! # Invariants
//! - Transitions happen only on explicit external command or on movement
//!   completion (`Moving` -> `Idle` within arrival tolerance).
//! - A move rejected by collision leaves the agent in `Moving`; it retries
//!   the same straight-line step next tick. No automatic path re-routing.

pub mod engine;

pub use engine::{AgentEngine, EngineConfig, TickStats, transition_allowed};
pub use cubecast_world::BehaviorState;
