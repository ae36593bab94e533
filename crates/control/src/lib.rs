//! Command surface: one request in, one response out.
//!
//! `Command` and `Response` are plain serde values; the transport that carries
//! them (socket, queue, test harness) stays external. The controller maps each
//! command onto world, agent, and scheduler operations.
//!
//! # Invariants
//! - Every command produces exactly one response; failures come back as
//!   `Response::Error` values, never panics.
//! - A mutating command returns as soon as world state is updated; it never
//!   waits on a render.

mod command;
mod controller;

pub use command::{AgentAction, CameraAction, Command, Response};
pub use controller::Controller;
