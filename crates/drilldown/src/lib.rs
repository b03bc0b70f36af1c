//! Hierarchical geographic drill-down controller.
//!
//! Owns the selection chain, the camera, the per-level boundary slots and
//! the fetch queue; decides what to fetch and when; and keeps everything
//! consistent as selections, levels and completions interleave.
//!
//! The controller is sans-io and frame-driven: hosts apply [`Command`]s,
//! call [`DrilldownController::tick`] once per loop iteration, perform the
//! returned [`Effect`]s however they like (async, blocking, mocked), and
//! feed the results back as completions. Every decision is recorded on a
//! deterministic event log.

pub mod command;
pub mod controller;
pub mod effect;
pub mod event;

pub use command::Command;
pub use controller::{DrilldownConfig, DrilldownController};
pub use effect::{CanonicalStatesResponse, Effect, LayerResponse};
pub use event::DrillEvent;
