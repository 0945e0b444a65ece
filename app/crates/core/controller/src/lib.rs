//! Main-thread controller
//!
//! Drives the prover worker through its handshake, sends proof requests and
//! keeps the four UI widgets (button, elapsed time, status, result) in sync
//! with the protocol. Rendering is abstracted behind [`view::View`] so the
//! same logic backs the DOM and the tests.

pub mod config;
pub mod controller;
pub mod ticker;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use config::ControllerConfig;
pub use controller::{Controller, ControllerError, Phase, ProofOutcome, WorkerLink};
pub use view::{StatusTone, UiState, View};
