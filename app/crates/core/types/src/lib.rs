//! Shared types for the proving harness
//!
//! The main thread and the prover worker only ever exchange the messages
//! defined here. Both sides also share the hex rendering and the time
//! abstractions used to measure and display proving progress.

pub mod hex;
pub mod message;
pub mod time;

pub use message::{ProtocolError, ProverMessage, ProverResponse, WorkerEvent};
pub use time::{Clock, Timer, elapsed_ms};
