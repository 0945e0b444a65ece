//! Test doubles for the view and time sources

use std::time::Duration;

use futures::future::LocalBoxFuture;
use types::{Clock, Timer};

use crate::view::{StatusTone, UiState, View};

/// Keeps the current UI state plus the history of time-label writes
#[derive(Debug, Default)]
pub(crate) struct RecordingView {
    pub(crate) state: UiState,
    pub(crate) times: Vec<String>,
    pub(crate) time_written_at: Vec<tokio::time::Instant>,
}

impl View for RecordingView {
    fn set_button(&mut self, enabled: bool, label: &str) {
        self.state.set_button(enabled, label);
    }

    fn set_time(&mut self, text: &str) {
        self.state.set_time(text);
        self.times.push(text.to_string());
        self.time_written_at.push(tokio::time::Instant::now());
    }

    fn set_status(&mut self, text: &str, tone: StatusTone) {
        self.state.set_status(text, tone);
    }

    fn set_result(&mut self, text: &str) {
        self.state.set_result(text);
    }
}

pub(crate) struct TokioClock {
    origin: tokio::time::Instant,
}

impl TokioClock {
    pub(crate) fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

pub(crate) struct TokioTimer;

impl Timer for TokioTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}
