//! In-memory collaborators for unit tests

use std::{cell::RefCell, collections::HashMap, time::Duration};

use async_trait::async_trait;
use types::Clock;

use crate::fetch::{Fetch, FetchError};

/// Serves bodies from a map and records every requested URL
#[derive(Default)]
pub(crate) struct MemoryFetcher {
    bodies: HashMap<String, Vec<u8>>,
    pub(crate) requested: RefCell<Vec<String>>,
}

impl MemoryFetcher {
    pub(crate) fn with(mut self, url: &str, body: &[u8]) -> Self {
        self.bodies.insert(url.to_string(), body.to_vec());
        self
    }
}

#[async_trait(?Send)]
impl Fetch for MemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.requested.borrow_mut().push(url.to_string());
        self.bodies.get(url).cloned().ok_or(FetchError::Status(404))
    }
}

/// Clock driven by tokio's (pausable) time
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
