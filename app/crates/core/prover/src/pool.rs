//! Runtime thread pool and worker configuration

use std::{num::NonZeroUsize, thread};

use async_trait::async_trait;
use serde::Deserialize;

/// Starts the parallel execution pool used by the proving backend
#[async_trait(?Send)]
pub trait ThreadPool {
    /// Brings up `threads` workers. Called once, before anything is proved.
    async fn start(&self, threads: usize) -> anyhow::Result<()>;
}

/// Worker-side settings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkerConfig {
    /// Size of the proving thread pool
    pub thread_count: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            thread_count: thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
        }
    }
}

impl WorkerConfig {
    /// Config with an explicit pool size, e.g. `navigator.hardwareConcurrency`.
    pub fn with_thread_count(thread_count: usize) -> Self {
        Self { thread_count }
    }

    /// Pool size to request, never less than one.
    pub fn threads(&self) -> usize {
        self.thread_count.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_threads_is_clamped() {
        assert_eq!(WorkerConfig::with_thread_count(0).threads(), 1);
        assert_eq!(WorkerConfig::with_thread_count(8).threads(), 8);
    }

    #[test]
    fn default_uses_reported_concurrency() {
        assert!(WorkerConfig::default().threads() >= 1);
    }
}
