//! Prover worker host
//!
//! Everything that runs inside the prover worker, independent of the browser:
//! - parameter provider and proving key resolver, fetched relative to a base URL
//! - random source and cost model handed to the proving backend
//! - the [`host::WorkerHost`] that answers [`types::ProverMessage`]s
//!
//! The proving algorithm itself is external and reached through
//! [`prover::ProvingBackend`].

pub mod cost_model;
pub mod fetch;
pub mod host;
pub mod params;
pub mod pool;
pub mod prover;
pub mod resolver;
pub mod rng;

#[cfg(test)]
pub(crate) mod testing;

pub use cost_model::CostModel;
pub use fetch::{Fetch, FetchError, HttpFetcher};
pub use host::WorkerHost;
pub use params::{ParamsProvider, ProverParams};
pub use pool::{ThreadPool, WorkerConfig};
pub use prover::{Prover, ProvingBackend, ProvingContext};
pub use resolver::{KeyLocation, KeyResolver, ProvingKeyMaterial};
pub use rng::ProverRng;
