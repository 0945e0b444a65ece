//! Prover object
//!
//! Wraps a [`ProvingBackend`] together with the parameter provider and key
//! resolver it needs. The backend is the external proving library: it turns
//! an unproven transaction into proof-bearing bytes.

use anyhow::{Result, bail};
use async_trait::async_trait;

use crate::{
    cost_model::CostModel, params::ParamsProvider, resolver::KeyResolver, rng::ProverRng,
};

/// Everything a backend may draw on while proving one transaction
pub struct ProvingContext<'a> {
    /// Random source dedicated to this request
    pub rng: ProverRng,
    /// Public parameter provider
    pub params: &'a ParamsProvider,
    /// Proving key resolver
    pub resolver: &'a KeyResolver,
}

/// External proving operation
#[async_trait(?Send)]
pub trait ProvingBackend {
    /// Proves `unproven_tx`, returning the serialized proven transaction.
    async fn prove(
        &self,
        ctx: ProvingContext<'_>,
        unproven_tx: &[u8],
        cost_model: &CostModel,
    ) -> Result<Vec<u8>>;
}

/// Prover bound to its parameter sources
pub struct Prover<B> {
    params: ParamsProvider,
    resolver: KeyResolver,
    backend: B,
}

impl<B: ProvingBackend> Prover<B> {
    /// Creates a prover.
    pub fn new(resolver: KeyResolver, params: ParamsProvider, backend: B) -> Self {
        Self {
            params,
            resolver,
            backend,
        }
    }

    /// Proves one serialized transaction.
    pub async fn prove(
        &self,
        rng: ProverRng,
        unproven_tx: &[u8],
        cost_model: &CostModel,
    ) -> Result<Vec<u8>> {
        if unproven_tx.is_empty() {
            bail!("unproven transaction is empty");
        }

        let ctx = ProvingContext {
            rng,
            params: &self.params,
            resolver: &self.resolver,
        };
        self.backend.prove(ctx, unproven_tx, cost_model).await
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;
    use crate::{resolver::KeyLocation, testing::MemoryFetcher};

    /// Echoes the input with the resolved prover key appended
    struct KeyedEcho {
        calls: Cell<usize>,
    }

    #[async_trait(?Send)]
    impl ProvingBackend for KeyedEcho {
        async fn prove(
            &self,
            ctx: ProvingContext<'_>,
            unproven_tx: &[u8],
            cost_model: &CostModel,
        ) -> Result<Vec<u8>> {
            self.calls.set(self.calls.get() + 1);
            assert_eq!(*cost_model, CostModel::Initial);
            let keys = ctx.resolver.resolve_key(&KeyLocation::from("/c")).await?;
            let mut out = unproven_tx.to_vec();
            out.extend_from_slice(&keys.prover_key);
            Ok(out)
        }
    }

    fn prover(fetcher: MemoryFetcher) -> Prover<KeyedEcho> {
        let fetcher = Rc::new(fetcher);
        Prover::new(
            KeyResolver::new("https://example.test", fetcher.clone()),
            ParamsProvider::new("https://example.test", fetcher),
            KeyedEcho {
                calls: Cell::new(0),
            },
        )
    }

    #[tokio::test]
    async fn backend_sees_resolver_and_transaction() {
        let prover = prover(
            MemoryFetcher::default()
                .with("https://example.test/c/pk", b"PK")
                .with("https://example.test/c/vk", b"VK")
                .with("https://example.test/c/ir", b"IR"),
        );

        let out = prover
            .prove(ProverRng::from_seed([0; 32]), b"tx", &CostModel::initial())
            .await
            .expect("proved");
        assert_eq!(out, b"txPK");
    }

    #[tokio::test]
    async fn backend_failure_keeps_its_message() {
        let prover = prover(MemoryFetcher::default());

        let err = prover
            .prove(ProverRng::from_seed([0; 32]), b"tx", &CostModel::initial())
            .await
            .expect_err("keys missing");
        assert_eq!(
            err.to_string(),
            "Failed to fetch prover key from https://example.test/c/pk"
        );
    }

    #[tokio::test]
    async fn empty_transaction_never_reaches_backend() {
        let prover = prover(MemoryFetcher::default());

        let err = prover
            .prove(ProverRng::from_seed([0; 32]), &[], &CostModel::initial())
            .await
            .expect_err("empty tx");
        assert_eq!(err.to_string(), "unproven transaction is empty");
        assert_eq!(prover.backend.calls.get(), 0);
    }
}
