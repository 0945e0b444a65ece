//! Proving key resolver
//!
//! A key location is a path under the base URL holding three artifacts:
//! `pk` (prover key), `vk` (verifier key) and `ir` (circuit IR source).

use std::{fmt, rc::Rc};

use thiserror::Error;

use crate::fetch::{Fetch, FetchError, join_url};

/// Path of a circuit's keys relative to the base URL
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyLocation(pub String);

impl KeyLocation {
    /// Path with a single leading `/` removed
    pub fn path(&self) -> &str {
        self.0.strip_prefix('/').unwrap_or(&self.0)
    }
}

impl From<&str> for KeyLocation {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One of the files making up a circuit's key material
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyArtifact {
    /// Prover key, `pk`
    ProverKey,
    /// Verifier key, `vk`
    VerifierKey,
    /// Circuit IR source, `ir`
    IrSource,
}

impl KeyArtifact {
    /// File name under the key location
    pub fn suffix(self) -> &'static str {
        match self {
            Self::ProverKey => "pk",
            Self::VerifierKey => "vk",
            Self::IrSource => "ir",
        }
    }
}

impl fmt::Display for KeyArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ProverKey => "prover key",
            Self::VerifierKey => "verifier key",
            Self::IrSource => "IR source",
        };
        f.write_str(name)
    }
}

/// Failure to resolve key material
#[derive(Debug, Error)]
pub enum ResolveError {
    /// An artifact could not be downloaded
    #[error("Failed to fetch {artifact} from {url}")]
    Fetch {
        /// Which artifact
        artifact: KeyArtifact,
        /// Requested URL
        url: String,
        /// Underlying failure
        #[source]
        source: FetchError,
    },
    /// An artifact was served but empty
    #[error("{artifact} not found or empty at {url}")]
    Empty {
        /// Which artifact
        artifact: KeyArtifact,
        /// Requested URL
        url: String,
    },
}

/// Complete key material for one circuit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProvingKeyMaterial {
    /// Serialized prover key
    pub prover_key: Vec<u8>,
    /// Serialized verifier key
    pub verifier_key: Vec<u8>,
    /// Circuit IR source
    pub ir_source: Vec<u8>,
}

/// Fetches key material relative to a base URL
#[derive(Clone)]
pub struct KeyResolver {
    base_url: String,
    fetcher: Rc<dyn Fetch>,
}

impl KeyResolver {
    /// Creates a resolver rooted at `base_url`.
    pub fn new(base_url: impl Into<String>, fetcher: Rc<dyn Fetch>) -> Self {
        Self {
            base_url: base_url.into(),
            fetcher,
        }
    }

    /// Downloads `pk`, `vk` and `ir` for `key`, in that order.
    pub async fn resolve_key(&self, key: &KeyLocation) -> Result<ProvingKeyMaterial, ResolveError> {
        let prover_key = self.fetch_artifact(key, KeyArtifact::ProverKey).await?;
        let verifier_key = self.fetch_artifact(key, KeyArtifact::VerifierKey).await?;
        let ir_source = self.fetch_artifact(key, KeyArtifact::IrSource).await?;

        Ok(ProvingKeyMaterial {
            prover_key,
            verifier_key,
            ir_source,
        })
    }

    async fn fetch_artifact(
        &self,
        key: &KeyLocation,
        artifact: KeyArtifact,
    ) -> Result<Vec<u8>, ResolveError> {
        let url = join_url(
            &self.base_url,
            &format!("{}/{}", key.path(), artifact.suffix()),
        );

        let raw = self
            .fetcher
            .fetch(&url)
            .await
            .map_err(|source| ResolveError::Fetch {
                artifact,
                url: url.clone(),
                source,
            })?;

        if raw.is_empty() {
            return Err(ResolveError::Empty { artifact, url });
        }
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryFetcher;

    const BASE: &str = "https://example.test/";

    #[test]
    fn single_leading_slash_is_stripped() {
        assert_eq!(KeyLocation::from("/zswap/output").path(), "zswap/output");
        assert_eq!(KeyLocation::from("zswap/output").path(), "zswap/output");
    }

    #[tokio::test]
    async fn resolves_all_three_artifacts_in_order() {
        let fetcher = Rc::new(
            MemoryFetcher::default()
                .with("https://example.test/zswap/output/pk", b"pk")
                .with("https://example.test/zswap/output/vk", b"vk")
                .with("https://example.test/zswap/output/ir", b"ir"),
        );
        let resolver = KeyResolver::new(BASE, fetcher.clone());

        let material = resolver
            .resolve_key(&KeyLocation::from("/zswap/output"))
            .await
            .expect("all artifacts served");

        assert_eq!(material.prover_key, b"pk");
        assert_eq!(material.verifier_key, b"vk");
        assert_eq!(material.ir_source, b"ir");
        assert_eq!(
            *fetcher.requested.borrow(),
            vec![
                "https://example.test/zswap/output/pk".to_string(),
                "https://example.test/zswap/output/vk".to_string(),
                "https://example.test/zswap/output/ir".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn missing_verifier_key_stops_resolution() {
        let fetcher = Rc::new(
            MemoryFetcher::default().with("https://example.test/zswap/spend/pk", b"pk"),
        );
        let resolver = KeyResolver::new(BASE, fetcher.clone());

        let err = resolver
            .resolve_key(&KeyLocation::from("zswap/spend"))
            .await
            .expect_err("vk missing");

        assert_eq!(
            err.to_string(),
            "Failed to fetch verifier key from https://example.test/zswap/spend/vk"
        );
        assert_eq!(fetcher.requested.borrow().len(), 2);
    }

    #[tokio::test]
    async fn empty_ir_is_rejected() {
        let fetcher = Rc::new(
            MemoryFetcher::default()
                .with("https://example.test/c/pk", b"pk")
                .with("https://example.test/c/vk", b"vk")
                .with("https://example.test/c/ir", b""),
        );
        let resolver = KeyResolver::new(BASE, fetcher);

        let err = resolver
            .resolve_key(&KeyLocation::from("c"))
            .await
            .expect_err("empty ir");
        assert_eq!(
            err.to_string(),
            "IR source not found or empty at https://example.test/c/ir"
        );
    }
}
