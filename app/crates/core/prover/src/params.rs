//! Public parameter provider
//!
//! Parameters for circuit size `k` live at `{base_url}/bls_filecoin_2p{k}` and
//! are only handed out once their SHA-256 digest matches the table below.

use std::rc::Rc;

use sha2::{Digest, Sha256};
use thiserror::Error;
use types::hex::to_hex;

use crate::fetch::{Fetch, FetchError, join_url};

/// One published parameter file
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParamsEntry {
    /// Circuit size exponent
    pub k: u8,
    /// File name relative to the base URL
    pub file: &'static str,
    /// Lowercase hex SHA-256 of the file
    pub sha256: &'static str,
}

/// Published parameters for k = 10..=24
pub const PARAMS_TABLE: &[ParamsEntry] = &[
    ParamsEntry {
        k: 10,
        file: "bls_filecoin_2p10",
        sha256: "d1a3403c1f8669e82ed28d9391e13011aea76801b28fe14b42bf76d141b4efa2",
    },
    ParamsEntry {
        k: 11,
        file: "bls_filecoin_2p11",
        sha256: "b5047f05800dbd84fd1ea43b96a8850e128b7a595ed132cd72588cc2cb146b29",
    },
    ParamsEntry {
        k: 12,
        file: "bls_filecoin_2p12",
        sha256: "b32791775af5fff1ae5ead682c3d8832917ebb0652b43cf810a1e3956eb27a71",
    },
    ParamsEntry {
        k: 13,
        file: "bls_filecoin_2p13",
        sha256: "b9af43892c3cb90321fa00a36e5e59051f356df145d7f58368531f28d212937b",
    },
    ParamsEntry {
        k: 14,
        file: "bls_filecoin_2p14",
        sha256: "4923e5a7fbb715d81cdb5c03b9c0e211768d35ccc52d82f49c3d93bcf8d36a56",
    },
    ParamsEntry {
        k: 15,
        file: "bls_filecoin_2p15",
        sha256: "162fac0cf70b9b02e02195ec37013c04997b39dc1831a97d5a83f47a9ce39c97",
    },
    ParamsEntry {
        k: 16,
        file: "bls_filecoin_2p16",
        sha256: "4ebc0d077fe6645e9b7ca6563217be2176f00dfe39cc97b3f60ecbad3573f973",
    },
    ParamsEntry {
        k: 17,
        file: "bls_filecoin_2p17",
        sha256: "7228c4519e96ece2c54bf2f537d9f26b0ed042819733726623fab5e17eac4360",
    },
    ParamsEntry {
        k: 18,
        file: "bls_filecoin_2p18",
        sha256: "4f023825c14cc0a88070c70588a932519186d646094eddbff93c87a46060fd28",
    },
    ParamsEntry {
        k: 19,
        file: "bls_filecoin_2p19",
        sha256: "0574a536c128142e89c0f28198d048145e2bb2bf645c8b81c8697cba445a1fb1",
    },
    ParamsEntry {
        k: 20,
        file: "bls_filecoin_2p20",
        sha256: "75a1774fdf0848f4ff82790202e5c1401598bafea27321b77180d96c56e62228",
    },
    ParamsEntry {
        k: 21,
        file: "bls_filecoin_2p21",
        sha256: "e05fcbe4f7692800431cfc32e972be629c641fca891017be09a8384d0b5f8d3c",
    },
    ParamsEntry {
        k: 22,
        file: "bls_filecoin_2p22",
        sha256: "277d9c8140c02a1d4472d5da65a823fc883bc4596e69734fb16ca463d193186b",
    },
    ParamsEntry {
        k: 23,
        file: "bls_filecoin_2p23",
        sha256: "7b8dc4b2e809ef24ed459cabaf9286774cf63f2e6e2086f0d9fb014814bdfc97",
    },
    ParamsEntry {
        k: 24,
        file: "bls_filecoin_2p24",
        sha256: "e6b02dccf381a5fc7a79ba4d87612015eba904241f81521e2dea39a60ab6b812",
    },
];

/// Failure to load parameters
#[derive(Debug, Error)]
pub enum ParamsError {
    /// No parameters are published for this `k`
    #[error("no public parameters are published for k={0}")]
    UnknownK(u8),
    /// The file could not be downloaded
    #[error("Failed to fetch data from {url}")]
    Fetch {
        /// Requested URL
        url: String,
        /// Underlying failure
        #[source]
        source: FetchError,
    },
    /// The file was served but empty
    #[error("Prover params not found or empty. Expected file {file} at {url}")]
    Empty {
        /// Expected file name
        file: &'static str,
        /// Requested URL
        url: String,
    },
    /// The digest does not match the published one
    #[error(
        "Hash mismatch for k: {k}. This means the file may be outdated or corrupted. This may be fixed by clearing the cache."
    )]
    HashMismatch {
        /// Circuit size exponent
        k: u8,
    },
}

/// Digest-verified parameter bytes, opaque to this crate
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProverParams {
    k: u8,
    bytes: Vec<u8>,
}

impl ProverParams {
    /// Circuit size exponent these parameters are for
    pub fn k(&self) -> u8 {
        self.k
    }

    /// Raw parameter bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Fetches and verifies public parameters under a base URL
#[derive(Clone)]
pub struct ParamsProvider {
    base_url: String,
    fetcher: Rc<dyn Fetch>,
    table: &'static [ParamsEntry],
}

impl ParamsProvider {
    /// Creates a provider checking against [`PARAMS_TABLE`].
    pub fn new(base_url: impl Into<String>, fetcher: Rc<dyn Fetch>) -> Self {
        Self::with_table(base_url, fetcher, PARAMS_TABLE)
    }

    /// Creates a provider checking against a custom table.
    pub fn with_table(
        base_url: impl Into<String>,
        fetcher: Rc<dyn Fetch>,
        table: &'static [ParamsEntry],
    ) -> Self {
        Self {
            base_url: base_url.into(),
            fetcher,
            table,
        }
    }

    /// Downloads the parameters for `k` and checks their digest.
    pub async fn get_params(&self, k: u8) -> Result<ProverParams, ParamsError> {
        let entry = self
            .table
            .iter()
            .find(|entry| entry.k == k)
            .ok_or(ParamsError::UnknownK(k))?;

        let url = join_url(&self.base_url, entry.file);
        log::debug!("fetching public parameters for k={k} from {url}");

        let raw = self
            .fetcher
            .fetch(&url)
            .await
            .map_err(|source| ParamsError::Fetch {
                url: url.clone(),
                source,
            })?;

        if raw.is_empty() {
            return Err(ParamsError::Empty {
                file: entry.file,
                url,
            });
        }

        let digest = Sha256::digest(&raw);
        if to_hex(&digest) != entry.sha256 {
            return Err(ParamsError::HashMismatch { k });
        }

        Ok(ProverParams { k, bytes: raw })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryFetcher;

    const BASE: &str = "https://example.test/";

    fn leaked_table(k: u8, file: &'static str, body: &[u8]) -> &'static [ParamsEntry] {
        let sha256: &'static str = Box::leak(to_hex(&Sha256::digest(body)).into_boxed_str());
        Box::leak(vec![ParamsEntry { k, file, sha256 }].into_boxed_slice())
    }

    #[test]
    fn table_covers_k_10_to_24() {
        let ks: Vec<u8> = PARAMS_TABLE.iter().map(|entry| entry.k).collect();
        assert_eq!(ks, (10..=24).collect::<Vec<u8>>());
        for entry in PARAMS_TABLE {
            assert_eq!(entry.file, format!("bls_filecoin_2p{}", entry.k));
            assert_eq!(entry.sha256.len(), 64);
        }
    }

    #[tokio::test]
    async fn unknown_k_is_rejected_without_fetching() {
        let fetcher = Rc::new(MemoryFetcher::default());
        let provider = ParamsProvider::new(BASE, fetcher.clone());

        let err = provider.get_params(9).await.expect_err("k=9 is not published");
        assert!(matches!(err, ParamsError::UnknownK(9)));
        assert!(fetcher.requested.borrow().is_empty());
    }

    #[tokio::test]
    async fn verified_file_is_returned() {
        let body = b"params for k=12";
        let fetcher = Rc::new(
            MemoryFetcher::default().with("https://example.test/bls_filecoin_2p12", body),
        );
        let provider = ParamsProvider::with_table(
            BASE,
            fetcher.clone(),
            leaked_table(12, "bls_filecoin_2p12", body),
        );

        let params = provider.get_params(12).await.expect("digest matches");
        assert_eq!(params.k(), 12);
        assert_eq!(params.as_bytes(), body);
        assert_eq!(
            *fetcher.requested.borrow(),
            vec!["https://example.test/bls_filecoin_2p12".to_string()]
        );
    }

    #[tokio::test]
    async fn digest_mismatch_is_rejected() {
        let fetcher = Rc::new(
            MemoryFetcher::default().with("https://example.test/bls_filecoin_2p10", b"stale"),
        );
        let provider = ParamsProvider::new(BASE, fetcher);

        let err = provider.get_params(10).await.expect_err("wrong digest");
        assert!(matches!(err, ParamsError::HashMismatch { k: 10 }));
        assert!(err.to_string().starts_with("Hash mismatch for k: 10."));
    }

    #[tokio::test]
    async fn empty_file_is_rejected() {
        let fetcher =
            Rc::new(MemoryFetcher::default().with("https://example.test/bls_filecoin_2p11", b""));
        let provider = ParamsProvider::new(BASE, fetcher);

        let err = provider.get_params(11).await.expect_err("empty body");
        assert_eq!(
            err.to_string(),
            "Prover params not found or empty. Expected file bls_filecoin_2p11 at https://example.test/bls_filecoin_2p11"
        );
    }

    #[tokio::test]
    async fn missing_file_reports_url() {
        let provider = ParamsProvider::new(BASE, Rc::new(MemoryFetcher::default()));

        let err = provider.get_params(24).await.expect_err("not served");
        assert_eq!(
            err.to_string(),
            "Failed to fetch data from https://example.test/bls_filecoin_2p24"
        );
    }
}
