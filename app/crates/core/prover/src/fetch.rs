//! HTTP access for parameters and proving keys

use async_trait::async_trait;
use thiserror::Error;

/// Failure to retrieve a resource
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be sent
    #[error("request failed: {0}")]
    Request(String),
    /// The server answered with a non-success status
    #[error("unexpected status {0}")]
    Status(u16),
    /// The body could not be read
    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Retrieves the body behind a URL
#[async_trait(?Send)]
pub trait Fetch {
    /// Performs a GET request and returns the raw body.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// [`Fetch`] over `reqwest`, which uses the browser `fetch` API on wasm32
#[derive(Clone, Debug, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a default client.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait(?Send)]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))?;
        Ok(body.to_vec())
    }
}

/// Joins a relative path onto a base URL with exactly one `/` between them.
pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_normalizes_slashes() {
        assert_eq!(
            join_url("https://example.test/", "bls_filecoin_2p10"),
            "https://example.test/bls_filecoin_2p10"
        );
        assert_eq!(
            join_url("https://example.test", "/keys/pk"),
            "https://example.test/keys/pk"
        );
    }
}
