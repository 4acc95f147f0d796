//! HTTP client wrapper for talking to the OAI-PMH endpoint.
//!
//! Failed requests are not retried: any transport error or non-success status
//! is returned to the caller as-is.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::config::HTTP_TIMEOUT_SECS;
use crate::error::{HarvesterError, Result};

/// User agent string identifying this harvester.
const USER_AGENT: &str = concat!("pmc-harvester/", env!("CARGO_PKG_VERSION"));

/// Source of response bodies for a URL.
///
/// The harvester only depends on this trait, so pagination can be exercised
/// without a network.
pub trait Fetch {
    /// Fetch the body at `url` as text.
    fn fetch(&self, url: &str) -> Result<String>;
}

impl<T: Fetch + ?Sized> Fetch for &T {
    fn fetch(&self, url: &str) -> Result<String> {
        (**self).fetch(url)
    }
}

/// [`Fetch`] implementation backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the default client configuration.
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: create_client()?,
        })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        let bytes = download_bytes(&self.client, url)?;
        bytes_to_string(bytes, url)
    }
}

/// Create a configured HTTP client.
///
/// # Returns
/// A `reqwest::blocking::Client` configured with appropriate timeout and user agent.
pub fn create_client() -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Download content from a URL.
///
/// Non-success statuses are turned into errors via `error_for_status`.
///
/// # Arguments
/// * `client` - HTTP client to use
/// * `url` - URL to download from
///
/// # Returns
/// Raw bytes of the response body
pub fn download_bytes(client: &Client, url: &str) -> Result<Vec<u8>> {
    tracing::debug!(url, "GET");
    let response = client.get(url).send()?.error_for_status()?;
    let bytes = response.bytes()?;
    tracing::debug!(url, bytes = bytes.len(), "Response received");
    Ok(bytes.to_vec())
}

/// Decode a response body as UTF-8.
///
/// Invalid sequences are an error; `what` names the download in the log.
pub fn bytes_to_string(bytes: Vec<u8>, what: &str) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| {
        tracing::warn!(
            source = what,
            valid_up_to = e.utf8_error().valid_up_to(),
            "Response is not valid UTF-8"
        );
        HarvesterError::Encoding(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client() {
        let client = create_client();
        assert!(client.is_ok());
    }

    #[test]
    fn test_bytes_to_string_valid() {
        assert_eq!(
            bytes_to_string("héllo".as_bytes().to_vec(), "test").unwrap(),
            "héllo"
        );
    }

    #[test]
    fn test_bytes_to_string_invalid() {
        let err = bytes_to_string(vec![b'a', 0xff, b'b'], "test").unwrap_err();
        assert!(matches!(err, HarvesterError::Encoding(_)));
    }
}
