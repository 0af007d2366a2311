use thiserror::Error;

/// Failure fetching or decoding provider metadata or its key set.
///
/// Always transient from a token's point of view: the token may well be
/// valid, the provider just could not be consulted.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The HTTP request failed or the server answered with a non-success status.
    #[error("failed to fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not the expected JSON document.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl DiscoveryError {
    /// The URL whose fetch or decode failed.
    pub fn url(&self) -> &str {
        match self {
            DiscoveryError::Transport { url, .. } | DiscoveryError::Decode { url, .. } => url,
        }
    }
}
