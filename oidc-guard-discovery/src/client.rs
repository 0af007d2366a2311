use std::future::Future;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::DiscoveryError;
use crate::metadata::{JsonWebKeySet, ProviderMetadata};

/// Path of the discovery document relative to the authority.
pub const WELL_KNOWN_PATH: &str = ".well-known/openid-configuration";

/// Source of provider metadata.
///
/// [`DiscoveryClient`] is the network implementation. Implement this trait to
/// serve metadata from somewhere else (a file, a fixture in tests).
pub trait Discoverer: Send + Sync + 'static {
    /// Fetch the provider metadata together with its signing keys.
    fn get_configuration(
        &self,
    ) -> impl Future<Output = Result<ProviderMetadata, DiscoveryError>> + Send;
}

/// Fetches `{authority}/.well-known/openid-configuration` and the key set it
/// points at.
///
/// Every call goes to the network: no caching, no retries. Timeouts are
/// whatever the supplied [`reqwest::Client`] enforces.
#[derive(Debug, Clone)]
pub struct DiscoveryClient {
    authority: String,
    http: reqwest::Client,
}

impl DiscoveryClient {
    /// Create a client for the given authority with a default HTTP client.
    pub fn new(authority: impl Into<String>) -> Self {
        Self::with_http_client(authority, reqwest::Client::new())
    }

    /// Create a client that issues its requests through `http`.
    pub fn with_http_client(authority: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            authority: authority.into(),
            http,
        }
    }

    /// The authority this client discovers.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// URL of the discovery document.
    pub fn discovery_url(&self) -> String {
        join_url(&self.authority, WELL_KNOWN_PATH)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, DiscoveryError> {
        let transport = |source| DiscoveryError::Transport {
            url: url.to_string(),
            source,
        };

        let body = self
            .http
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(transport)?
            .bytes()
            .await
            .map_err(transport)?;

        serde_json::from_slice(&body).map_err(|source| DiscoveryError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

impl Discoverer for DiscoveryClient {
    async fn get_configuration(&self) -> Result<ProviderMetadata, DiscoveryError> {
        let url = self.discovery_url();
        debug!(%url, "Fetching provider metadata");
        let mut metadata: ProviderMetadata = self.get_json(&url).await?;

        debug!(jwks_uri = %metadata.jwks_uri, "Fetching JWKS");
        let jwks: JsonWebKeySet = self.get_json(&metadata.jwks_uri).await?;
        metadata.signing_keys = jwks.keys;

        debug!(
            issuer = %metadata.issuer,
            keys = metadata.signing_keys.len(),
            "Provider metadata discovered"
        );
        Ok(metadata)
    }
}

/// Join `base` and `path` with exactly one `/` between them.
pub fn join_url(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.strip_prefix('/')) {
        (true, Some(rest)) => format!("{base}{rest}"),
        (false, None) if !path.is_empty() => format!("{base}/{path}"),
        _ => format!("{base}{path}"),
    }
}
