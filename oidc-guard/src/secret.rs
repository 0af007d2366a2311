use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use dashmap::DashMap;
use jsonwebtoken::DecodingKey;
use oidc_guard_discovery::{Discoverer, DiscoveryClient};
use tracing::{debug, warn};

use crate::cert::{decoding_key_from_certificate_pem, leaf_certificate_pem};
use crate::error::GuardError;

/// Resolves a token's key id to a verification key.
pub trait SecretProvider: Send + Sync + 'static {
    /// Key for `kid`. `kid` is empty when the token header names no key.
    fn get_secret(
        &self,
        kid: &str,
    ) -> impl Future<Output = Result<Arc<DecodingKey>, GuardError>> + Send;
}

/// Object-safe wrapper for `SecretProvider`.
pub(crate) trait SecretProviderErased: Send + Sync {
    fn get_secret<'a>(
        &'a self,
        kid: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Arc<DecodingKey>, GuardError>> + Send + 'a>>;
}

impl<T: SecretProvider> SecretProviderErased for T {
    fn get_secret<'a>(
        &'a self,
        kid: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Arc<DecodingKey>, GuardError>> + Send + 'a>> {
        Box::pin(SecretProvider::get_secret(self, kid))
    }
}

impl<T: SecretProvider> SecretProvider for Arc<T> {
    fn get_secret(
        &self,
        kid: &str,
    ) -> impl Future<Output = Result<Arc<DecodingKey>, GuardError>> + Send {
        SecretProvider::get_secret(&**self, kid)
    }
}

/// Always returns the same key, whatever the token asks for.
///
/// For callers that already hold the provider's single key (or a shared
/// secret) and want to skip discovery.
#[derive(Clone)]
pub struct StaticKeyProvider {
    key: Arc<DecodingKey>,
}

impl StaticKeyProvider {
    pub fn new(key: DecodingKey) -> Self {
        Self { key: Arc::new(key) }
    }
}

impl SecretProvider for StaticKeyProvider {
    fn get_secret(
        &self,
        _kid: &str,
    ) -> impl Future<Output = Result<Arc<DecodingKey>, GuardError>> + Send {
        let key = Arc::clone(&self.key);
        async move { Ok(key) }
    }
}

/// Resolves keys from the provider's published key set, caching each
/// resolved key by id.
///
/// A cache miss fetches the whole metadata and key set again. Entries are
/// written once and kept for the lifetime of the provider: a key rotated
/// under an id that is already cached is not picked up. Concurrent misses
/// for the same id each fetch; the first to finish populates the cache and
/// every caller gets that key.
pub struct OidcSecretProvider<D: Discoverer = DiscoveryClient> {
    discoverer: D,
    cache: DashMap<String, Arc<DecodingKey>>,
}

impl OidcSecretProvider<DiscoveryClient> {
    /// Provider discovering keys from `authority` over HTTP.
    pub fn for_authority(authority: impl Into<String>) -> Self {
        Self::new(DiscoveryClient::new(authority))
    }
}

impl<D: Discoverer> OidcSecretProvider<D> {
    pub fn new(discoverer: D) -> Self {
        Self {
            discoverer,
            cache: DashMap::new(),
        }
    }

    pub fn discoverer(&self) -> &D {
        &self.discoverer
    }

    /// Number of resolved keys held.
    pub fn cached_keys(&self) -> usize {
        self.cache.len()
    }

    async fn resolve(&self, kid: &str) -> Result<DecodingKey, GuardError> {
        let metadata = self.discoverer.get_configuration().await?;

        let pem = metadata
            .find_key(kid)
            .and_then(leaf_certificate_pem)
            .ok_or_else(|| {
                warn!(%kid, issuer = %metadata.issuer, "No certificate-backed key with this id");
                GuardError::KeyNotFound(kid.to_string())
            })?;

        decoding_key_from_certificate_pem(&pem).map_err(|reason| GuardError::KeyParse {
            kid: kid.to_string(),
            reason,
        })
    }
}

impl<D: Discoverer> SecretProvider for OidcSecretProvider<D> {
    async fn get_secret(&self, kid: &str) -> Result<Arc<DecodingKey>, GuardError> {
        if kid.is_empty() {
            return Err(GuardError::MissingKeyId);
        }

        let cached = self.cache.get(kid).map(|entry| Arc::clone(entry.value()));
        if let Some(key) = cached {
            debug!(%kid, "Signing key cache hit");
            return Ok(key);
        }

        debug!(%kid, "Signing key cache miss, discovering");
        let key = Arc::new(self.resolve(kid).await?);

        let stored = self
            .cache
            .entry(kid.to_string())
            .or_insert(key)
            .value()
            .clone();
        Ok(stored)
    }
}
