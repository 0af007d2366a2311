use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use jsonwebtoken::DecodingKey;
use oidc_guard::discovery::{Discoverer, DiscoveryError, ProviderMetadata, SigningKey};
use oidc_guard::{GuardError, OidcSecretProvider, SecretProvider, StaticKeyProvider};
use oidc_guard_test::TestSigningKey;
use serde_json::json;

/// Serves fixed metadata and counts how often it was asked.
struct FakeDiscoverer {
    metadata: ProviderMetadata,
    calls: AtomicUsize,
}

impl FakeDiscoverer {
    fn with_keys(keys: Vec<SigningKey>) -> Self {
        Self {
            metadata: ProviderMetadata {
                issuer: "https://idp.example/".into(),
                jwks_uri: "https://idp.example/jwks".into(),
                signing_keys: keys,
                ..Default::default()
            },
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Discoverer for FakeDiscoverer {
    async fn get_configuration(&self) -> Result<ProviderMetadata, DiscoveryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.metadata.clone())
    }
}

fn signing_key(key: &TestSigningKey) -> SigningKey {
    serde_json::from_value(key.jwk()).unwrap()
}

#[tokio::test]
async fn resolves_key_from_certificate() {
    let key = TestSigningKey::generate("k1");
    let provider = OidcSecretProvider::new(FakeDiscoverer::with_keys(vec![signing_key(&key)]));

    provider.get_secret("k1").await.unwrap();
    assert_eq!(provider.discoverer().calls(), 1);
    assert_eq!(provider.cached_keys(), 1);
}

#[tokio::test]
async fn cache_hit_returns_same_key_without_discovery() {
    let key = TestSigningKey::generate("k1");
    let provider = OidcSecretProvider::new(FakeDiscoverer::with_keys(vec![signing_key(&key)]));

    let first = provider.get_secret("k1").await.unwrap();
    let second = provider.get_secret("k1").await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(provider.discoverer().calls(), 1);
}

#[tokio::test]
async fn each_key_id_is_resolved_once() {
    let k1 = TestSigningKey::generate("k1");
    let k2 = TestSigningKey::generate("k2");
    let provider = OidcSecretProvider::new(FakeDiscoverer::with_keys(vec![
        signing_key(&k1),
        signing_key(&k2),
    ]));

    let a = provider.get_secret("k1").await.unwrap();
    let b = provider.get_secret("k2").await.unwrap();
    provider.get_secret("k1").await.unwrap();
    provider.get_secret("k2").await.unwrap();

    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(provider.discoverer().calls(), 2);
    assert_eq!(provider.cached_keys(), 2);
}

#[tokio::test]
async fn unknown_kid_is_not_cached() {
    let key = TestSigningKey::generate("k1");
    let provider = OidcSecretProvider::new(FakeDiscoverer::with_keys(vec![signing_key(&key)]));

    for _ in 0..2 {
        let err = provider.get_secret("nope").await.unwrap_err();
        assert!(matches!(err, GuardError::KeyNotFound(ref kid) if kid == "nope"));
    }
    assert_eq!(provider.discoverer().calls(), 2);
    assert_eq!(provider.cached_keys(), 0);
}

#[tokio::test]
async fn empty_kid_skips_discovery() {
    let provider = OidcSecretProvider::new(FakeDiscoverer::with_keys(vec![]));

    let err = provider.get_secret("").await.unwrap_err();
    assert!(matches!(err, GuardError::MissingKeyId));
    assert_eq!(provider.discoverer().calls(), 0);
}

#[tokio::test]
async fn key_without_certificate_is_not_found() {
    let bare: SigningKey = serde_json::from_value(json!({
        "kty": "RSA", "alg": "RS256", "kid": "k1", "n": "AQAB", "e": "AQAB"
    }))
    .unwrap();
    let provider = OidcSecretProvider::new(FakeDiscoverer::with_keys(vec![bare]));

    let err = provider.get_secret("k1").await.unwrap_err();
    assert!(matches!(err, GuardError::KeyNotFound(_)));
}

#[tokio::test]
async fn first_key_with_matching_id_wins() {
    let garbage: SigningKey = serde_json::from_value(json!({
        "kty": "EC", "kid": "k1", "x5c": ["bm90IGEgY2VydGlmaWNhdGU="]
    }))
    .unwrap();
    let good = TestSigningKey::generate("k1");
    let provider =
        OidcSecretProvider::new(FakeDiscoverer::with_keys(vec![garbage, signing_key(&good)]));

    let err = provider.get_secret("k1").await.unwrap_err();
    assert!(matches!(err, GuardError::KeyParse { ref kid, .. } if kid == "k1"));
    assert_eq!(provider.cached_keys(), 0);
}

#[tokio::test]
async fn concurrent_misses_share_one_cached_key() {
    let key = TestSigningKey::generate("k1");
    let provider = Arc::new(OidcSecretProvider::new(FakeDiscoverer::with_keys(vec![
        signing_key(&key),
    ])));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let provider = Arc::clone(&provider);
            tokio::spawn(async move { provider.get_secret("k1").await.unwrap() })
        })
        .collect();

    let mut keys = Vec::new();
    for handle in handles {
        keys.push(handle.await.unwrap());
    }

    let cached = provider.get_secret("k1").await.unwrap();
    assert!(keys.iter().all(|key| Arc::ptr_eq(key, &cached)));
    assert_eq!(provider.cached_keys(), 1);
}

#[tokio::test]
async fn static_provider_ignores_kid() {
    let provider = StaticKeyProvider::new(DecodingKey::from_secret(b"secret"));

    let a = provider.get_secret("").await.unwrap();
    let b = provider.get_secret("anything").await.unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}
