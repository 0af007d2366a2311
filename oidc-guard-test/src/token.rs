use http::header::AUTHORIZATION;
use http::request::Parts;
use http::Request;
use jsonwebtoken::{encode, Header};
use serde_json::{Map, Value};

use crate::keys::TestSigningKey;

/// Builds and signs a token with a [`TestSigningKey`].
///
/// ```ignore
/// let token = TokenBuilder::new(&key)
///     .issuer(&idp.authority())
///     .audience("svc-a")
///     .subject("user-1")
///     .sign();
/// ```
pub struct TokenBuilder<'a> {
    key: &'a TestSigningKey,
    kid: Option<String>,
    claims: Map<String, Value>,
}

impl<'a> TokenBuilder<'a> {
    /// Start a token whose header names `key`'s identifier.
    pub fn new(key: &'a TestSigningKey) -> Self {
        Self {
            key,
            kid: Some(key.kid().to_string()),
            claims: Map::new(),
        }
    }

    pub fn issuer(self, iss: &str) -> Self {
        self.claim("iss", iss)
    }

    pub fn audience(self, aud: &str) -> Self {
        self.claim("aud", aud)
    }

    pub fn audiences(self, aud: &[&str]) -> Self {
        self.claim("aud", aud)
    }

    pub fn subject(self, sub: &str) -> Self {
        self.claim("sub", sub)
    }

    /// Expire `secs` seconds from now (negative for the past).
    pub fn expires_in(self, secs: i64) -> Self {
        let exp = jsonwebtoken::get_current_timestamp() as i64 + secs;
        self.claim("exp", exp)
    }

    /// Set an arbitrary claim.
    pub fn claim(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.claims.insert(name.to_string(), value.into());
        self
    }

    /// Override the header `kid`.
    pub fn kid(mut self, kid: &str) -> Self {
        self.kid = Some(kid.to_string());
        self
    }

    /// Leave `kid` out of the header.
    pub fn without_kid(mut self) -> Self {
        self.kid = None;
        self
    }

    pub fn sign(self) -> String {
        let mut header = Header::new(self.key.algorithm());
        header.kid = self.kid;
        encode(&header, &Value::Object(self.claims), self.key.encoding_key())
            .expect("failed to sign test token")
    }
}

/// Request parts carrying `Authorization: Bearer <token>`.
pub fn request_with_bearer(token: &str) -> Parts {
    let (parts, _) = Request::builder()
        .uri("/protected")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(())
        .expect("failed to build test request")
        .into_parts();
    parts
}

/// Request parts without any `Authorization` header.
pub fn request_without_auth() -> Parts {
    let (parts, _) = Request::builder()
        .uri("/protected")
        .body(())
        .expect("failed to build test request")
        .into_parts();
    parts
}
