use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use jsonwebtoken::Algorithm;
use oidc_guard_discovery::DiscoveryError;
use thiserror::Error;

/// Why a token was rejected or a key could not be resolved.
///
/// Every variant is terminal for the validation call that produced it.
/// Use [`GuardError::is_transient`] to tell provider outages apart from
/// tokens that are simply invalid.
#[derive(Debug, Error)]
pub enum GuardError {
    /// Provider metadata or its key set could not be fetched or decoded.
    #[error("discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    /// The token header carries no `kid` and the provider needs one.
    #[error("token header has no key id")]
    MissingKeyId,

    /// No key with this id in the provider's key set, or the key carries no certificate.
    #[error("unknown signing key: {0}")]
    KeyNotFound(String),

    /// Certificate material was present but could not be turned into a public key.
    #[error("failed to parse signing key {kid}: {reason}")]
    KeyParse { kid: String, reason: String },

    /// The request does not carry a token the extractor can read.
    #[error("no bearer token: {0}")]
    Extraction(String),

    /// The token is not a well-formed JWT.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// The header algorithm is not on the allow-list.
    #[error("disallowed token algorithm: {0:?}")]
    DisallowedAlgorithm(Algorithm),

    /// Signature verification failed.
    #[error("invalid token signature: {0}")]
    Signature(String),

    /// `exp` is in the past.
    #[error("token expired")]
    Expired,

    /// `nbf` is in the future.
    #[error("token not yet valid")]
    NotYetValid,

    #[error("invalid audience")]
    InvalidAudience,

    #[error("invalid issuer")]
    InvalidIssuer,
}

impl GuardError {
    /// `true` when the failure says nothing about the token itself and the
    /// same validation may succeed later.
    pub fn is_transient(&self) -> bool {
        matches!(self, GuardError::Discovery(_))
    }

    /// Message safe to return to the client.
    pub fn public_message(&self) -> &'static str {
        "Unauthorized"
    }
}

impl IntoResponse for GuardError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.public_message() });
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}
