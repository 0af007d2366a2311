use std::ops::Deref;
use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts, OptionalFromRequestParts};
use http::request::Parts;
use tracing::{debug, warn};

use crate::claims::Claims;
use crate::error::GuardError;
use crate::validator::TokenValidator;

/// Validate the request's token with the `TokenValidator` held in `state`.
///
/// The building block behind [`AuthenticatedClaims`]. Use it to write an
/// extractor for your own identity type.
pub async fn extract_claims<S>(parts: &Parts, state: &S) -> Result<Claims, GuardError>
where
    S: Send + Sync,
    Arc<TokenValidator>: FromRef<S>,
{
    let validator: Arc<TokenValidator> = Arc::from_ref(state);

    let claims = validator.validate(parts).await.map_err(|e| {
        warn!(uri = %parts.uri, error = %e, transient = e.is_transient(), "Token validation failed");
        e
    })?;

    debug!(uri = %parts.uri, "Authenticated request");
    Ok(claims)
}

/// Claims of the request's validated token.
///
/// The application state must provide `Arc<TokenValidator>` via `FromRef`.
/// Rejections render as `401 {"error": "Unauthorized"}`.
///
/// ```ignore
/// async fn whoami(AuthenticatedClaims(claims): AuthenticatedClaims) -> String {
///     claims.subject().unwrap_or("unknown").to_string()
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticatedClaims(pub Claims);

impl Deref for AuthenticatedClaims {
    type Target = Claims;

    fn deref(&self) -> &Claims {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthenticatedClaims
where
    S: Send + Sync,
    Arc<TokenValidator>: FromRef<S>,
{
    type Rejection = GuardError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        extract_claims(parts, state).await.map(AuthenticatedClaims)
    }
}

/// `Option<AuthenticatedClaims>` for endpoints open to anonymous callers.
///
/// - No token carrier for the validator's extraction strategy → `Ok(None)`
/// - Valid token → `Ok(Some(claims))`
/// - Invalid token → `Err(GuardError)`
impl<S> OptionalFromRequestParts<S> for AuthenticatedClaims
where
    S: Send + Sync,
    Arc<TokenValidator>: FromRef<S>,
{
    type Rejection = GuardError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        let validator: Arc<TokenValidator> = Arc::from_ref(state);
        if !validator.has_token(parts) {
            return Ok(None);
        }

        extract_claims(parts, state)
            .await
            .map(|claims| Some(AuthenticatedClaims(claims)))
    }
}
