//! Bearer-token validation for services behind an OpenID Connect provider.
//!
//! A [`TokenValidator`] pulls the token from a request, resolves the
//! signing key named in its header through a [`SecretProvider`], verifies
//! the signature and then checks the `aud` and `iss` claims.
//! [`OidcSecretProvider`] discovers keys from the provider's
//! `.well-known/openid-configuration` and caches them by key id.

pub mod cert;
pub mod claims;
pub mod config;
pub mod error;
pub mod extractor;
pub mod request;
pub mod secret;
pub mod validator;

pub use claims::{Audience, Claims};
pub use config::{ConfigError, GuardConfig};
pub use error::GuardError;
pub use extractor::{
    extract_bearer_token, BearerTokenExtractor, FirstOf, HeaderTokenExtractor,
    QueryTokenExtractor, TokenExtractor,
};
pub use request::{extract_claims, AuthenticatedClaims};
pub use secret::{OidcSecretProvider, SecretProvider, StaticKeyProvider};
pub use validator::TokenValidator;

pub use oidc_guard_discovery as discovery;

pub mod prelude {
    //! Re-exports of the most commonly used types.
    pub use crate::{AuthenticatedClaims, Claims, GuardConfig, GuardError, TokenValidator};
}
