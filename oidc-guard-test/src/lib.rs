//! Test utilities for oidc-guard.
//!
//! - [`TestSigningKey`]: P-256, RSA or Ed25519 key pair with a self-signed certificate,
//!   published as a JWK carrying `x5c`.
//! - [`TestIdp`]: local identity provider serving discovery and JWKS.
//! - [`unreachable_authority`]: an authority that refuses connections.
//! - [`TokenBuilder`]: signs claim sets with a test key.

mod idp;
mod keys;
mod token;

pub use idp::{unreachable_authority, TestIdp};
pub use keys::TestSigningKey;
pub use token::{request_with_bearer, request_without_auth, TokenBuilder};
