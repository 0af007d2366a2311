//! OpenID Connect discovery for oidc-guard.
//!
//! Fetches an identity provider's `/.well-known/openid-configuration`
//! document and the JSON Web Key Set it references.
//!
//! # Example
//!
//! ```ignore
//! use oidc_guard_discovery::{DiscoveryClient, Discoverer};
//!
//! let client = DiscoveryClient::new("https://idp.example/");
//! let metadata = client.get_configuration().await?;
//! println!("{} publishes {} keys", metadata.issuer, metadata.signing_keys.len());
//! ```

pub mod client;
pub mod error;
pub mod metadata;

pub use client::{join_url, Discoverer, DiscoveryClient, WELL_KNOWN_PATH};
pub use error::DiscoveryError;
pub use metadata::{JsonWebKeySet, ProviderMetadata, SigningKey};
