use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Provider metadata as published at `/.well-known/openid-configuration`.
///
/// Only `issuer` and `jwks_uri` are required. The capability lists and
/// logout flags are kept for callers that want them; nothing in oidc-guard
/// enforces them, so a malformed value decodes to empty instead of failing
/// discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    pub issuer: String,
    pub jwks_uri: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_session_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_session_iframe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introspection_endpoint: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub frontchannel_logout_supported: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub frontchannel_logout_session_supported: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub backchannel_logout_supported: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub backchannel_logout_session_supported: Option<bool>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub scopes_supported: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub claims_supported: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub grant_types_supported: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub response_types_supported: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub response_modes_supported: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub token_endpoint_auth_methods_supported: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub subject_types_supported: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub id_token_signing_alg_values_supported: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub code_challenge_methods_supported: Vec<String>,

    /// Keys fetched from `jwks_uri`, in the order the provider listed them.
    /// Not part of the discovery document itself.
    #[serde(skip)]
    pub signing_keys: Vec<SigningKey>,
}

impl ProviderMetadata {
    /// First key whose `kid` equals `kid`.
    pub fn find_key(&self, kid: &str) -> Option<&SigningKey> {
        self.signing_keys
            .iter()
            .find(|key| key.kid.as_deref() == Some(kid))
    }
}

/// String list, keeping only string members. `null` or any other shape is empty.
fn lenient_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Boolean that some providers send as `"true"`/`"false"`.
fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(flag) => Some(flag),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    })
}

/// JWKS response envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonWebKeySet {
    #[serde(default)]
    pub keys: Vec<SigningKey>,
}

/// A single JSON Web Key entry.
///
/// Unknown members are ignored. The public key is carried either as RSA
/// components (`n`/`e`) or as an X.509 chain in `x5c`, leaf first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningKey {
    /// Key type (e.g. "RSA", "EC")
    #[serde(default)]
    pub kty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    /// Intended use, usually "sig"
    #[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    /// RSA modulus (base64url)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    /// RSA exponent (base64url)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
    /// Certificate chain, standard base64 DER entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub x5c: Vec<String>,
}

impl SigningKey {
    /// Base64 DER of the leaf certificate, if the key carries a chain.
    pub fn leaf_certificate(&self) -> Option<&str> {
        self.x5c.first().map(String::as_str)
    }
}
