use std::sync::Arc;

use http::request::Parts;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Validation};
use tracing::{debug, warn};

use crate::claims::Claims;
use crate::config::GuardConfig;
use crate::error::GuardError;
use crate::extractor::{BearerTokenExtractor, TokenExtractor};
use crate::secret::{OidcSecretProvider, SecretProvider, SecretProviderErased};

/// Validates bearer tokens against a provider's keys, audience and issuer.
///
/// Each call runs a fixed sequence and stops at the first failure:
///
/// 1. Extract the token from the request
/// 2. Decode the header, check the algorithm, resolve the key named by `kid`
/// 3. Verify the signature (and `exp`/`nbf` when present)
/// 4. Check `aud` contains the expected audience
/// 5. Check `iss` equals the authority
///
/// Claims are never inspected before the signature has been verified.
///
/// # Example
///
/// ```ignore
/// let validator = TokenValidator::discover(GuardConfig::new("https://idp.example/", "svc-a"));
/// let claims = validator.validate(&parts).await?;
/// println!("hello {}", claims.subject().unwrap_or("anonymous"));
/// ```
pub struct TokenValidator {
    provider: Arc<dyn SecretProviderErased>,
    extractor: Box<dyn TokenExtractor>,
    config: GuardConfig,
}

impl TokenValidator {
    /// Validator reading `Authorization: Bearer` tokens and resolving keys
    /// through `provider`.
    pub fn new<P: SecretProvider>(provider: P, config: GuardConfig) -> Self {
        Self {
            provider: Arc::new(provider),
            extractor: Box::new(BearerTokenExtractor),
            config,
        }
    }

    /// Validator discovering keys from `config.authority`.
    pub fn discover(config: GuardConfig) -> Self {
        let provider = OidcSecretProvider::for_authority(config.authority.clone());
        Self::new(provider, config)
    }

    /// Replace the token extraction strategy.
    pub fn with_extractor<E: TokenExtractor>(mut self, extractor: E) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Whether `parts` carries a token for the configured extraction strategy.
    pub fn has_token(&self, parts: &Parts) -> bool {
        self.extractor.is_present(parts)
    }

    /// Extract the token from `parts` and validate it.
    pub async fn validate(&self, parts: &Parts) -> Result<Claims, GuardError> {
        let token = self.extractor.extract(parts)?;
        self.validate_token(&token).await
    }

    /// Validate an already extracted token.
    pub async fn validate_token(&self, token: &str) -> Result<Claims, GuardError> {
        if token.len() > self.config.max_token_bytes {
            return Err(GuardError::MalformedToken(format!(
                "token exceeds {} bytes",
                self.config.max_token_bytes
            )));
        }

        let header = decode_header(token)
            .map_err(|e| GuardError::MalformedToken(format!("failed to decode header: {e}")))?;
        let algorithm = header.alg;
        debug!(?algorithm, kid = ?header.kid, "Decoded JWT header");

        if !self.config.allowed_algorithms.contains(&algorithm) {
            return Err(GuardError::DisallowedAlgorithm(algorithm));
        }

        let kid = header.kid.as_deref().unwrap_or_default();
        let key = SecretProviderErased::get_secret(&*self.provider, kid).await?;

        let mut validation = Validation::new(algorithm);
        validation.required_spec_claims.clear();
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.leeway = self.config.leeway_secs;

        let claims = decode::<Claims>(token, &key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => GuardError::Expired,
                ErrorKind::ImmatureSignature => GuardError::NotYetValid,
                ErrorKind::InvalidToken
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => GuardError::MalformedToken(e.to_string()),
                _ => GuardError::Signature(e.to_string()),
            })?
            .claims;

        check_audience(&claims, &self.config.audience)?;
        check_issuer(&claims, &self.config.authority)?;

        debug!(sub = claims.subject().unwrap_or("unknown"), "JWT validated");
        Ok(claims)
    }
}

fn check_audience(claims: &Claims, expected: &str) -> Result<(), GuardError> {
    match claims.audience() {
        Some(aud) if aud.contains(expected) => Ok(()),
        aud => {
            warn!(?aud, %expected, "Token audience mismatch");
            Err(GuardError::InvalidAudience)
        }
    }
}

fn check_issuer(claims: &Claims, expected: &str) -> Result<(), GuardError> {
    match claims.issuer() {
        Some(iss) if iss == expected => Ok(()),
        iss => {
            warn!(?iss, %expected, "Token issuer mismatch");
            Err(GuardError::InvalidIssuer)
        }
    }
}
