use http::header::{HeaderName, AUTHORIZATION};
use http::request::Parts;
use tracing::debug;

use crate::error::GuardError;

/// Pulls the raw token string out of a request.
pub trait TokenExtractor: Send + Sync + 'static {
    fn extract(&self, parts: &Parts) -> Result<String, GuardError>;

    /// Whether the request carries the token's carrier at all, valid or not.
    ///
    /// `false` marks an anonymous request. The default treats every request
    /// `extract` fails on as anonymous.
    fn is_present(&self, parts: &Parts) -> bool {
        self.extract(parts).is_ok()
    }
}

/// Extract a Bearer token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively.
pub fn extract_bearer_token(header_value: &str) -> Result<&str, GuardError> {
    let (scheme, token) = header_value
        .split_once(' ')
        .ok_or_else(|| GuardError::Extraction("invalid authorization scheme".into()))?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(GuardError::Extraction("invalid authorization scheme".into()));
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(GuardError::Extraction("empty bearer token".into()));
    }
    Ok(token)
}

/// Reads `Authorization: Bearer <token>`. The default strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct BearerTokenExtractor;

impl TokenExtractor for BearerTokenExtractor {
    fn extract(&self, parts: &Parts) -> Result<String, GuardError> {
        let header = parts.headers.get(AUTHORIZATION).ok_or_else(|| {
            debug!(uri = %parts.uri, "Missing Authorization header");
            GuardError::Extraction("missing Authorization header".into())
        })?;
        let value = header
            .to_str()
            .map_err(|_| GuardError::Extraction("Authorization header is not ASCII".into()))?;
        extract_bearer_token(value).map(String::from)
    }

    fn is_present(&self, parts: &Parts) -> bool {
        parts.headers.contains_key(AUTHORIZATION)
    }
}

/// Reads the raw token from a named header, without any scheme prefix.
#[derive(Debug, Clone)]
pub struct HeaderTokenExtractor {
    header: HeaderName,
}

impl HeaderTokenExtractor {
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }
}

impl TokenExtractor for HeaderTokenExtractor {
    fn extract(&self, parts: &Parts) -> Result<String, GuardError> {
        let value = parts
            .headers
            .get(&self.header)
            .ok_or_else(|| GuardError::Extraction(format!("missing {} header", self.header)))?
            .to_str()
            .map_err(|_| GuardError::Extraction(format!("{} header is not ASCII", self.header)))?
            .trim();
        if value.is_empty() {
            return Err(GuardError::Extraction(format!("empty {} header", self.header)));
        }
        Ok(value.to_string())
    }

    fn is_present(&self, parts: &Parts) -> bool {
        parts.headers.contains_key(&self.header)
    }
}

/// Reads the token from a query parameter, `access_token` by default.
#[derive(Debug, Clone)]
pub struct QueryTokenExtractor {
    param: String,
}

impl QueryTokenExtractor {
    pub fn new(param: impl Into<String>) -> Self {
        Self {
            param: param.into(),
        }
    }
}

impl Default for QueryTokenExtractor {
    fn default() -> Self {
        Self::new("access_token")
    }
}

impl TokenExtractor for QueryTokenExtractor {
    fn extract(&self, parts: &Parts) -> Result<String, GuardError> {
        let query = parts.uri.query().unwrap_or_default();
        form_urlencoded::parse(query.as_bytes())
            .find(|(name, value)| name == self.param.as_str() && !value.is_empty())
            .map(|(_, value)| value.into_owned())
            .ok_or_else(|| GuardError::Extraction(format!("missing {} query parameter", self.param)))
    }

    fn is_present(&self, parts: &Parts) -> bool {
        let query = parts.uri.query().unwrap_or_default();
        form_urlencoded::parse(query.as_bytes()).any(|(name, _)| name == self.param.as_str())
    }
}

/// Tries the first extractor, falling back to the second when it fails.
///
/// The second extractor's error is reported. Nest `FirstOf` for more than two.
///
/// ```ignore
/// // Header first, then `?access_token=`.
/// let extractor = FirstOf(BearerTokenExtractor, QueryTokenExtractor::default());
/// ```
#[derive(Debug, Clone)]
pub struct FirstOf<A, B>(pub A, pub B);

impl<A: TokenExtractor, B: TokenExtractor> TokenExtractor for FirstOf<A, B> {
    fn extract(&self, parts: &Parts) -> Result<String, GuardError> {
        self.0.extract(parts).or_else(|_| self.1.extract(parts))
    }

    fn is_present(&self, parts: &Parts) -> bool {
        self.0.is_present(parts) || self.1.is_present(parts)
    }
}
