use std::path::Path;
use std::str::FromStr;

use jsonwebtoken::Algorithm;
use serde::Deserialize;
use thiserror::Error;

/// Default tolerance for `exp`/`nbf`, in seconds.
pub const DEFAULT_LEEWAY_SECS: u64 = 60;

/// Tokens longer than this are rejected before any parsing.
pub const DEFAULT_MAX_TOKEN_BYTES: usize = 8192;

/// Every asymmetric algorithm `jsonwebtoken` verifies.
pub const ASYMMETRIC_ALGORITHMS: [Algorithm; 9] = [
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::PS256,
    Algorithm::PS384,
    Algorithm::PS512,
    Algorithm::ES256,
    Algorithm::ES384,
    Algorithm::EdDSA,
];

/// Error loading a [`GuardConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config load error: {0}")]
    Load(String),

    #[error("config key not found: {0}")]
    Missing(&'static str),

    #[error("invalid value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Token validation settings.
#[derive(Clone, Debug)]
pub struct GuardConfig {
    /// Base URL of the identity provider. Used for discovery and as the
    /// expected `iss` claim.
    pub authority: String,

    /// Expected value in the `aud` claim.
    pub audience: String,

    /// Algorithms a token header may declare. Empty rejects every token.
    /// Default: [`ASYMMETRIC_ALGORITHMS`].
    pub allowed_algorithms: Vec<Algorithm>,

    /// Clock skew tolerated on `exp` and `nbf` (default: 60).
    pub leeway_secs: u64,

    /// Maximum accepted token length in bytes (default: 8192).
    pub max_token_bytes: usize,
}

impl GuardConfig {
    pub fn new(authority: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
            audience: audience.into(),
            allowed_algorithms: ASYMMETRIC_ALGORITHMS.to_vec(),
            leeway_secs: DEFAULT_LEEWAY_SECS,
            max_token_bytes: DEFAULT_MAX_TOKEN_BYTES,
        }
    }

    /// Set the allowed JWT algorithms.
    pub fn with_allowed_algorithms(
        mut self,
        algorithms: impl IntoIterator<Item = Algorithm>,
    ) -> Self {
        self.allowed_algorithms = algorithms.into_iter().collect();
        self
    }

    /// Allow a single algorithm only.
    pub fn with_allowed_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.allowed_algorithms = vec![algorithm];
        self
    }

    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }

    pub fn with_max_token_bytes(mut self, max_token_bytes: usize) -> Self {
        self.max_token_bytes = max_token_bytes;
        self
    }

    /// Parse the `oidc` section of a YAML document.
    ///
    /// ```yaml
    /// oidc:
    ///   authority: https://idp.example/
    ///   audience: svc-a
    ///   algorithms: [RS256, ES256]
    ///   leeway_secs: 30
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Self::resolve(Some(yaml), |_| None)
    }

    /// Load from an optional YAML file, then `.env`, then the process
    /// environment.
    ///
    /// Recognised variables: `OIDC_AUTHORITY`, `OIDC_AUDIENCE`,
    /// `OIDC_ALGORITHMS` (comma separated), `OIDC_LEEWAY_SECS`,
    /// `OIDC_MAX_TOKEN_BYTES`. `.env` never overwrites variables that are
    /// already set. A missing `.env` is fine, an unreadable or malformed one
    /// is a [`ConfigError::Load`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = if path.exists() {
            Some(std::fs::read_to_string(path).map_err(|e| ConfigError::Load(e.to_string()))?)
        } else {
            None
        };
        check_dotenv(dotenvy::dotenv())?;
        Self::resolve(yaml.as_deref(), |key| std::env::var(key).ok())
    }

    /// Build from YAML overlaid with values from `lookup` (keyed by the
    /// variable names listed on [`GuardConfig::load`]).
    pub fn resolve(
        yaml: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut section = match yaml {
            Some(yaml) => {
                serde_yaml::from_str::<ConfigFile>(yaml)
                    .map_err(|e| ConfigError::Load(e.to_string()))?
                    .oidc
            }
            None => OidcSection::default(),
        };

        if let Some(authority) = lookup("OIDC_AUTHORITY") {
            section.authority = Some(authority);
        }
        if let Some(audience) = lookup("OIDC_AUDIENCE") {
            section.audience = Some(audience);
        }
        if let Some(algorithms) = lookup("OIDC_ALGORITHMS") {
            section.algorithms = Some(parse_algorithms(&algorithms)?);
        }
        if let Some(leeway) = lookup("OIDC_LEEWAY_SECS") {
            section.leeway_secs = Some(parse_number("OIDC_LEEWAY_SECS", &leeway)?);
        }
        if let Some(max) = lookup("OIDC_MAX_TOKEN_BYTES") {
            section.max_token_bytes = Some(parse_number("OIDC_MAX_TOKEN_BYTES", &max)?);
        }

        let authority = section.authority.ok_or(ConfigError::Missing("oidc.authority"))?;
        let audience = section.audience.ok_or(ConfigError::Missing("oidc.audience"))?;

        let mut config = GuardConfig::new(authority, audience);
        if let Some(algorithms) = section.algorithms {
            config.allowed_algorithms = algorithms;
        }
        if let Some(leeway) = section.leeway_secs {
            config.leeway_secs = leeway;
        }
        if let Some(max) = section.max_token_bytes {
            config.max_token_bytes = max;
        }
        Ok(config)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    oidc: OidcSection,
}

#[derive(Debug, Default, Deserialize)]
struct OidcSection {
    authority: Option<String>,
    audience: Option<String>,
    algorithms: Option<Vec<Algorithm>>,
    leeway_secs: Option<u64>,
    max_token_bytes: Option<usize>,
}

fn parse_algorithms(value: &str) -> Result<Vec<Algorithm>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            Algorithm::from_str(name).map_err(|e| ConfigError::Invalid {
                key: "OIDC_ALGORITHMS",
                reason: format!("{name}: {e}"),
            })
        })
        .collect()
}

fn parse_number<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

fn check_dotenv<T>(result: Result<T, dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(ConfigError::Load(format!(".env: {e}"))),
    }
}
