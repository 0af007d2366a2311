use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::keys::TestSigningKey;

const DISCOVERY_PATH: &str = "/.well-known/openid-configuration";
const JWKS_PATH: &str = "/jwks";

/// Local identity provider backed by a wiremock server.
///
/// Serves a discovery document whose `issuer` is [`TestIdp::authority`] and
/// a JWKS at `{authority}jwks`.
pub struct TestIdp {
    server: MockServer,
}

impl TestIdp {
    /// Start a provider publishing the given keys.
    pub async fn start(keys: &[&TestSigningKey]) -> Self {
        Self::start_with_jwks(TestSigningKey::jwks(keys)).await
    }

    /// Start a provider publishing an arbitrary JWKS document.
    pub async fn start_with_jwks(jwks: Value) -> Self {
        let server = MockServer::start().await;
        let authority = format!("{}/", server.uri());

        Mock::given(method("GET"))
            .and(path(DISCOVERY_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "issuer": authority,
                "jwks_uri": format!("{authority}jwks"),
                "id_token_signing_alg_values_supported": ["ES256"],
                "response_types_supported": ["code"],
                "subject_types_supported": ["public"],
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(jwks))
            .mount(&server)
            .await;

        Self { server }
    }

    /// Authority URL, with a trailing slash. Also the `issuer` it advertises.
    pub fn authority(&self) -> String {
        format!("{}/", self.server.uri())
    }

    /// Number of discovery document requests served so far.
    pub async fn discovery_requests(&self) -> usize {
        self.requests_to(DISCOVERY_PATH).await
    }

    /// Number of JWKS requests served so far.
    pub async fn jwks_requests(&self) -> usize {
        self.requests_to(JWKS_PATH).await
    }

    async fn requests_to(&self, target: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == target)
            .count()
    }
}

/// Authority URL on a local port nothing listens on.
///
/// The port is taken from a listener that is closed again before returning,
/// so connections to it are refused.
pub fn unreachable_authority() -> String {
    let listener =
        std::net::TcpListener::bind("127.0.0.1:0").expect("failed to bind ephemeral port");
    let port = listener
        .local_addr()
        .expect("failed to read ephemeral port")
        .port();
    drop(listener);
    format!("http://127.0.0.1:{port}/")
}
