use base64::{engine::general_purpose::STANDARD, Engine};
use jsonwebtoken::{Algorithm, EncodingKey};
use rand::rngs::OsRng;
use rcgen::{CertificateParams, KeyPair, PKCS_ED25519};
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::RsaPrivateKey;
use serde_json::{json, Value};

/// Signing key with a self-signed certificate.
///
/// The certificate is what a provider publishes in the key's `x5c` member;
/// the private half signs tokens. [`TestSigningKey::generate`] gives a
/// P-256 key, [`TestSigningKey::rsa`] and [`TestSigningKey::ed25519`] the
/// other supported key types.
pub struct TestSigningKey {
    kid: String,
    algorithm: Algorithm,
    kty: &'static str,
    encoding_key: EncodingKey,
    /// Standard base64 DER of the certificate.
    certificate: String,
}

impl TestSigningKey {
    /// Generate a fresh ECDSA P-256 key pair and certificate (ES256).
    pub fn generate(kid: &str) -> Self {
        let key_pair = KeyPair::generate().expect("failed to generate P-256 key pair");
        let encoding_key = EncodingKey::from_ec_pem(key_pair.serialize_pem().as_bytes())
            .expect("failed to create EncodingKey from PKCS8 PEM");
        Self::certify(kid, &key_pair, Algorithm::ES256, "EC", encoding_key)
    }

    /// Generate a fresh RSA-2048 key pair and certificate (RS256).
    pub fn rsa(kid: &str) -> Self {
        let private_key =
            RsaPrivateKey::new(&mut OsRng, 2048).expect("failed to generate RSA-2048 key");
        let pkcs8_pem = private_key
            .to_pkcs8_pem(LineEnding::LF)
            .expect("failed to export RSA key as PKCS8 PEM");

        let encoding_key = EncodingKey::from_rsa_pem(pkcs8_pem.as_bytes())
            .expect("failed to create EncodingKey from RSA PEM");
        let key_pair = KeyPair::from_pem(&pkcs8_pem).expect("failed to load RSA key pair");
        Self::certify(kid, &key_pair, Algorithm::RS256, "RSA", encoding_key)
    }

    /// Generate a fresh Ed25519 key pair and certificate (EdDSA).
    pub fn ed25519(kid: &str) -> Self {
        let key_pair =
            KeyPair::generate_for(&PKCS_ED25519).expect("failed to generate Ed25519 key pair");
        let encoding_key = EncodingKey::from_ed_pem(key_pair.serialize_pem().as_bytes())
            .expect("failed to create EncodingKey from Ed25519 PEM");
        Self::certify(kid, &key_pair, Algorithm::EdDSA, "OKP", encoding_key)
    }

    fn certify(
        kid: &str,
        key_pair: &KeyPair,
        algorithm: Algorithm,
        kty: &'static str,
        encoding_key: EncodingKey,
    ) -> Self {
        let params = CertificateParams::new(vec!["oidc-guard.test".to_string()])
            .expect("failed to build certificate params");
        let cert = params
            .self_signed(key_pair)
            .expect("failed to self-sign test certificate");

        Self {
            kid: kid.to_string(),
            algorithm,
            kty,
            encoding_key,
            certificate: STANDARD.encode(cert.der()),
        }
    }

    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// Algorithm tokens signed with this key declare.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Base64 DER certificate, as found in `x5c[0]`.
    pub fn certificate(&self) -> &str {
        &self.certificate
    }

    /// The key as a JWKS entry.
    pub fn jwk(&self) -> Value {
        json!({
            "kty": self.kty,
            "alg": format!("{:?}", self.algorithm),
            "use": "sig",
            "kid": self.kid,
            "x5c": [self.certificate],
        })
    }

    /// A JWKS document containing the given keys.
    pub fn jwks(keys: &[&TestSigningKey]) -> Value {
        json!({ "keys": keys.iter().map(|key| key.jwk()).collect::<Vec<_>>() })
    }
}
