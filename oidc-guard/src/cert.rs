//! Conversion of a JWK's `x5c` leaf certificate into a verification key.

use jsonwebtoken::DecodingKey;
use oidc_guard_discovery::SigningKey;
use x509_parser::oid_registry::OID_SIG_ED25519;
use x509_parser::pem::parse_x509_pem;
use x509_parser::public_key::PublicKey;

const PEM_BEGIN: &str = "-----BEGIN CERTIFICATE-----";
const PEM_END: &str = "-----END CERTIFICATE-----";

/// Wrap the key's leaf certificate in PEM boundary markers.
///
/// `None` when the key carries no `x5c` entry.
pub fn leaf_certificate_pem(key: &SigningKey) -> Option<String> {
    key.leaf_certificate()
        .map(|der_b64| format!("{PEM_BEGIN}\n{der_b64}\n{PEM_END}"))
}

/// Parse a PEM certificate and extract its subject public key.
///
/// RSA, EC and Ed25519 subject keys are supported. The error is a
/// human-readable reason.
pub fn decoding_key_from_certificate_pem(pem: &str) -> Result<DecodingKey, String> {
    let (_, pem) =
        parse_x509_pem(pem.as_bytes()).map_err(|e| format!("invalid PEM: {e}"))?;
    let cert = pem
        .parse_x509()
        .map_err(|e| format!("invalid X.509 certificate: {e}"))?;
    let spki = cert.public_key();

    if spki.algorithm.algorithm == OID_SIG_ED25519 {
        return Ok(DecodingKey::from_ed_der(&spki.subject_public_key.data));
    }

    match spki.parsed() {
        Ok(PublicKey::RSA(_)) => Ok(DecodingKey::from_rsa_der(&spki.subject_public_key.data)),
        Ok(PublicKey::EC(point)) => Ok(DecodingKey::from_ec_der(point.data())),
        Ok(_) => Err(format!(
            "unsupported public key algorithm {}",
            spki.algorithm.algorithm
        )),
        Err(e) => Err(format!("invalid subject public key: {e}")),
    }
}
