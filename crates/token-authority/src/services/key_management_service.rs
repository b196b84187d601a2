use crate::crypto::KeyPair;
use crate::errors::AuthorityError;
use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine as _,
};
use common::jwks::{Jwks, JsonWebKey, KEY_ALGORITHM_TAG, KEY_TYPE_RSA, KEY_USE_SIGNATURE};
use rsa::pkcs8::EncodePublicKey;
use rsa::traits::PublicKeyParts;
use tracing::instrument;

/// Render the active signing key as a JWKS document (RFC 7517).
///
/// One entry: `kid` and `x5t` are the key pair's thumbprint, `n`/`e` are
/// minimal big-endian base64url, `x5c` is standard base64 of the
/// SubjectPublicKeyInfo DER.
#[instrument(skip_all)]
pub fn publish_jwks(key_pair: &KeyPair) -> Result<Jwks, AuthorityError> {
    let public_key = key_pair.public_key();

    let spki = public_key
        .to_public_key_der()
        .map_err(|e| AuthorityError::Crypto(format!("Public key encoding failed: {}", e)))?;

    let jwk = JsonWebKey {
        alg: KEY_ALGORITHM_TAG.to_string(),
        kty: KEY_TYPE_RSA.to_string(),
        kid: key_pair.thumbprint().to_string(),
        use_: KEY_USE_SIGNATURE.to_string(),
        n: URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
        e: URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
        x5c: vec![STANDARD.encode(spki.as_bytes())],
        x5t: key_pair.thumbprint().to_string(),
    };

    Ok(Jwks { keys: vec![jwk] })
}
