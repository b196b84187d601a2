//! Fixed RSA key fixtures for testing
//!
//! One 2048-bit key pair in every encoding the authority accepts, plus the
//! values a JWKS for that key must contain. A second, unrelated public key
//! exercises mismatch handling.

use common::secret::SecretString;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use token_authority::config::KeySource;
use token_authority::crypto::KeyPair;

/// PKCS#1 private key (`RSA PRIVATE KEY`).
pub const PRIVATE_KEY_PKCS1_PEM: &str =
    include_str!("../../token-authority/test-resources/private_pkcs1.pem");

/// PKCS#8 private key (`PRIVATE KEY`).
pub const PRIVATE_KEY_PKCS8_PEM: &str =
    include_str!("../../token-authority/test-resources/private_pkcs8.pem");

/// PBES2-encrypted PKCS#8 private key (`ENCRYPTED PRIVATE KEY`).
pub const PRIVATE_KEY_ENCRYPTED_PEM: &str =
    include_str!("../../token-authority/test-resources/private_encrypted.pem");

/// Passphrase for [`PRIVATE_KEY_ENCRYPTED_PEM`].
pub const PRIVATE_KEY_PASSPHRASE: &str = "fixture-passphrase";

/// SubjectPublicKeyInfo public key (`PUBLIC KEY`).
pub const PUBLIC_KEY_PEM: &str = include_str!("../../token-authority/test-resources/public.pem");

/// PKCS#1 public key (`RSA PUBLIC KEY`).
pub const PUBLIC_KEY_PKCS1_PEM: &str =
    include_str!("../../token-authority/test-resources/public_pkcs1.pem");

/// Public key of an unrelated key pair.
pub const OTHER_PUBLIC_KEY_PEM: &str =
    include_str!("../../token-authority/test-resources/other_public.pem");

/// `kid`/`x5t` of the fixture key.
pub const FIXTURE_THUMBPRINT: &str = "0T4tRQBus3bawz754ctU_aTWRbE";

/// `kid` of [`OTHER_PUBLIC_KEY_PEM`].
pub const OTHER_THUMBPRINT: &str = "cxS8A-bxb-35yc7QFw0zKPnw8AE";

/// JWKS `n` of the fixture key.
pub const FIXTURE_MODULUS: &str = "1ZL0BqdwOF3zgEdfCnNYOIsvtsH1ubfLcSRvOCkDqh6CeELXbh6h9vDDKLxIjQZOuZqEmCG0M3OkELp8SGSB_k0zxYEXMQCwSq_wHaUt1rOK-8ZoWmwjkP3VcsLGz3AK11-nMlzzKh3zyM-kdfiI23dZTavQGz7cYu13wWv8soqy6vHEQF1NKBrEzXxkZMELrVDccmSpo0ScxuYEeX_ZU9sXxZPTe6j437ZcJXPm9RunS4G4KGGFqoVKaPJtIGYVR87BPVbv3ywu7YakWoN6vy4Et0KrrEnjAF_1jBG0YC-9NbYxrvkUv7r1PyLsUXy47uQEbQlxEx01h7Uk-MZTLQ";

/// JWKS `e` for exponent 65537.
pub const FIXTURE_EXPONENT: &str = "AQAB";

/// The fixture key pair, parsed from PEM.
///
/// # Panics
///
/// Never for the bundled fixtures.
pub fn fixture_key_pair() -> KeyPair {
    KeyPair::from_pem(
        PRIVATE_KEY_PKCS1_PEM.as_bytes(),
        PUBLIC_KEY_PEM.as_bytes(),
        None,
    )
    .expect("fixture key pair should parse")
}

/// Key files written to a temporary directory.
///
/// The directory is removed on drop.
pub struct KeyFiles {
    dir: TempDir,
}

impl KeyFiles {
    /// Write `private_pem` and `public_pem` to `private.pem`/`public.pem`.
    pub fn write(private_pem: &str, public_pem: &str) -> Result<Self, anyhow::Error> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("private.pem"), private_pem)?;
        fs::write(dir.path().join("public.pem"), public_pem)?;
        Ok(Self { dir })
    }

    pub fn private_path(&self) -> PathBuf {
        self.dir.path().join("private.pem")
    }

    pub fn public_path(&self) -> PathBuf {
        self.dir.path().join("public.pem")
    }

    /// A key source pointing at these files.
    pub fn key_source(&self, passphrase: Option<&str>) -> KeySource {
        KeySource {
            private_key_path: Some(self.private_path().display().to_string()),
            public_key_path: Some(self.public_path().display().to_string()),
            private_key_passphrase: passphrase.map(|p| SecretString::from(p.to_string())),
            fallback_key_bits: 2048,
        }
    }
}
