//! Integration tests for signing key resolution from disk
//!
//! Configured key files are used when they parse and match; anything else
//! falls back to a freshly generated key.

use authority_test_utils::*;
use std::collections::HashMap;
use token_authority::config::{Config, KeySource};
use token_authority::crypto::{resolve_key_pair, KeyOrigin};

#[test]
fn test_pkcs1_files_resolve_to_fixture_key() -> Result<(), anyhow::Error> {
    let files = KeyFiles::write(PRIVATE_KEY_PKCS1_PEM, PUBLIC_KEY_PEM)?;

    let key_pair = resolve_key_pair(&files.key_source(None))?;

    assert_eq!(key_pair.origin(), KeyOrigin::Loaded);
    assert_eq!(key_pair.thumbprint(), FIXTURE_THUMBPRINT);
    Ok(())
}

#[test]
fn test_encrypted_key_with_passphrase_resolves() -> Result<(), anyhow::Error> {
    let files = KeyFiles::write(PRIVATE_KEY_ENCRYPTED_PEM, PUBLIC_KEY_PKCS1_PEM)?;

    let key_pair = resolve_key_pair(&files.key_source(Some(PRIVATE_KEY_PASSPHRASE)))?;

    assert_eq!(key_pair.origin(), KeyOrigin::Loaded);
    assert_eq!(key_pair.thumbprint(), FIXTURE_THUMBPRINT);
    Ok(())
}

#[test]
fn test_encrypted_key_without_passphrase_falls_back() -> Result<(), anyhow::Error> {
    let files = KeyFiles::write(PRIVATE_KEY_ENCRYPTED_PEM, PUBLIC_KEY_PEM)?;

    let key_pair = resolve_key_pair(&files.key_source(None))?;

    assert_eq!(key_pair.origin(), KeyOrigin::Generated);
    assert_ne!(key_pair.thumbprint(), FIXTURE_THUMBPRINT);
    Ok(())
}

#[test]
fn test_mismatched_public_key_falls_back() -> Result<(), anyhow::Error> {
    let files = KeyFiles::write(PRIVATE_KEY_PKCS8_PEM, OTHER_PUBLIC_KEY_PEM)?;

    let key_pair = resolve_key_pair(&files.key_source(None))?;

    assert_eq!(key_pair.origin(), KeyOrigin::Generated);
    assert_ne!(key_pair.thumbprint(), FIXTURE_THUMBPRINT);
    assert_ne!(key_pair.thumbprint(), OTHER_THUMBPRINT);
    Ok(())
}

#[test]
fn test_missing_files_fall_back() -> Result<(), anyhow::Error> {
    let dir = tempfile::tempdir()?;
    let source = KeySource {
        private_key_path: Some(dir.path().join("absent.pem").display().to_string()),
        public_key_path: Some(dir.path().join("absent.pub").display().to_string()),
        private_key_passphrase: None,
        fallback_key_bits: 2048,
    };

    let key_pair = resolve_key_pair(&source)?;

    assert_eq!(key_pair.origin(), KeyOrigin::Generated);
    Ok(())
}

#[test]
fn test_garbage_pem_falls_back() -> Result<(), anyhow::Error> {
    let files = KeyFiles::write("not a pem file", PUBLIC_KEY_PEM)?;

    let key_pair = resolve_key_pair(&files.key_source(None))?;

    assert_eq!(key_pair.origin(), KeyOrigin::Generated);
    Ok(())
}

#[test]
fn test_config_from_env_vars_points_at_key_files() -> Result<(), anyhow::Error> {
    let files = KeyFiles::write(PRIVATE_KEY_PKCS8_PEM, PUBLIC_KEY_PEM)?;
    let vars = HashMap::from([
        ("AUTH_DIRECTORY_PATH".to_string(), "directory.json".to_string()),
        (
            "RSA_PRIVATE_KEY_PATH".to_string(),
            files.private_path().display().to_string(),
        ),
        (
            "RSA_PUBLIC_KEY_PATH".to_string(),
            files.public_path().display().to_string(),
        ),
    ]);

    let config = Config::from_vars(&vars)?;
    let key_pair = resolve_key_pair(&config.key_source)?;

    assert_eq!(key_pair.origin(), KeyOrigin::Loaded);
    assert_eq!(key_pair.thumbprint(), FIXTURE_THUMBPRINT);
    Ok(())
}
