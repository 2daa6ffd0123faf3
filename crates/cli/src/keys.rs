//! Key material commands.
//!
//! Key files hold `{ "subscriberId", "keyId", "privateKey" }` where
//! `privateKey` is the base64 encoded 32-byte Ed25519 seed. They are read
//! into a fresh [`KeyStore`] for each command and never written back.

use std::fs;
use std::path::Path;

use beckn_discovery_common::request_signing::{KeyMaterial, KeyStore};

use crate::error::CliError;

/// Read a key file into a new store with that key current.
pub(crate) fn load_store(path: &Path) -> Result<KeyStore, CliError> {
    let content = fs::read_to_string(path)?;
    let material = KeyMaterial::from_json(&content)?;

    let mut store = KeyStore::new();
    store.load_key_material(&material)?;
    Ok(store)
}

/// Generate a new key file and print the public key to register.
pub fn generate(
    subscriber_id: &str,
    key_id: &str,
    output: &Path,
    force: bool,
) -> Result<(), CliError> {
    if output.exists() && !force {
        return Err(CliError::Config(format!(
            "{} already exists, pass --force to overwrite",
            output.display()
        )));
    }

    let material = KeyMaterial::generate(subscriber_id, key_id);
    // Round trip through the store so the file is known to load.
    let mut store = KeyStore::new();
    store.load_key_material(&material)?;
    let public_key = store
        .current_identity()
        .map(|identity| identity.public_key_base64())
        .ok_or_else(|| CliError::Signing("Generated key did not load".into()))?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(output, serde_json::to_string_pretty(&material)?)?;

    println!("Key material written to: {}", output.display());
    println!("  Subscriber: {}", subscriber_id);
    println!("  Key id: {}", key_id);
    println!("  Public key: {}", public_key);

    Ok(())
}

/// Print the identity held in a key file.
pub fn show(path: &Path) -> Result<(), CliError> {
    let store = load_store(path)?;
    let identity = store
        .current_identity()
        .ok_or_else(|| CliError::Signing("No signing key loaded".into()))?;

    println!("Subscriber: {}", identity.subscriber_id());
    println!("Key id: {}", identity.key_id());
    println!("Algorithm: {}", identity.algorithm());
    println!("Composite key id: {}", identity.composite_key_id());
    println!("Public key: {}", identity.public_key_base64());

    Ok(())
}
