//! Session-scoped storage for Ed25519 signing identities.
//!
//! Identities are loaded from base64 encoded 32-byte seeds, kept in memory
//! for the lifetime of the session and never persisted. The store is a plain
//! owned value: embedders that share it between threads must serialize
//! mutation and the read-then-sign sequence themselves.

use std::collections::HashMap;

use base64::{engine::general_purpose, Engine};
use ed25519_dalek::{SigningKey, VerifyingKey};
use error_stack::{Report, ResultExt};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::error::DiscoveryError;
use crate::request_signing::headers::composite_key_id;

const SEED_LENGTH: usize = 32;

/// A loaded signing identity. Immutable once stored.
#[derive(Clone)]
pub struct SigningIdentity {
    subscriber_id: String,
    key_id: String,
    signing_key: SigningKey,
}

impl SigningIdentity {
    #[must_use]
    pub fn from_seed(
        subscriber_id: impl Into<String>,
        key_id: impl Into<String>,
        seed: &[u8; SEED_LENGTH],
    ) -> Self {
        Self {
            subscriber_id: subscriber_id.into(),
            key_id: key_id.into(),
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    #[must_use]
    pub fn subscriber_id(&self) -> &str {
        &self.subscriber_id
    }

    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    #[must_use]
    pub fn algorithm(&self) -> &'static str {
        "ed25519"
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Standard base64 of the 32-byte public key, as registered with the registry.
    #[must_use]
    pub fn public_key_base64(&self) -> String {
        general_purpose::STANDARD.encode(self.verifying_key().as_bytes())
    }

    /// `<subscriberId>|<keyId>|xed25519`
    #[must_use]
    pub fn composite_key_id(&self) -> String {
        composite_key_id(&self.subscriber_id, &self.key_id)
    }

    #[must_use]
    pub fn info(&self) -> KeyInfo {
        KeyInfo {
            key_id: self.key_id.clone(),
            subscriber_id: self.subscriber_id.clone(),
        }
    }
}

impl std::fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("subscriber_id", &self.subscriber_id)
            .field("key_id", &self.key_id)
            .field("algorithm", &self.algorithm())
            .finish_non_exhaustive()
    }
}

/// Public view of a stored identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyInfo {
    pub key_id: String,
    pub subscriber_id: String,
}

/// Key material input: `{ subscriberId, keyId, privateKey }`.
///
/// Fields are optional at the serde level so an incomplete document is
/// reported as [`DiscoveryError::MissingField`] rather than a parse error.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMaterial {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscriber_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

impl KeyMaterial {
    /// Generates a fresh identity seed from the OS random number generator.
    #[must_use]
    pub fn generate(subscriber_id: impl Into<String>, key_id: impl Into<String>) -> Self {
        let mut csprng = OsRng;
        let signing_key = SigningKey::generate(&mut csprng);

        Self {
            subscriber_id: Some(subscriber_id.into()),
            key_id: Some(key_id.into()),
            private_key: Some(general_purpose::STANDARD.encode(signing_key.to_bytes())),
        }
    }

    /// Parses a key material JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON.
    pub fn from_json(json: &str) -> Result<Self, Report<DiscoveryError>> {
        serde_json::from_str(json).change_context(DiscoveryError::InvalidKeyEncoding {
            message: "Key material is not a valid JSON document".into(),
        })
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("subscriber_id", &self.subscriber_id)
            .field("key_id", &self.key_id)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Mapping from key id to identity plus the current key pointer.
///
/// Invariant: `current_key_id`, when set, names a stored identity.
#[derive(Debug, Default, Clone)]
pub struct KeyStore {
    identities: HashMap<String, SigningIdentity>,
    current_key_id: Option<String>,
}

impl KeyStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads an identity from a base64 encoded seed and makes it current.
    ///
    /// Re-loading an existing `key_id` replaces the stored identity. On
    /// failure the store is left untouched.
    ///
    /// # Errors
    ///
    /// - [`DiscoveryError::MissingField`] if any input is empty
    /// - [`DiscoveryError::InvalidKeyEncoding`] if the key is not base64
    /// - [`DiscoveryError::InvalidKeyLength`] if the key is not 32 bytes
    pub fn load_key(
        &mut self,
        subscriber_id: &str,
        key_id: &str,
        private_key_b64: &str,
    ) -> Result<KeyInfo, Report<DiscoveryError>> {
        let subscriber_id = require_field("subscriberId", subscriber_id)?;
        let key_id = require_field("keyId", key_id)?;
        let private_key_b64 = require_field("privateKey", private_key_b64)?;

        let seed = decode_seed(private_key_b64).attach(format!("while loading key {key_id}"))?;
        let identity = SigningIdentity::from_seed(subscriber_id, key_id, &seed);
        let info = identity.info();

        self.identities.insert(key_id.to_string(), identity);
        self.current_key_id = Some(key_id.to_string());

        log::info!(
            "Loaded signing key: {} for subscriber: {}",
            info.key_id,
            info.subscriber_id
        );
        Ok(info)
    }

    /// Loads a parsed key material document.
    ///
    /// # Errors
    ///
    /// Same as [`KeyStore::load_key`].
    pub fn load_key_material(
        &mut self,
        material: &KeyMaterial,
    ) -> Result<KeyInfo, Report<DiscoveryError>> {
        self.load_key(
            material.subscriber_id.as_deref().unwrap_or_default(),
            material.key_id.as_deref().unwrap_or_default(),
            material.private_key.as_deref().unwrap_or_default(),
        )
    }

    #[must_use]
    pub fn list_keys(&self) -> Vec<KeyInfo> {
        self.identities.values().map(SigningIdentity::info).collect()
    }

    /// Switches the current identity.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::KeyNotFound`] if `key_id` is not stored.
    pub fn set_current(&mut self, key_id: &str) -> Result<(), Report<DiscoveryError>> {
        if !self.identities.contains_key(key_id) {
            log::error!("Signing key not found: {}", key_id);
            return Err(Report::new(DiscoveryError::KeyNotFound {
                key_id: key_id.to_string(),
            }));
        }

        self.current_key_id = Some(key_id.to_string());
        log::info!("Switched to signing key: {}", key_id);
        Ok(())
    }

    #[must_use]
    pub fn get_current(&self) -> Option<KeyInfo> {
        self.current_identity().map(SigningIdentity::info)
    }

    #[must_use]
    pub fn current_identity(&self) -> Option<&SigningIdentity> {
        self.current_key_id
            .as_deref()
            .and_then(|key_id| self.identities.get(key_id))
    }

    pub fn clear(&mut self) {
        self.identities.clear();
        self.current_key_id = None;
        log::info!("All signing keys cleared");
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

fn require_field<'a>(field: &str, value: &'a str) -> Result<&'a str, Report<DiscoveryError>> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Report::new(DiscoveryError::MissingField {
            field: field.to_string(),
        }));
    }
    Ok(value)
}

fn decode_seed(private_key_b64: &str) -> Result<[u8; SEED_LENGTH], Report<DiscoveryError>> {
    let bytes = general_purpose::STANDARD
        .decode(private_key_b64)
        .or_else(|_| general_purpose::STANDARD_NO_PAD.decode(private_key_b64))
        .map_err(|e| {
            Report::new(DiscoveryError::InvalidKeyEncoding {
                message: format!("Failed to decode base64 key: {}", e),
            })
        })?;

    let actual = bytes.len();
    bytes
        .try_into()
        .map_err(|_| Report::new(DiscoveryError::InvalidKeyLength { actual }))
}
