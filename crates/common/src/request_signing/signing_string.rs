//! Canonical signing string construction.

use chrono::Utc;

use crate::constants::SIGNATURE_VALIDITY_SECS;

/// `created`/`expires` pair of a signature, in whole seconds since the epoch.
///
/// `expires` is a protocol-level staleness window checked by the verifier;
/// nothing on the signing side enforces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureWindow {
    pub created: i64,
    pub expires: i64,
}

impl SignatureWindow {
    #[must_use]
    pub fn starting_at(created: i64) -> Self {
        Self {
            created,
            expires: created + SIGNATURE_VALIDITY_SECS,
        }
    }

    #[must_use]
    pub fn now() -> Self {
        Self::starting_at(Utc::now().timestamp())
    }
}

/// Builds the exact text that gets signed.
///
/// Three newline separated lines in fixed order, without a trailing newline.
/// The raw bytes of this string are signed; no prehash is applied.
#[must_use]
pub fn build_signing_string(created: i64, expires: i64, digest_header_value: &str) -> String {
    format!("(created): {created}\n(expires): {expires}\ndigest: {digest_header_value}")
}
