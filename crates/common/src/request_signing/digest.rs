//! BLAKE2b-512 body digests.

use base64::{engine::general_purpose, Engine};
use blake2::{Blake2b512, Digest};

use crate::constants::DIGEST_ALGORITHM_TAG;

/// Base64 of the unkeyed 64-byte BLAKE2b hash of `body`.
#[must_use]
pub fn compute_digest(body: &[u8]) -> String {
    general_purpose::STANDARD.encode(Blake2b512::digest(body))
}

/// `Digest` header value: `BLAKE-512=<base64>`.
#[must_use]
pub fn digest_header_value(body: &[u8]) -> String {
    format!("{}={}", DIGEST_ALGORITHM_TAG, compute_digest(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_digest_known_vectors() {
        assert_eq!(
            compute_digest(b""),
            "eGoC90IBWQPGxv2FJVLScpEvR0DhWEdhiobiF/cfVBnSXhAxr+5YUxOJZESTTrBLkDpoWxRIt1XVb3Aa/pvizg=="
        );
        assert_eq!(
            compute_digest(b"abc"),
            "uoClP5gcTQ1qJ5e2nxL26UwhLxRoWsS3SxK7b9v/otF9h8U5Kqt5LcJS1d5FM8yVGNOKqNvxklq5I4bt1ACZIw=="
        );
    }

    #[test]
    fn test_compute_digest_is_deterministic() {
        let body = br#"{"context":{"action":"discover"},"message":{}}"#;
        assert_eq!(compute_digest(body), compute_digest(body));
    }

    #[test]
    fn test_single_byte_change_changes_digest() {
        let original = br#"{"hello":"world"}"#.to_vec();
        let mut changed = original.clone();
        changed[3] ^= 0x01;

        assert_ne!(compute_digest(&original), compute_digest(&changed));
    }

    #[test]
    fn test_digest_length() {
        let decoded = general_purpose::STANDARD
            .decode(compute_digest(b"payload"))
            .expect("should decode digest");
        assert_eq!(decoded.len(), 64);
    }

    #[test]
    fn test_digest_header_value_prefix() {
        let value = digest_header_value(br#"{"hello":"world"}"#);
        assert_eq!(
            value,
            "BLAKE-512=K0MSEUPYY0UkWEmg8P26ndBQceQfgPKS6Nw64oGSGUNt71cvuEJSh8MRD8CLk98fLg/HnEdT2LK7MUEP3vDb6A=="
        );
    }
}
