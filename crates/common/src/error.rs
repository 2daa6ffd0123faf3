//! Error types for request signing, envelope construction and CDS calls.
//!
//! Fallible operations in this crate return
//! `Result<T, error_stack::Report<DiscoveryError>>`. None of these errors is
//! fatal to the process: a failed key load leaves the store as it was, and a
//! failed signature aborts only the request being signed.

use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum DiscoveryError {
    /// Key material input was incomplete.
    #[display("Missing required field: {field}")]
    MissingField { field: String },

    /// Decoded private key was not a 32-byte Ed25519 seed.
    #[display("Invalid key length: expected 32 bytes for Ed25519, got {actual}")]
    InvalidKeyLength { actual: usize },

    #[display("Invalid key encoding: {message}")]
    InvalidKeyEncoding { message: String },

    /// A signature was requested while no identity is current.
    #[display("No signing key loaded")]
    NoKeyLoaded,

    #[display("Signing key not found: {key_id}")]
    KeyNotFound { key_id: String },

    #[display("Signing failure: {message}")]
    SigningFailure { message: String },

    #[display("Configuration error: {message}")]
    Configuration { message: String },

    #[display("Bad request: {message}")]
    BadRequest { message: String },

    #[display("Transport error: {message}")]
    Transport { message: String },

    #[display("Invalid response: {message}")]
    InvalidResponse { message: String },
}
