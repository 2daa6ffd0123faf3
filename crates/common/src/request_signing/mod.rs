//! Request signing utilities for CDS calls.
//!
//! This module provides the session key store, BLAKE2b-512 body digests,
//! the canonical signing string, Ed25519 signing and the `Digest` /
//! `Authorization` header composition expected by the CDS verifier.

pub mod digest;
pub mod headers;
pub mod key_store;
pub mod signing;
pub mod signing_string;
pub mod verification;

pub use digest::*;
pub use headers::*;
pub use key_store::*;
pub use signing::*;
pub use signing_string::*;
pub use verification::*;
