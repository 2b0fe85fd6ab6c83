//! # Crypto Codec
//!
//! Per-value encryption for variables at rest.
//!
//! ## Security Properties
//!
//! - **XChaCha20-Poly1305**: 192-bit random nonce per token, authenticated
//! - **Time-stamped**: issue time is bound into the tag as associated data
//! - **Key hygiene**: master key bytes are zeroed on drop

mod key;
mod token;

use thiserror::Error;

pub use key::{KeyError, MasterKey, INSECURE_DEFAULT_MATERIAL, KEY_SIZE};
pub use token::{TokenCodec, TOKEN_VERSION};

/// Token decryption errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecryptionError {
    /// Not a structurally valid token.
    #[error("Malformed token: {0}")]
    Malformed(String),

    /// Token produced by an unknown format version.
    #[error("Unsupported token version: {0:#04x}")]
    UnsupportedVersion(u8),

    /// Tag did not verify: tampered, or produced under another key.
    #[error("Token authentication failed")]
    AuthenticationFailed,
}

/// Encryption failed.
#[derive(Debug, Clone, Error)]
#[error("Encryption failed: {0}")]
pub struct EncryptionError(pub String);
