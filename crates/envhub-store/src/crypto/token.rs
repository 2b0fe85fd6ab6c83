//! Authenticated, time-stamped value tokens.
//!
//! ```text
//! base64url( version:1 | issued_at:8 (BE secs) | nonce:24 | ciphertext+tag )
//!            '------ associated data ------'
//! ```

use std::fmt;

use base64::Engine;
use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    XChaCha20Poly1305, XNonce,
};
use rand::RngCore;

use super::key::MasterKey;
use super::{DecryptionError, EncryptionError};

/// Current token format version.
pub const TOKEN_VERSION: u8 = 0x01;

const HEADER_LEN: usize = 1 + 8;
const NONCE_LEN: usize = 24;
const TAG_LEN: usize = 16;
const MIN_TOKEN_LEN: usize = HEADER_LEN + NONCE_LEN + TAG_LEN;

/// Encrypts and decrypts individual variable values.
///
/// Tokens are non-deterministic: encrypting the same plaintext twice yields
/// different tokens, so tokens must never be compared for equality.
#[derive(Clone)]
pub struct TokenCodec {
    cipher: XChaCha20Poly1305,
    insecure_key: bool,
}

impl TokenCodec {
    /// Build a codec for the given master key.
    pub fn new(key: &MasterKey) -> Self {
        if key.is_insecure_default() {
            tracing::warn!(
                "[envhub] ⚠️ Token codec initialised with the INSECURE default key. \
                 Set a real master key before storing production secrets."
            );
        }
        Self {
            cipher: XChaCha20Poly1305::new(key.as_bytes().into()),
            insecure_key: key.is_insecure_default(),
        }
    }

    /// Whether the codec runs under the well-known default key.
    pub fn uses_insecure_key(&self) -> bool {
        self.insecure_key
    }

    /// Encrypt a value into a token.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, EncryptionError> {
        let issued_at = chrono::Utc::now().timestamp().max(0) as u64;

        let mut header = [0u8; HEADER_LEN];
        header[0] = TOKEN_VERSION;
        header[1..].copy_from_slice(&issued_at.to_be_bytes());

        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(
                XNonce::from_slice(&nonce),
                Payload {
                    msg: plaintext.as_bytes(),
                    aad: &header,
                },
            )
            .map_err(|e| EncryptionError(e.to_string()))?;

        let mut raw = Vec::with_capacity(HEADER_LEN + NONCE_LEN + ciphertext.len());
        raw.extend_from_slice(&header);
        raw.extend_from_slice(&nonce);
        raw.extend_from_slice(&ciphertext);

        Ok(base64::engine::general_purpose::URL_SAFE.encode(raw))
    }

    /// Decrypt a token back into its value.
    ///
    /// Fails when the token is malformed, was produced under another key, or
    /// has been tampered with.
    pub fn decrypt(&self, token: &str) -> Result<String, DecryptionError> {
        let raw = base64::engine::general_purpose::URL_SAFE
            .decode(token.trim())
            .map_err(|e| DecryptionError::Malformed(e.to_string()))?;

        if raw.len() < MIN_TOKEN_LEN {
            return Err(DecryptionError::Malformed(format!(
                "token is {} bytes, minimum is {MIN_TOKEN_LEN}",
                raw.len()
            )));
        }
        if raw[0] != TOKEN_VERSION {
            return Err(DecryptionError::UnsupportedVersion(raw[0]));
        }

        let (header, rest) = raw.split_at(HEADER_LEN);
        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

        let plaintext = self
            .cipher
            .decrypt(
                XNonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: header,
                },
            )
            .map_err(|_| DecryptionError::AuthenticationFailed)?;

        String::from_utf8(plaintext).map_err(|e| DecryptionError::Malformed(e.to_string()))
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("insecure_key", &self.insecure_key)
            .finish_non_exhaustive()
    }
}
