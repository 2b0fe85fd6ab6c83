//! Master key material.

use std::fmt;

use base64::Engine;
use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Master key size (256-bit).
pub const KEY_SIZE: usize = 32;

/// Well-known material used when no master key is configured.
///
/// Anything encrypted under it is readable by anyone who knows this string.
pub const INSECURE_DEFAULT_MATERIAL: &str = "no-secret-set-no-secret-set-no-secret-set!!=";

/// Key material errors.
#[derive(Debug, Error)]
pub enum KeyError {
    /// Material is not valid base64.
    #[error("Invalid key encoding: {0}")]
    InvalidEncoding(String),

    /// Material decodes to the wrong number of bytes.
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Symmetric master key shared by every encrypt/decrypt call in the process.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    bytes: [u8; KEY_SIZE],
    #[zeroize(skip)]
    insecure_default: bool,
}

impl MasterKey {
    /// Create from raw bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self {
            bytes,
            insecure_default: false,
        }
    }

    /// Parse base64 material (standard or URL-safe alphabet) of exactly 32 bytes.
    pub fn from_base64(material: &str) -> Result<Self, KeyError> {
        let material = material.trim();
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(material)
            .or_else(|_| base64::engine::general_purpose::URL_SAFE.decode(material))
            .map_err(|e| KeyError::InvalidEncoding(e.to_string()))?;

        let bytes: [u8; KEY_SIZE] =
            decoded
                .as_slice()
                .try_into()
                .map_err(|_| KeyError::InvalidLength {
                    expected: KEY_SIZE,
                    actual: decoded.len(),
                })?;

        Ok(Self::from_bytes(bytes))
    }

    /// Key derived from [`INSECURE_DEFAULT_MATERIAL`].
    pub fn insecure_default() -> Self {
        let digest = Sha256::digest(INSECURE_DEFAULT_MATERIAL.as_bytes());
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(&digest);
        Self {
            bytes,
            insecure_default: true,
        }
    }

    /// Use configured material when present, otherwise fall back to the
    /// insecure default.
    ///
    /// Present-but-invalid material is an error, never a silent fallback.
    pub fn resolve(material: Option<&str>) -> Result<Self, KeyError> {
        match material.map(str::trim) {
            Some(m) if !m.is_empty() => Self::from_base64(m),
            _ => {
                tracing::warn!(
                    "[envhub] ⚠️ No master key configured. Using the INSECURE built-in default key; \
                     stored secrets are NOT protected."
                );
                Ok(Self::insecure_default())
            }
        }
    }

    /// Generate a random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
        Self::from_bytes(bytes)
    }

    /// Encode as URL-safe base64, the format accepted by [`MasterKey::from_base64`].
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::URL_SAFE.encode(self.bytes)
    }

    /// Whether this is the well-known insecure default.
    pub fn is_insecure_default(&self) -> bool {
        self.insecure_default
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterKey")
            .field("bytes", &"[REDACTED]")
            .field("insecure_default", &self.insecure_default)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_roundtrip() {
        let key = MasterKey::generate();
        let parsed = MasterKey::from_base64(&key.to_base64()).unwrap();
        assert_eq!(parsed.as_bytes(), key.as_bytes());
        assert!(!parsed.is_insecure_default());
    }

    #[test]
    fn test_accepts_standard_alphabet() {
        let encoded = base64::engine::general_purpose::STANDARD.encode([0xFBu8; KEY_SIZE]);
        let key = MasterKey::from_base64(&encoded).unwrap();
        assert_eq!(key.as_bytes(), &[0xFB; KEY_SIZE]);
    }

    #[test]
    fn test_wrong_length_rejected() {
        let encoded = base64::engine::general_purpose::STANDARD.encode([1u8; 16]);
        let result = MasterKey::from_base64(&encoded);
        assert!(matches!(
            result,
            Err(KeyError::InvalidLength {
                expected: 32,
                actual: 16
            })
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            MasterKey::from_base64("not base64 at all!!!"),
            Err(KeyError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_resolve_missing_uses_insecure_default() {
        let key = MasterKey::resolve(None).unwrap();
        assert!(key.is_insecure_default());

        let blank = MasterKey::resolve(Some("   ")).unwrap();
        assert!(blank.is_insecure_default());
        assert_eq!(blank.as_bytes(), key.as_bytes());
    }

    #[test]
    fn test_resolve_invalid_material_is_error() {
        assert!(MasterKey::resolve(Some("short")).is_err());
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = MasterKey::from_bytes([0xAB; KEY_SIZE]);
        let debug = format!("{key:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("171"));
    }
}
