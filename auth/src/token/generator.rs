use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Random bearer token generator.
///
/// Tokens are opaque, URL-safe and carry no state. Only their digest
/// should ever be persisted.
#[derive(Debug, Clone, Copy)]
pub struct TokenGenerator {
    byte_len: usize,
}

impl TokenGenerator {
    /// Smallest amount of entropy a token may carry (128 bits).
    pub const MIN_BYTE_LEN: usize = 16;

    /// Create a generator producing 128-bit tokens.
    pub fn new() -> Self {
        Self {
            byte_len: Self::MIN_BYTE_LEN,
        }
    }

    /// Create a generator producing tokens of `byte_len` random bytes.
    ///
    /// Values below [`Self::MIN_BYTE_LEN`] are raised to it.
    pub fn with_byte_len(byte_len: usize) -> Self {
        Self {
            byte_len: byte_len.max(Self::MIN_BYTE_LEN),
        }
    }

    /// Number of random bytes behind each token.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Generate a fresh token.
    ///
    /// # Returns
    /// URL-safe base64 string (no padding) of OS-sourced random bytes
    pub fn generate(&self) -> String {
        let mut bytes = vec![0u8; self.byte_len];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}
