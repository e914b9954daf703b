use thiserror::Error;

/// Error type for hashing passwords and bearer tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordError {
    /// Argon2 rejected the parameters or the salt could not be encoded.
    #[error("Secret hashing failed: {0}")]
    HashingFailed(String),

    /// The stored hash is not a parseable PHC string.
    #[error("Secret verification failed: {0}")]
    VerificationFailed(String),
}
