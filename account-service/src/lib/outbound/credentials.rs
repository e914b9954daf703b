//! Adapters from the `auth` primitives to the domain credential ports.

use crate::account::errors::CredentialError;
use crate::account::ports::CredentialHasher;
use crate::account::ports::TokenIssuer;

impl CredentialHasher for auth::PasswordHasher {
    fn digest(&self, secret: &str) -> Result<String, CredentialError> {
        self.hash(secret)
            .map_err(|e| CredentialError::HashingFailed(e.to_string()))
    }

    fn verify(&self, digest: Option<&str>, candidate: &str) -> bool {
        let Some(digest) = digest.filter(|d| !d.is_empty()) else {
            return false;
        };

        match auth::PasswordHasher::verify(self, candidate, digest) {
            Ok(matched) => matched,
            Err(e) => {
                tracing::warn!(error = %e, "Stored digest could not be parsed");
                false
            }
        }
    }
}

impl TokenIssuer for auth::TokenGenerator {
    fn new_token(&self) -> String {
        self.generate()
    }
}
