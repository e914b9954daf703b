use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;
use serde::Deserialize;

use super::errors::PasswordError;

/// Work factor applied when hashing.
///
/// `Minimum` exists so test and development runs do not pay the full
/// hashing cost. Never use it in production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashCost {
    #[default]
    Standard,
    Minimum,
}

impl HashCost {
    fn params(self) -> Result<Params, PasswordError> {
        match self {
            HashCost::Standard => Ok(Params::default()),
            HashCost::Minimum => Params::new(
                Params::MIN_M_COST,
                Params::MIN_T_COST,
                Params::MIN_P_COST,
                None,
            )
            .map_err(|e| PasswordError::HashingFailed(e.to_string())),
        }
    }
}

/// Password hashing implementation.
///
/// Provides salted, adaptive-cost hashing for passwords and bearer tokens
/// (internally uses Argon2id).
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher {
    cost: HashCost,
}

impl PasswordHasher {
    /// Create a new password hasher with the standard cost.
    pub fn new() -> Self {
        Self::with_cost(HashCost::Standard)
    }

    /// Create a password hasher with an explicit cost.
    pub fn with_cost(cost: HashCost) -> Self {
        Self { cost }
    }

    /// Cost this hasher applies to new hashes.
    pub fn cost(&self) -> HashCost {
        self.cost
    }

    /// Hash a plaintext secret.
    ///
    /// Uses Argon2id with random salt generation.
    ///
    /// # Arguments
    /// * `password` - Plaintext secret to hash
    ///
    /// # Returns
    /// PHC string format hash (includes algorithm, parameters, salt, and hash)
    ///
    /// # Errors
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.cost.params()?);

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a secret against a stored hash.
    ///
    /// Parameters are read back from the PHC string, so hashes produced at
    /// any cost verify regardless of this hasher's own cost.
    ///
    /// # Arguments
    /// * `password` - Plaintext secret to verify
    /// * `hash` - Stored hash in PHC string format
    ///
    /// # Returns
    /// True if the secret matches, false otherwise
    ///
    /// # Errors
    /// * `VerificationFailed` - Hash format is invalid
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            PasswordError::VerificationFailed(format!("Invalid password hash: {}", e))
        })?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::with_cost(HashCost::Minimum);
        let password = "secret1";

        let hash = hasher.hash(password).expect("Failed to hash password");
        assert!(hash.starts_with("$argon2id$"));

        assert!(hasher
            .verify(password, &hash)
            .expect("Failed to verify password"));
        assert!(!hasher
            .verify("secret1x", &hash)
            .expect("Failed to verify password"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = PasswordHasher::with_cost(HashCost::Minimum);

        let first = hasher.hash("same").expect("Failed to hash password");
        let second = hasher.hash("same").expect("Failed to hash password");

        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_across_costs() {
        let fast = PasswordHasher::with_cost(HashCost::Minimum);
        let standard = PasswordHasher::new();

        let hash = fast.hash("token").expect("Failed to hash password");

        assert!(standard.verify("token", &hash).expect("Failed to verify"));
    }

    #[test]
    fn test_verify_empty_password_against_hash() {
        let hasher = PasswordHasher::with_cost(HashCost::Minimum);
        let hash = hasher.hash("secret1").expect("Failed to hash password");

        assert!(!hasher.verify("", &hash).expect("Failed to verify"));
    }

    #[test]
    fn test_verify_invalid_hash() {
        let hasher = PasswordHasher::new();

        assert!(hasher.verify("password", "invalid_hash").is_err());
        assert!(hasher.verify("password", "").is_err());
    }

    #[test]
    fn test_hash_cost_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            cost: HashCost,
        }

        let wrapper: Wrapper =
            serde_json::from_str(r#"{"cost":"minimum"}"#).expect("Failed to deserialize");
        assert_eq!(wrapper.cost, HashCost::Minimum);
    }
}
