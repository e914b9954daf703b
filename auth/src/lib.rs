//! Credential primitives library
//!
//! Provides reusable building blocks for account authentication:
//! - Password and token hashing (Argon2id, configurable cost)
//! - Random bearer token generation
//!
//! Each service defines its own credential traits and adapts these implementations.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::{HashCost, PasswordHasher};
//!
//! let hasher = PasswordHasher::with_cost(HashCost::Minimum);
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Bearer Tokens
//! ```
//! use auth::{HashCost, PasswordHasher, TokenGenerator};
//!
//! let token = TokenGenerator::new().generate();
//!
//! // Hand `token` to the user, store only its digest
//! let hasher = PasswordHasher::with_cost(HashCost::Minimum);
//! let digest = hasher.hash(&token).unwrap();
//! assert!(hasher.verify(&token, &digest).unwrap());
//! ```

pub mod password;
pub mod token;

// Re-export commonly used items
pub use password::HashCost;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::TokenGenerator;
