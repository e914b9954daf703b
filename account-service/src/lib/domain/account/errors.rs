use std::fmt;

use thiserror::Error;

/// Account attribute a validation rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    Password,
    PasswordConfirmation,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Password => "password",
            Field::PasswordConfirmation => "password confirmation",
        };
        f.write_str(name)
    }
}

/// Why a single field was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationReason {
    #[error("is required")]
    Required,

    #[error("is too long (maximum {max} characters, got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("is too short (minimum {min} characters, got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("is invalid")]
    InvalidFormat,

    #[error("has already been taken")]
    NotUnique,

    #[error("doesn't match password")]
    ConfirmationMismatch,
}

/// A rejected field together with the reason.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field} {reason}")]
pub struct ValidationError {
    pub field: Field,
    pub reason: ValidationReason,
}

/// Every validation failure collected for one operation, in rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: Field, reason: ValidationReason) {
        self.0.push(ValidationError { field, reason });
    }

    /// Record the failure of `result` under `field`, passing the value through on success.
    pub fn check<T>(&mut self, field: Field, result: Result<T, ValidationReason>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(reason) => {
                self.push(field, reason);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// Reasons recorded against one field.
    pub fn for_field(&self, field: Field) -> Vec<&ValidationReason> {
        self.0
            .iter()
            .filter(|e| e.field == field)
            .map(|e| &e.reason)
            .collect()
    }

    pub fn contains(&self, field: Field, reason: &ValidationReason) -> bool {
        self.0.iter().any(|e| e.field == field && &e.reason == reason)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self(vec![error])
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Error for credential hashing operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Digest computation failed: {0}")]
    HashingFailed(String),

    #[error("Hashing task did not complete: {0}")]
    TaskFailed(String),
}

/// Error raised by the account store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("Account not found in store: {0}")]
    NotFound(String),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Top-level error for all account operations
#[derive(Debug, Clone, Error)]
pub enum AccountError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Account not found: {0}")]
    NotFound(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid activation link")]
    InvalidActivation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_display() {
        let mut errors = ValidationErrors::new();
        errors.push(Field::Name, ValidationReason::Required);
        errors.push(
            Field::Name,
            ValidationReason::TooLong {
                max: 50,
                actual: 51,
            },
        );
        errors.push(Field::Email, ValidationReason::InvalidFormat);

        assert_eq!(
            errors.to_string(),
            "name is required; name is too long (maximum 50 characters, got 51); email is invalid"
        );
    }

    #[test]
    fn test_check_records_failures() {
        let mut errors = ValidationErrors::new();

        let ok = errors.check(Field::Name, Ok::<_, ValidationReason>("Foo"));
        let failed = errors.check::<&str>(Field::Email, Err(ValidationReason::NotUnique));

        assert_eq!(ok, Some("Foo"));
        assert_eq!(failed, None);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.for_field(Field::Email),
            vec![&ValidationReason::NotUnique]
        );
        assert!(errors.for_field(Field::Name).is_empty());
    }
}
