use std::fmt;
use std::sync::LazyLock;

use chrono::DateTime;
use chrono::Utc;
use regex::Regex;
use uuid::Uuid;

use crate::account::errors::ValidationReason;

/// Account aggregate entity.
///
/// Digests are one-way hashes; the plaintext password and tokens behind
/// them are never held here.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub name: AccountName,
    pub email: EmailAddress,
    pub password_digest: Option<String>,
    pub remember_digest: Option<String>,
    pub activation_digest: Option<String>,
    pub activated: bool,
    pub activated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Stored digest for the given kind of secret, if one is set.
    pub fn digest_for(&self, kind: SecretKind) -> Option<&str> {
        match kind {
            SecretKind::Password => self.password_digest.as_deref(),
            SecretKind::Remember => self.remember_digest.as_deref(),
            SecretKind::Activation => self.activation_digest.as_deref(),
        }
    }

    /// Apply a single-column update in memory, mirroring what the store persists.
    pub fn apply(&mut self, update: &FieldUpdate) {
        match update {
            FieldUpdate::RememberDigest(digest) => self.remember_digest = digest.clone(),
            FieldUpdate::Activated { at } => {
                self.activated = true;
                self.activated_at = Some(*at);
            }
        }
    }
}

/// Which secret a candidate is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    Password,
    Remember,
    Activation,
}

impl fmt::Display for SecretKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SecretKind::Password => "password",
            SecretKind::Remember => "remember",
            SecretKind::Activation => "activation",
        };
        f.write_str(name)
    }
}

/// Single-column write that bypasses field validation.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    /// Set (`Some`) or clear (`None`) the persistent-session digest.
    RememberDigest(Option<String>),
    /// Mark the account as activated.
    Activated { at: DateTime<Utc> },
}

/// Account unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Generate a new random account ID.
    ///
    /// # Returns
    /// AccountId with random UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Display name value type
///
/// Ensures the name is present and at most 50 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountName(String);

impl AccountName {
    pub const MAX_LENGTH: usize = 50;

    /// Create a new valid name.
    ///
    /// # Errors
    /// * `Required` - Name is empty or whitespace
    /// * `TooLong` - Name longer than 50 characters
    pub fn new(name: String) -> Result<Self, ValidationReason> {
        if is_blank(&name) {
            return Err(ValidationReason::Required);
        }

        let length = name.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(ValidationReason::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

static EMAIL_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9_+\-.]+@[a-z0-9\-]+(\.[a-z0-9\-]+)*\.[a-z]+$")
        .expect("email pattern compiles")
});

/// Email address type
///
/// Always held in canonical lower-case form, so equality is
/// case-insensitive with respect to the input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub const MAX_LENGTH: usize = 255;

    /// Create a new validated, lower-cased email address.
    ///
    /// Accepts `local@label.label.tld` where the local part holds word
    /// characters, `.`, `-` or `+`, domain labels hold letters, digits or
    /// `-`, and the final label is alphabetic.
    ///
    /// # Errors
    /// * `Required` - Email is empty or whitespace
    /// * `TooLong` - Email longer than 255 characters
    /// * `InvalidFormat` - Email does not match the accepted pattern
    pub fn new(email: String) -> Result<Self, ValidationReason> {
        if is_blank(&email) {
            return Err(ValidationReason::Required);
        }

        let length = email.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(ValidationReason::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }

        if !EMAIL_FORMAT.is_match(&email) {
            return Err(ValidationReason::InvalidFormat);
        }

        Ok(Self(email.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password that passed the length rule.
///
/// Only lives long enough to be hashed.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub const MIN_LENGTH: usize = 6;

    /// # Errors
    /// * `Required` - Password is empty or whitespace
    /// * `TooShort` - Password shorter than 6 characters
    pub fn new(password: String) -> Result<Self, ValidationReason> {
        if is_blank(&password) {
            return Err(ValidationReason::Required);
        }

        let length = password.chars().count();
        if length < Self::MIN_LENGTH {
            return Err(ValidationReason::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }

        Ok(Self(password))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Record handed to the store on creation; the store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: AccountName,
    pub email: EmailAddress,
    pub password_digest: String,
    pub activation_digest: String,
}

/// Raw sign-up input, as collected by the presentation layer.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: Option<String>,
}

/// Raw edit input.
///
/// `None` leaves a field alone. A blank password also leaves the
/// stored password unchanged.
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

/// Command to create a new account with domain types
#[derive(Debug)]
pub struct CreateAccountCommand {
    pub name: AccountName,
    pub email: EmailAddress,
    pub password: Password,
}

/// Command to update an existing account with optional validated fields.
///
/// Only provided fields will be updated.
#[derive(Debug, Default)]
pub struct UpdateAccountCommand {
    pub name: Option<AccountName>,
    pub email: Option<EmailAddress>,
    pub password: Option<Password>,
}

/// Outcome of a successful sign-up.
///
/// `activation_token` is the only copy of the plaintext token; deliver it
/// to the user and drop it.
#[derive(Debug, Clone)]
pub struct Registration {
    pub account: Account,
    pub activation_token: String,
}
