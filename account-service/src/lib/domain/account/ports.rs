use async_trait::async_trait;

use crate::account::errors::AccountError;
use crate::account::errors::CredentialError;
use crate::account::errors::PersistenceError;
use crate::account::models::Account;
use crate::account::models::AccountChanges;
use crate::account::models::AccountId;
use crate::account::models::EmailAddress;
use crate::account::models::FieldUpdate;
use crate::account::models::NewAccount;
use crate::account::models::Registration;
use crate::account::models::RegistrationForm;

/// Port for account domain service operations.
#[async_trait]
pub trait AccountServicePort: Send + Sync + 'static {
    /// Sign up a new account.
    ///
    /// Validates the form, hashes the password and issues the activation
    /// token whose digest is stored exactly once.
    ///
    /// # Arguments
    /// * `form` - Raw name, email, password and optional confirmation
    ///
    /// # Returns
    /// Created account (not yet activated) plus the plaintext activation token
    ///
    /// # Errors
    /// * `Validation` - One or more fields failed, including a taken email
    /// * `Credential` - Hashing failed
    /// * `Persistence` - Store operation failed
    async fn register(&self, form: RegistrationForm) -> Result<Registration, AccountError>;

    /// Retrieve account by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `Persistence` - Store operation failed
    async fn get_account(&self, id: &AccountId) -> Result<Account, AccountError>;

    /// Apply a validated edit.
    ///
    /// On any validation failure the stored account is left untouched.
    ///
    /// # Arguments
    /// * `id` - Account to edit
    /// * `changes` - Fields to change; blank password keeps the current one
    ///
    /// # Returns
    /// Updated account entity
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `Validation` - One or more fields failed
    /// * `Credential` - Hashing failed
    /// * `Persistence` - Store operation failed
    async fn update_account(
        &self,
        id: &AccountId,
        changes: AccountChanges,
    ) -> Result<Account, AccountError>;

    /// Delete existing account.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `Persistence` - Store operation failed
    async fn delete_account(&self, id: &AccountId) -> Result<(), AccountError>;

    /// Check an email/password pair.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password
    /// * `Persistence` - Store operation failed
    async fn log_in(&self, email: &str, password: &str) -> Result<Account, AccountError>;

    /// Start a persistent session.
    ///
    /// Replaces any previous remember digest on the account.
    ///
    /// # Returns
    /// Plaintext remember token for the caller to hand to the client
    ///
    /// # Errors
    /// * `Credential` - Hashing failed
    /// * `Persistence` - Store operation failed
    async fn remember(&self, account: &mut Account) -> Result<String, AccountError>;

    /// True if `token` matches the account's remember digest.
    ///
    /// False when no persistent session is active.
    async fn authenticated(&self, account: &Account, token: &str) -> bool;

    /// End the persistent session.
    ///
    /// Always clears the stored digest, whatever the caller's copy holds,
    /// so repeating it is harmless.
    ///
    /// # Errors
    /// * `Persistence` - Store operation failed
    async fn forget(&self, account: &mut Account) -> Result<(), AccountError>;

    /// True if `token` matches the account's activation digest.
    async fn verify_activation(&self, account: &Account, token: &str) -> bool;

    /// Confirm an account from its activation link.
    ///
    /// # Returns
    /// The account, now activated
    ///
    /// # Errors
    /// * `InvalidActivation` - Unknown email, already activated, or token mismatch
    /// * `Persistence` - Store operation failed
    async fn activate(&self, email: &str, token: &str) -> Result<Account, AccountError>;
}

/// Persistence operations for the account aggregate.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Persist a new account, assigning its id and timestamps.
    ///
    /// # Errors
    /// * `UniqueViolation` - Email is already registered
    /// * `Database` - Store operation failed
    async fn create(&self, account: NewAccount) -> Result<Account, PersistenceError>;

    /// Retrieve account by identifier.
    ///
    /// # Returns
    /// Optional account entity (None if not found)
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, PersistenceError>;

    /// Retrieve account by canonical (lower-case) email address.
    ///
    /// # Returns
    /// Optional account entity (None if not found)
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Account>, PersistenceError>;

    /// Write back name, email and password digest.
    ///
    /// # Returns
    /// Stored account with refreshed `updated_at`
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `UniqueViolation` - New email is already registered
    /// * `Database` - Store operation failed
    async fn save(&self, account: &Account) -> Result<Account, PersistenceError>;

    /// Write a single column without re-running field validation.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `Database` - Store operation failed
    async fn update_field(
        &self,
        id: &AccountId,
        update: FieldUpdate,
    ) -> Result<(), PersistenceError>;

    /// Remove account from storage.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `Database` - Store operation failed
    async fn delete(&self, id: &AccountId) -> Result<(), PersistenceError>;
}

/// Salted one-way hashing for passwords and bearer tokens.
pub trait CredentialHasher: Send + Sync + 'static {
    /// Digest suitable for storage.
    fn digest(&self, secret: &str) -> Result<String, CredentialError>;

    /// Constant-time check of `candidate` against `digest`.
    ///
    /// Absent or malformed digests never match.
    fn verify(&self, digest: Option<&str>, candidate: &str) -> bool;
}

/// Source of fresh random bearer tokens.
pub trait TokenIssuer: Send + Sync + 'static {
    fn new_token(&self) -> String;
}
