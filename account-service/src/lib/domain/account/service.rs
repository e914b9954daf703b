use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::OnceCell;

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
use crate::account::models::SecretKind;
use crate::account::ports::AccountRepository;
use crate::account::ports::AccountServicePort;
use crate::account::ports::CredentialHasher;
use crate::account::ports::TokenIssuer;
use crate::account::validation::EmailAvailability;

/// Domain service implementation for account operations.
///
/// Hashing and digest checks are CPU-bound and run on the blocking pool.
pub struct AccountService<AR, CH, TI>
where
    AR: AccountRepository,
    CH: CredentialHasher,
    TI: TokenIssuer,
{
    repository: Arc<AR>,
    hasher: Arc<CH>,
    tokens: Arc<TI>,
    decoy_digest: OnceCell<String>,
}

impl<AR, CH, TI> AccountService<AR, CH, TI>
where
    AR: AccountRepository,
    CH: CredentialHasher,
    TI: TokenIssuer,
{
    /// Create a new account service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Account persistence implementation
    /// * `hasher` - Digest implementation for passwords and tokens
    /// * `tokens` - Bearer token source
    pub fn new(repository: Arc<AR>, hasher: Arc<CH>, tokens: Arc<TI>) -> Self {
        Self {
            repository,
            hasher,
            tokens,
            decoy_digest: OnceCell::new(),
        }
    }

    async fn digest(&self, secret: String) -> Result<String, CredentialError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.digest(&secret))
            .await
            .map_err(|e| CredentialError::TaskFailed(e.to_string()))?
    }

    async fn secret_matches(
        &self,
        account: &Account,
        kind: SecretKind,
        candidate: &str,
    ) -> bool {
        let Some(digest) = account.digest_for(kind).map(str::to_owned) else {
            return false;
        };

        match self.verify_digest(digest, candidate).await {
            Ok(matched) => matched,
            Err(e) => {
                tracing::error!(
                    account_id = %account.id,
                    secret = %kind,
                    error = %e,
                    "Digest verification task failed"
                );
                false
            }
        }
    }

    async fn verify_digest(
        &self,
        digest: String,
        candidate: &str,
    ) -> Result<bool, tokio::task::JoinError> {
        let hasher = Arc::clone(&self.hasher);
        let candidate = candidate.to_owned();

        tokio::task::spawn_blocking(move || hasher.verify(Some(digest.as_str()), &candidate)).await
    }

    /// Spend one full verification on a throwaway digest, so rejecting an
    /// unknown email costs as much as rejecting a wrong password.
    async fn verify_decoy(&self, candidate: &str) {
        let decoy = self
            .decoy_digest
            .get_or_try_init(|| self.digest(self.tokens.new_token()))
            .await;

        match decoy {
            Ok(digest) => {
                let _ = self.verify_digest(digest.clone(), candidate).await;
            }
            Err(e) => tracing::error!(error = %e, "Decoy digest could not be prepared"),
        }
    }

    /// Look up whether `raw_email` belongs to an account other than `owner`.
    ///
    /// Malformed emails count as available; the validator reports them.
    async fn email_availability(
        &self,
        raw_email: &str,
        owner: Option<&AccountId>,
    ) -> Result<EmailAvailability, AccountError> {
        let Ok(email) = EmailAddress::new(raw_email.to_string()) else {
            return Ok(EmailAvailability::Available);
        };

        match self.repository.find_by_email(&email).await? {
            Some(existing) if Some(&existing.id) != owner => Ok(EmailAvailability::Taken),
            _ => Ok(EmailAvailability::Available),
        }
    }

    async fn find_existing(&self, id: &AccountId) -> Result<Account, AccountError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(AccountError::NotFound(id.to_string()))
    }
}

fn not_found_as_domain(id: &AccountId, err: PersistenceError) -> AccountError {
    match err {
        PersistenceError::NotFound(_) => AccountError::NotFound(id.to_string()),
        other => AccountError::Persistence(other),
    }
}

#[async_trait]
impl<AR, CH, TI> AccountServicePort for AccountService<AR, CH, TI>
where
    AR: AccountRepository,
    CH: CredentialHasher,
    TI: TokenIssuer,
{
    async fn register(&self, form: RegistrationForm) -> Result<Registration, AccountError> {
        let availability = self.email_availability(&form.email, None).await?;
        let command = form.try_into_command(availability)?;

        let password_digest = self.digest(command.password.expose().to_owned()).await?;

        let activation_token = self.tokens.new_token();
        let activation_digest = self.digest(activation_token.clone()).await?;

        let account = self
            .repository
            .create(NewAccount {
                name: command.name,
                email: command.email,
                password_digest,
                activation_digest,
            })
            .await?;

        tracing::info!(account_id = %account.id, "Account registered");

        Ok(Registration {
            account,
            activation_token,
        })
    }

    async fn get_account(&self, id: &AccountId) -> Result<Account, AccountError> {
        self.find_existing(id).await
    }

    async fn update_account(
        &self,
        id: &AccountId,
        changes: AccountChanges,
    ) -> Result<Account, AccountError> {
        let mut account = self.find_existing(id).await?;

        let availability = match changes.email.as_deref() {
            Some(email) => self.email_availability(email, Some(id)).await?,
            None => EmailAvailability::Available,
        };
        let command = changes.try_into_command(availability)?;

        if let Some(name) = command.name {
            account.name = name;
        }

        if let Some(email) = command.email {
            account.email = email;
        }

        if let Some(password) = command.password {
            account.password_digest = Some(self.digest(password.expose().to_owned()).await?);
        }

        let updated = self
            .repository
            .save(&account)
            .await
            .map_err(|e| not_found_as_domain(id, e))?;

        tracing::info!(account_id = %updated.id, "Account updated");

        Ok(updated)
    }

    async fn delete_account(&self, id: &AccountId) -> Result<(), AccountError> {
        self.repository
            .delete(id)
            .await
            .map_err(|e| not_found_as_domain(id, e))?;

        tracing::info!(account_id = %id, "Account deleted");

        Ok(())
    }

    async fn log_in(&self, email: &str, password: &str) -> Result<Account, AccountError> {
        let Ok(email) = EmailAddress::new(email.to_string()) else {
            return Err(AccountError::InvalidCredentials);
        };

        let Some(account) = self.repository.find_by_email(&email).await? else {
            self.verify_decoy(password).await;
            tracing::warn!("Login rejected for unknown email");
            return Err(AccountError::InvalidCredentials);
        };

        if self.secret_matches(&account, SecretKind::Password, password).await {
            Ok(account)
        } else {
            tracing::warn!(account_id = %account.id, "Login rejected: password mismatch");
            Err(AccountError::InvalidCredentials)
        }
    }

    async fn remember(&self, account: &mut Account) -> Result<String, AccountError> {
        let token = self.tokens.new_token();
        let update = FieldUpdate::RememberDigest(Some(self.digest(token.clone()).await?));

        self.repository
            .update_field(&account.id, update.clone())
            .await
            .map_err(|e| not_found_as_domain(&account.id, e))?;
        account.apply(&update);

        tracing::info!(account_id = %account.id, "Persistent session started");

        Ok(token)
    }

    async fn authenticated(&self, account: &Account, token: &str) -> bool {
        self.secret_matches(account, SecretKind::Remember, token).await
    }

    async fn forget(&self, account: &mut Account) -> Result<(), AccountError> {
        let update = FieldUpdate::RememberDigest(None);
        self.repository
            .update_field(&account.id, update.clone())
            .await
            .map_err(|e| not_found_as_domain(&account.id, e))?;
        account.apply(&update);

        tracing::info!(account_id = %account.id, "Persistent session ended");

        Ok(())
    }

    async fn verify_activation(&self, account: &Account, token: &str) -> bool {
        self.secret_matches(account, SecretKind::Activation, token).await
    }

    async fn activate(&self, email: &str, token: &str) -> Result<Account, AccountError> {
        let Ok(email) = EmailAddress::new(email.to_string()) else {
            return Err(AccountError::InvalidActivation);
        };

        let Some(mut account) = self.repository.find_by_email(&email).await? else {
            tracing::warn!("Activation rejected for unknown email");
            return Err(AccountError::InvalidActivation);
        };

        if account.activated {
            tracing::warn!(account_id = %account.id, "Activation rejected: already active");
            return Err(AccountError::InvalidActivation);
        }

        if !self.secret_matches(&account, SecretKind::Activation, token).await {
            tracing::warn!(account_id = %account.id, "Activation rejected: token mismatch");
            return Err(AccountError::InvalidActivation);
        }

        let update = FieldUpdate::Activated { at: Utc::now() };
        self.repository
            .update_field(&account.id, update.clone())
            .await
            .map_err(|e| not_found_as_domain(&account.id, e))?;
        account.apply(&update);

        tracing::info!(account_id = %account.id, "Account activated");

        Ok(account)
    }
}
