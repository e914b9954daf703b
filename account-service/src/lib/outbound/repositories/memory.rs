use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::account::errors::PersistenceError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::EmailAddress;
use crate::account::models::FieldUpdate;
use crate::account::models::NewAccount;
use crate::account::ports::AccountRepository;

/// Process-local account store.
///
/// Same contract as the PostgreSQL store, including case-insensitive
/// email uniqueness. Writes are last-writer-wins.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountRepository {
    accounts: Arc<RwLock<HashMap<AccountId, Account>>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

fn email_taken(
    accounts: &HashMap<AccountId, Account>,
    email: &EmailAddress,
    except: Option<&AccountId>,
) -> bool {
    accounts
        .values()
        .any(|a| &a.email == email && Some(&a.id) != except)
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn create(&self, account: NewAccount) -> Result<Account, PersistenceError> {
        let mut accounts = self.accounts.write().await;

        if email_taken(&accounts, &account.email, None) {
            return Err(PersistenceError::UniqueViolation(account.email.to_string()));
        }

        let now = Utc::now();
        let created = Account {
            id: AccountId::new(),
            name: account.name,
            email: account.email,
            password_digest: Some(account.password_digest),
            remember_digest: None,
            activation_digest: Some(account.activation_digest),
            activated: false,
            activated_at: None,
            created_at: now,
            updated_at: now,
        };
        accounts.insert(created.id, created.clone());

        Ok(created)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, PersistenceError> {
        Ok(self.accounts.read().await.get(id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Account>, PersistenceError> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| &a.email == email)
            .cloned())
    }

    async fn save(&self, account: &Account) -> Result<Account, PersistenceError> {
        let mut accounts = self.accounts.write().await;

        if email_taken(&accounts, &account.email, Some(&account.id)) {
            return Err(PersistenceError::UniqueViolation(account.email.to_string()));
        }

        let stored = accounts
            .get_mut(&account.id)
            .ok_or_else(|| PersistenceError::NotFound(account.id.to_string()))?;

        stored.name = account.name.clone();
        stored.email = account.email.clone();
        stored.password_digest = account.password_digest.clone();
        stored.updated_at = Utc::now();

        Ok(stored.clone())
    }

    async fn update_field(
        &self,
        id: &AccountId,
        update: FieldUpdate,
    ) -> Result<(), PersistenceError> {
        let mut accounts = self.accounts.write().await;

        let stored = accounts
            .get_mut(id)
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))?;

        stored.apply(&update);
        stored.updated_at = Utc::now();

        Ok(())
    }

    async fn delete(&self, id: &AccountId) -> Result<(), PersistenceError> {
        self.accounts
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))
    }
}
