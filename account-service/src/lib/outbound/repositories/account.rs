use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::account::errors::PersistenceError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::AccountName;
use crate::account::models::EmailAddress;
use crate::account::models::FieldUpdate;
use crate::account::models::NewAccount;
use crate::account::ports::AccountRepository;
use crate::config::DatabaseConfig;

const EMAIL_UNIQUE_INDEX: &str = "accounts_email_lower_key";

const ACCOUNT_COLUMNS: &str = "id, name, email, password_digest, remember_digest, \
     activation_digest, activated, activated_at, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    name: String,
    email: String,
    password_digest: Option<String>,
    remember_digest: Option<String>,
    activation_digest: Option<String>,
    activated: bool,
    activated_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = PersistenceError;

    fn try_from(r: AccountRow) -> Result<Self, Self::Error> {
        let name = AccountName::new(r.name).map_err(|e| {
            PersistenceError::Database(format!("Stored name for {} {}", r.id, e))
        })?;
        let email = EmailAddress::new(r.email).map_err(|e| {
            PersistenceError::Database(format!("Stored email for {} {}", r.id, e))
        })?;

        Ok(Account {
            id: AccountId(r.id),
            name,
            email,
            password_digest: r.password_digest,
            remember_digest: r.remember_digest,
            activation_digest: r.activation_digest,
            activated: r.activated,
            activated_at: r.activated_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

fn database_error(e: sqlx::Error) -> PersistenceError {
    PersistenceError::Database(e.to_string())
}

fn write_error(e: sqlx::Error, email: &EmailAddress) -> PersistenceError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() && db_err.constraint() == Some(EMAIL_UNIQUE_INDEX) {
            return PersistenceError::UniqueViolation(email.to_string());
        }
    }
    database_error(e)
}

pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool from configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, PersistenceError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .map_err(database_error)?;

        tracing::info!(
            max_connections = config.max_connections,
            database = "postgresql",
            "Database connection pool created"
        );

        Ok(Self::new(pool))
    }

    /// Apply the bundled schema migrations.
    pub async fn migrate(&self) -> Result<(), PersistenceError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| PersistenceError::Database(e.to_string()))?;

        tracing::info!(database = "postgresql", "Database migrations completed");

        Ok(())
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn create(&self, account: NewAccount) -> Result<Account, PersistenceError> {
        let query = format!(
            r#"
            INSERT INTO accounts (id, name, email, password_digest, activation_digest)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        );

        let row = sqlx::query_as::<_, AccountRow>(&query)
            .bind(Uuid::new_v4())
            .bind(account.name.as_str())
            .bind(account.email.as_str())
            .bind(&account.password_digest)
            .bind(&account.activation_digest)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| write_error(e, &account.email))?;

        row.try_into()
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, PersistenceError> {
        let query = format!("SELECT {} FROM accounts WHERE id = $1", ACCOUNT_COLUMNS);

        sqlx::query_as::<_, AccountRow>(&query)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?
            .map(Account::try_from)
            .transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Account>, PersistenceError> {
        let query = format!(
            "SELECT {} FROM accounts WHERE LOWER(email) = $1",
            ACCOUNT_COLUMNS
        );

        sqlx::query_as::<_, AccountRow>(&query)
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?
            .map(Account::try_from)
            .transpose()
    }

    async fn save(&self, account: &Account) -> Result<Account, PersistenceError> {
        let query = format!(
            r#"
            UPDATE accounts
            SET name = $2, email = $3, password_digest = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        );

        let row = sqlx::query_as::<_, AccountRow>(&query)
            .bind(account.id.0)
            .bind(account.name.as_str())
            .bind(account.email.as_str())
            .bind(account.password_digest.as_deref())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| write_error(e, &account.email))?
            .ok_or_else(|| PersistenceError::NotFound(account.id.to_string()))?;

        row.try_into()
    }

    async fn update_field(
        &self,
        id: &AccountId,
        update: FieldUpdate,
    ) -> Result<(), PersistenceError> {
        let result = match update {
            FieldUpdate::RememberDigest(digest) => {
                sqlx::query(
                    r#"
                    UPDATE accounts
                    SET remember_digest = $2, updated_at = NOW()
                    WHERE id = $1
                    "#,
                )
                .bind(id.0)
                .bind(digest)
                .execute(&self.pool)
                .await
            }
            FieldUpdate::Activated { at } => {
                sqlx::query(
                    r#"
                    UPDATE accounts
                    SET activated = TRUE, activated_at = $2, updated_at = NOW()
                    WHERE id = $1
                    "#,
                )
                .bind(id.0)
                .bind(at)
                .execute(&self.pool)
                .await
            }
        }
        .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn delete(&self, id: &AccountId) -> Result<(), PersistenceError> {
        let result = sqlx::query(
            r#"
            DELETE FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::NotFound(id.to_string()));
        }

        Ok(())
    }
}
