//! Account persistence.
//!
//! DESIGN
//! ======
//! `AccountStore` is the seam between the account service and Postgres.
//! Handlers reach it through `AppState` as `Arc<dyn AccountStore>`; the
//! Postgres implementation checks a connection out of the pool per call,
//! so no request holds a process-wide handle.
//!
//! Inserts run inside a transaction. A failed insert is rolled back
//! explicitly before the error is returned.

use sqlx::{PgPool, Row};
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint on `username` or `email` rejected the row.
    #[error("username or email already exists")]
    Conflict,
    #[error("{0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if is_unique_violation(&err) { Self::Conflict } else { Self::Database(err) }
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Row to insert. `password` is already sealed by the configured storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

/// Row read back for credential checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] on a uniqueness violation and
    /// [`StoreError::Database`] for anything else.
    async fn insert_account(&self, account: &NewAccount) -> Result<(), StoreError>;

    /// Look up every account with exactly this username. With the bundled
    /// schema that is zero or one row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    async fn find_accounts(&self, username: &str) -> Result<Vec<StoredAccount>, StoreError>;
}

// =============================================================================
// POSTGRES
// =============================================================================

pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AccountStore for PgAccountStore {
    async fn insert_account(&self, account: &NewAccount) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query("INSERT INTO users (username, email, password, role) VALUES ($1, $2, $3, $4)")
            .bind(&account.username)
            .bind(&account.email)
            .bind(&account.password)
            .bind(account.role.as_deref())
            .execute(&mut *tx)
            .await;

        if let Err(e) = inserted {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "rollback after failed insert failed");
            }
            return Err(e.into());
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_accounts(&self, username: &str) -> Result<Vec<StoredAccount>, StoreError> {
        let rows = sqlx::query("SELECT username, email, password, role FROM users WHERE username = $1")
            .bind(username)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| StoredAccount {
                username: row.get("username"),
                email: row.get("email"),
                password: row.get("password"),
                role: row.get("role"),
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
