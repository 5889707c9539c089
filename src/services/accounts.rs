//! Account service — registration and login.
//!
//! DESIGN
//! ======
//! Both operations are single-shot: validate the input, make one store
//! round trip, classify the outcome. Validation failures never reach the
//! store. Values are trimmed only to decide whether a field is blank; what
//! gets stored and compared is exactly what the caller sent.
//!
//! `RoleMode` folds the two historical request shapes into one path: in
//! `Required` mode every request carries a role, in `Optional` mode the role
//! may be omitted on registration and is compared on login only if given.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::password::PasswordStorage;
use super::store::{AccountStore, NewAccount, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoleMode {
    #[default]
    Required,
    Optional,
}

impl RoleMode {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "required" => Some(Self::Required),
            "optional" => Some(Self::Optional),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("all fields are required")]
    MissingFields,
    #[error("username or email already exists")]
    Conflict,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Password(password_hash::Error),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => Self::Conflict,
            other => Self::Store(other),
        }
    }
}

/// Registration input as received. Every field may be missing.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// Login input as received. Every field may be missing.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// Returns the value if it is present and not blank.
fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn AccountStore>,
    role_mode: RoleMode,
    passwords: PasswordStorage,
}

impl AccountService {
    #[must_use]
    pub fn new(store: Arc<dyn AccountStore>, role_mode: RoleMode, passwords: PasswordStorage) -> Self {
        Self { store, role_mode, passwords }
    }

    /// Validate and persist a new account.
    ///
    /// # Errors
    ///
    /// - [`AccountError::MissingFields`] if a required field is absent or blank.
    /// - [`AccountError::Conflict`] if the username or email is taken.
    /// - [`AccountError::Password`] if the password cannot be hashed.
    /// - [`AccountError::Store`] for any other store failure.
    pub async fn register(&self, input: Registration) -> Result<(), AccountError> {
        let account = self.validate_registration(input)?;

        match self.store.insert_account(&account).await {
            Ok(()) => {
                info!(username = %account.username, "account registered");
                Ok(())
            }
            Err(StoreError::Conflict) => {
                warn!(username = %account.username, "registration conflict");
                Err(AccountError::Conflict)
            }
            Err(e) => {
                error!(error = %e, "account insert failed");
                Err(AccountError::Store(e))
            }
        }
    }

    fn validate_registration(&self, input: Registration) -> Result<NewAccount, AccountError> {
        let (Some(username), Some(email), Some(password)) =
            (required(input.username), required(input.email), required(input.password))
        else {
            return Err(AccountError::MissingFields);
        };

        let role = required(input.role);
        if self.role_mode == RoleMode::Required && role.is_none() {
            return Err(AccountError::MissingFields);
        }

        let password = self.passwords.seal(&password).map_err(|e| {
            error!(error = %e, "password hashing failed");
            AccountError::Password(e)
        })?;

        Ok(NewAccount { username, email, password, role })
    }

    /// Check credentials against the stored accounts with this username.
    ///
    /// Any row whose role and password both match is accepted, so tables
    /// that only constrain `(username, email)` jointly still log in.
    ///
    /// # Errors
    ///
    /// - [`AccountError::MissingFields`] if a required field is absent or blank.
    /// - [`AccountError::InvalidCredentials`] if no account matches exactly.
    /// - [`AccountError::Store`] if the lookup fails.
    pub async fn login(&self, input: Credentials) -> Result<(), AccountError> {
        let (Some(username), Some(password)) = (required(input.username), required(input.password)) else {
            return Err(AccountError::MissingFields);
        };
        let role = required(input.role);
        if self.role_mode == RoleMode::Required && role.is_none() {
            return Err(AccountError::MissingFields);
        }

        let candidates = self.store.find_accounts(&username).await.map_err(|e| {
            error!(error = %e, "account lookup failed");
            AccountError::from(e)
        })?;

        let matched = candidates.iter().any(|account| {
            let role_ok = match role.as_deref() {
                Some(wanted) => account.role.as_deref() == Some(wanted),
                None => true,
            };
            role_ok && self.passwords.verify(&account.password, &password)
        });

        if matched {
            info!(%username, "login succeeded");
            Ok(())
        } else {
            warn!(%username, "login rejected");
            Err(AccountError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
#[path = "accounts_test.rs"]
mod tests;
