//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It carries the account service, which in turn owns the store handle.
//! The store is pooled, so cloning the state per request is cheap and no
//! request serializes behind another.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::services::accounts::AccountService;
use crate::services::store::{AccountStore, PgAccountStore};

/// Shared application state, injected into Axum handlers via State extractor.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
}

impl AppState {
    #[must_use]
    pub fn new(accounts: AccountService) -> Self {
        Self { accounts }
    }

    /// Wire the Postgres-backed store with the configured account rules.
    #[must_use]
    pub fn from_pool(pool: PgPool, config: &AppConfig) -> Self {
        let store: Arc<dyn AccountStore> = Arc::new(PgAccountStore::new(pool));
        Self::new(AccountService::new(store, config.role_mode, config.password_storage))
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
