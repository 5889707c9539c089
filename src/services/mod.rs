//! Domain services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own validation and persistence concerns so route
//! handlers can stay focused on request parsing and status mapping.

pub mod accounts;
pub mod password;
pub mod store;
