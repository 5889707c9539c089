//! Password storage schemes.
//!
//! DESIGN
//! ======
//! `Plaintext` stores and compares the password verbatim. It is the default
//! so stored rows stay compatible with existing `users` tables, but it is a
//! known weakness. `Argon2` stores a PHC string (`$argon2id$...`) produced
//! with a fresh random salt and verifies against it.

use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PasswordStorage {
    #[default]
    Plaintext,
    Argon2,
}

impl PasswordStorage {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "plaintext" | "plain" => Some(Self::Plaintext),
            "argon2" | "argon2id" => Some(Self::Argon2),
            _ => None,
        }
    }

    /// Produce the value written to the `password` column.
    ///
    /// # Errors
    ///
    /// Returns a [`password_hash::Error`] if hashing fails.
    pub fn seal(self, password: &str) -> Result<String, password_hash::Error> {
        match self {
            Self::Plaintext => Ok(password.to_owned()),
            Self::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);
                let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
                Ok(hash.to_string())
            }
        }
    }

    /// Check a supplied password against a stored column value.
    ///
    /// A stored value that is not a valid PHC string never verifies.
    #[must_use]
    pub fn verify(self, stored: &str, supplied: &str) -> bool {
        match self {
            Self::Plaintext => stored == supplied,
            Self::Argon2 => PasswordHash::new(stored).is_ok_and(|parsed| {
                Argon2::default()
                    .verify_password(supplied.as_bytes(), &parsed)
                    .is_ok()
            }),
        }
    }
}

#[cfg(test)]
#[path = "password_test.rs"]
mod tests;
