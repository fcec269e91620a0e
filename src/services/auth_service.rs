//! Domain service for accounts: registration, login and lookup.
//!
//! Registration and login both finish by running the admin reconciler, and
//! login additionally allocates a nickname for accounts that lack one.

use serde::Deserialize;
use thiserror::Error;

use crate::domain::UserId;
use crate::domain::validation::FieldError;
use crate::models::Account;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// Another account already holds this email or nickname.
    #[error("{field} is already taken")]
    Conflict { field: &'static str },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub nickname: Option<String>,
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates an account.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Validation`] for a malformed email, short password or bad nickname
    /// - [`AuthError::Conflict`] when the email or nickname is taken
    async fn register(&self, registration: Registration) -> Result<Account, AuthError>;

    /// Verifies credentials and returns the (reconciled) account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails.
    async fn login(&self, email: &str, password: &str) -> Result<Account, AuthError>;

    async fn get_account(&self, id: UserId) -> Result<Account, AuthError>;
}
