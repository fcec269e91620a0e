//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::SecurityConfig;
use crate::db::repositories::user::{UserRepository, hash_password_blocking};
use crate::db::{Store, UniqueWrite};
use crate::domain::validation::{
    FieldErrors, validate_email, validate_nickname, validate_password,
};
use crate::domain::{UserId, timestamp_now};
use crate::models::Account;
use crate::services::auth_service::{AuthError, AuthService, Registration};
use crate::services::{bootstrap, nickname};

pub struct SeaOrmAuthService {
    store: Arc<Store>,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Arc<Store>, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    /// Reconciles the admin flag and returns the account as now stored.
    async fn reconciled(&self, account: Account) -> Result<Account, AuthError> {
        let outcome = bootstrap::reconcile_admin(&self.store).await?;

        if outcome.promoted == Some(account.id) {
            return Ok(Account {
                is_admin: true,
                ..account
            });
        }

        Ok(account)
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, registration: Registration) -> Result<Account, AuthError> {
        let mut errors = FieldErrors::new();

        let email = errors.take(validate_email(&registration.email));
        let password_ok = errors.take(validate_password(&registration.password)).is_some();
        let nickname = match registration
            .nickname
            .as_deref()
            .filter(|n| !n.trim().is_empty())
        {
            Some(raw) => errors.take(validate_nickname(raw)).map(Some),
            None => Some(None),
        };

        let (Some(email), true, Some(nickname)) = (email, password_ok, nickname) else {
            return Err(AuthError::Validation(errors.into_inner()));
        };

        let repo = self.store.user_repo();

        if repo.find_by_email(&email).await?.is_some() {
            return Err(AuthError::Conflict { field: "email" });
        }

        if let Some(nickname) = &nickname {
            if repo.nickname_taken(nickname, None).await? {
                return Err(AuthError::Conflict { field: "nickname" });
            }
        }

        let password_hash = hash_password_blocking(&registration.password, &self.security).await?;

        let account = match repo
            .create(&email, password_hash, nickname, &timestamp_now())
            .await?
        {
            UniqueWrite::Written(account) => account,
            // A concurrent registration took the email or nickname between the checks and the insert.
            UniqueWrite::Duplicate => return Err(AuthError::Conflict { field: "email" }),
        };

        info!(user_id = %account.id, "Account registered");
        self.reconciled(account).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        let Ok(email) = validate_email(email) else {
            return Err(AuthError::InvalidCredentials);
        };

        let Some((account, password_hash)) =
            self.store.user_repo().find_credentials(&email).await?
        else {
            debug!("Login for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !UserRepository::verify_password(password_hash, password).await? {
            debug!(user_id = %account.id, "Login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let account = nickname::ensure_nickname(&self.store, account).await?;
        self.reconciled(account).await
    }

    async fn get_account(&self, id: UserId) -> Result<Account, AuthError> {
        self.store
            .get_account(id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}
