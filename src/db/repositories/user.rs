use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tokio::task;
use tracing::{debug, info};

use super::UniqueWrite;
use crate::config::SecurityConfig;
use crate::db::failure::FailureKind;
use crate::domain::UserId;
use crate::entities::{movies, prelude::*, users};
use crate::models::Account;

/// What a bootstrap pass changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Promotion {
    pub account_id: UserId,
    pub movies_adopted: u64,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Inserts a new, non-admin account. A duplicate email or nickname is
    /// reported as [`UniqueWrite::Duplicate`].
    pub async fn create(
        &self,
        email: &str,
        password_hash: String,
        nickname: Option<String>,
        now: &str,
    ) -> Result<UniqueWrite<Account>> {
        let active = users::ActiveModel {
            email: Set(email.to_string()),
            password_hash: Set(password_hash),
            nickname: Set(nickname),
            is_admin: Set(false),
            created_at: Set(now.to_string()),
            ..Default::default()
        };

        match active.insert(&self.conn).await {
            Ok(model) => {
                info!(user_id = model.id, "Created account");
                Ok(UniqueWrite::Written(Account::from(model)))
            }
            Err(err) if FailureKind::classify(&err) == FailureKind::UniqueViolation => {
                Ok(UniqueWrite::Duplicate)
            }
            Err(err) => Err(err).context("Failed to insert account"),
        }
    }

    pub async fn find_by_id(&self, id: UserId) -> Result<Option<Account>> {
        let user = Users::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(Account::from))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(Account::from))
    }

    /// Account together with its password hash, for login.
    pub async fn find_credentials(&self, email: &str) -> Result<Option<(Account, String)>> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(|u| {
            let password_hash = u.password_hash.clone();
            (Account::from(u), password_hash)
        }))
    }

    /// True when another account (not `exclude`) already holds `nickname`.
    pub async fn nickname_taken(&self, nickname: &str, exclude: Option<UserId>) -> Result<bool> {
        let mut query = Users::find().filter(users::Column::Nickname.eq(nickname));

        if let Some(own) = exclude {
            query = query.filter(users::Column::Id.ne(own.value()));
        }

        let count = query
            .count(&self.conn)
            .await
            .context("Failed to probe nickname")?;

        Ok(count > 0)
    }

    /// Writes `nickname`. Losing a race on the unique index yields
    /// [`UniqueWrite::Duplicate`].
    pub async fn set_nickname(&self, id: UserId, nickname: &str) -> Result<UniqueWrite<()>> {
        let result = Users::update_many()
            .col_expr(users::Column::Nickname, Expr::value(nickname))
            .filter(users::Column::Id.eq(id.value()))
            .exec(&self.conn)
            .await;

        match result {
            Ok(_) => Ok(UniqueWrite::Written(())),
            Err(err) if FailureKind::classify(&err) == FailureKind::UniqueViolation => {
                debug!(user_id = %id, nickname, "Nickname claimed concurrently");
                Ok(UniqueWrite::Duplicate)
            }
            Err(err) => Err(err).context("Failed to store nickname"),
        }
    }

    /// When no admin exists, promotes the lowest-id account and hands it
    /// every movie without an owner. Both writes share one transaction.
    pub async fn promote_first_admin(&self) -> Result<Option<Promotion>> {
        let txn = self.conn.begin().await?;

        let admin_exists = Users::find()
            .filter(users::Column::IsAdmin.eq(true))
            .one(&txn)
            .await
            .context("Failed to query admin account")?
            .is_some();

        if admin_exists {
            return Ok(None);
        }

        let Some(first) = Users::find()
            .order_by_asc(users::Column::Id)
            .one(&txn)
            .await
            .context("Failed to query first account")?
        else {
            return Ok(None);
        };

        Users::update_many()
            .col_expr(users::Column::IsAdmin, Expr::value(true))
            .filter(users::Column::Id.eq(first.id))
            .exec(&txn)
            .await
            .context("Failed to promote admin")?;

        let adopted = Movies::update_many()
            .col_expr(movies::Column::OwnerId, Expr::value(first.id))
            .filter(movies::Column::OwnerId.is_null())
            .exec(&txn)
            .await
            .context("Failed to assign orphaned movies")?;

        txn.commit().await?;

        Ok(Some(Promotion {
            account_id: UserId::new(first.id),
            movies_adopted: adopted.rows_affected,
        }))
    }

    /// Runs Argon2 verification on the blocking pool.
    pub async fn verify_password(password_hash: String, password: &str) -> Result<bool> {
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            Ok::<bool, anyhow::Error>(
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        Ok(is_valid)
    }
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses the library defaults.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// [`hash_password`] on the blocking pool.
pub async fn hash_password_blocking(password: &str, config: &SecurityConfig) -> Result<String> {
    let password = password.to_string();
    let config = config.clone();

    task::spawn_blocking(move || hash_password(&password, Some(&config)))
        .await
        .context("Password hashing task panicked")?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_uses_configured_params() {
        let config = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        };

        let hash = hash_password("correct horse", Some(&config)).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("m=1024,t=1,p=1"));
    }

    #[tokio::test]
    async fn test_verify_roundtrip() {
        let config = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        };
        let hash = hash_password("correct horse", Some(&config)).unwrap();

        assert!(
            UserRepository::verify_password(hash.clone(), "correct horse")
                .await
                .unwrap()
        );
        assert!(
            !UserRepository::verify_password(hash, "wrong horse")
                .await
                .unwrap()
        );
    }
}
