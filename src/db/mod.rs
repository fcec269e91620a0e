use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::domain::{MovieId, UserId};
use crate::models::{Account, Movie, MovieFilter};

pub mod failure;
pub mod migrator;
pub mod repositories;

pub use failure::FailureKind;
pub use migrator::{MigrationError, MigrationReport};
pub use repositories::movie::UpdateOutcome;
pub use repositories::UniqueWrite;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    /// Connects with the default pool bounds and brings the schema up to date.
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        let store = Self::connect(db_url, max_connections, min_connections).await?;
        store.migrate().await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(store)
    }

    /// Opens the pool without touching the schema.
    pub async fn connect(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        if !db_url.contains(":memory:") {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);

            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)
                    .with_context(|| format!("Failed to create database file: {path_str}"))?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt)
            .await
            .with_context(|| format!("Failed to connect to database: {db_url}"))?;

        Ok(Self { conn })
    }

    pub async fn migrate(&self) -> Result<MigrationReport> {
        Ok(migrator::run(&self.conn).await?)
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    #[must_use]
    pub fn movie_repo(&self) -> repositories::movie::MovieRepository {
        repositories::movie::MovieRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    // ========== Movie Repository Methods ==========

    pub async fn get_movie(&self, owner: UserId, id: MovieId) -> Result<Option<Movie>> {
        self.movie_repo().find_scoped(owner, id).await
    }

    pub async fn list_movies(&self, owner: UserId, filter: &MovieFilter) -> Result<Vec<Movie>> {
        self.movie_repo().list(owner, filter).await
    }

    pub async fn recent_movies(&self, owner: UserId, limit: u64) -> Result<Vec<Movie>> {
        self.movie_repo().recent(owner, limit).await
    }

    pub async fn favorite_movies(&self, owner: UserId, limit: u64) -> Result<Vec<Movie>> {
        self.movie_repo().favorites(owner, limit).await
    }

    // ========== User Repository Methods ==========

    pub async fn get_account(&self, id: UserId) -> Result<Option<Account>> {
        self.user_repo().find_by_id(id).await
    }

    pub async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        self.user_repo().find_by_email(email).await
    }
}
