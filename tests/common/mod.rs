#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use cinelog::clients::{ExternalCandidate, ExternalMovie, MetadataProvider};
use cinelog::config::Config;
use cinelog::db::Store;
use cinelog::domain::{UserId, timestamp_now};
use cinelog::models::Account;
use tokio::sync::Barrier;
use uuid::Uuid;

/// A fresh SQLite file under the temp dir.
pub fn temp_db_url() -> String {
    let path: PathBuf = std::env::temp_dir().join(format!("cinelog-test-{}.db", Uuid::new_v4()));
    format!("sqlite://{}?mode=rwc", path.display())
}

/// Defaults with a throwaway database and cheap Argon2 parameters.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_path = temp_db_url();
    config.server.secure_cookies = false;
    config.server.public_dir = None;
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config.security.argon2_parallelism = 1;
    config
}

pub async fn migrated_store() -> Arc<Store> {
    Arc::new(Store::new(&temp_db_url()).await.unwrap())
}

/// Inserts an account directly; the hash is never verified by these tests.
pub async fn create_account(store: &Store, email: &str, nickname: Option<&str>) -> Account {
    store
        .user_repo()
        .create(
            email,
            "not-a-real-hash".to_string(),
            nickname.map(str::to_string),
            &timestamp_now(),
        )
        .await
        .unwrap()
        .written()
        .unwrap()
}

pub async fn create_user_id(store: &Store, email: &str) -> UserId {
    create_account(store, email, None).await.id
}

/// In-memory catalog. With a barrier set, every `lookup` waits until all
/// parties have reached it, so concurrent imports pass the existence check
/// together.
pub struct FakeProvider {
    pub movies: Vec<ExternalMovie>,
    pub barrier: Option<Arc<Barrier>>,
    pub fail: bool,
}

impl FakeProvider {
    pub fn with_movies(movies: Vec<ExternalMovie>) -> Self {
        Self {
            movies,
            barrier: None,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            movies: Vec::new(),
            barrier: None,
            fail: true,
        }
    }
}

pub fn external_movie(external_id: &str, title: &str, year: Option<i32>) -> ExternalMovie {
    ExternalMovie {
        external_id: external_id.to_string(),
        title: title.to_string(),
        year,
        genres: vec!["Drama".to_string(), "Crime".to_string()],
        poster_url: Some(format!("https://img.example/{external_id}.jpg")),
    }
}

#[async_trait]
impl MetadataProvider for FakeProvider {
    async fn lookup(&self, external_id: &str) -> anyhow::Result<Option<ExternalMovie>> {
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }

        if self.fail {
            anyhow::bail!("provider unreachable");
        }

        Ok(self
            .movies
            .iter()
            .find(|m| m.external_id == external_id)
            .cloned())
    }

    async fn search(&self, query: &str) -> anyhow::Result<Vec<ExternalCandidate>> {
        if self.fail {
            anyhow::bail!("provider unreachable");
        }

        let needle = query.to_lowercase();
        Ok(self
            .movies
            .iter()
            .filter(|m| m.title.to_lowercase().contains(&needle))
            .map(|m| ExternalCandidate {
                external_id: m.external_id.clone(),
                title: m.title.clone(),
                year: m.year,
                poster_url: m.poster_url.clone(),
                popularity: 1.0,
            })
            .collect())
    }
}
