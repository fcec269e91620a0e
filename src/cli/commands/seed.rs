//! Seed command handler

use anyhow::Context;
use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::domain::validation::validate_email;
use crate::models::MovieFilter;
use crate::services::{SeaOrmMovieService, seed_catalog};

pub async fn cmd_seed(config: &Config, email: &str) -> anyhow::Result<()> {
    let email = validate_email(email).map_err(|e| anyhow::anyhow!(e.message))?;

    let store = Arc::new(
        Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?,
    );

    let account = store
        .get_account_by_email(&email)
        .await?
        .with_context(|| format!("No account registered with {email}"))?;

    let existing: Vec<String> = store
        .list_movies(account.id, &MovieFilter::default())
        .await?
        .into_iter()
        .map(|movie| movie.title)
        .collect();

    let movies = SeaOrmMovieService::new(store);
    let report = seed_catalog(&movies, account.id, &existing).await?;

    println!(
        "Seeded {}: {} inserted, {} already present",
        email, report.inserted, report.skipped
    );

    Ok(())
}
