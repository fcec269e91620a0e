//! Posters command handler

use crate::clients::tmdb::TmdbClient;
use crate::config::Config;
use crate::constants::intervals::POSTER_LOOKUP_DELAY;
use crate::db::Store;
use crate::services::backfill_posters;

pub async fn cmd_posters(config: &Config) -> anyhow::Result<()> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let tmdb = TmdbClient::new(config.tmdb.clone())?;
    let report = backfill_posters(&store, &tmdb, POSTER_LOOKUP_DELAY).await?;

    println!(
        "Posters: {} updated, {} without a match",
        report.updated, report.skipped
    );

    Ok(())
}
