//! Poster back-fill for movies added without artwork.

use anyhow::Result;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::clients::{MetadataProvider, pick_best};
use crate::db::Store;
use crate::domain::timestamp_now;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PosterReport {
    pub updated: usize,
    pub skipped: usize,
}

/// Searches the provider by title for every movie without a poster. The
/// external id is only filled in when the row has none and the owner has not
/// already imported that id.
pub async fn backfill_posters(
    store: &Store,
    provider: &dyn MetadataProvider,
    delay: Duration,
) -> Result<PosterReport> {
    let repo = store.movie_repo();
    let pending = repo.missing_posters().await?;
    let mut report = PosterReport::default();

    info!(count = pending.len(), "Looking up posters");

    for (index, movie) in pending.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(delay).await;
        }

        let candidates = match provider.search(&movie.title).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(movie_id = %movie.id, title = %movie.title, "Poster lookup failed: {e:#}");
                report.skipped += 1;
                continue;
            }
        };

        let Some((best, poster_url)) = pick_best(&candidates, movie.year)
            .and_then(|c| c.poster_url.as_deref().map(|url| (c, url)))
        else {
            debug!(movie_id = %movie.id, title = %movie.title, "No poster found");
            report.skipped += 1;
            continue;
        };

        let external_id = match (movie.external_id.as_ref(), movie.owner_id) {
            (None, Some(owner)) => repo
                .find_by_external(owner, &best.external_id)
                .await?
                .is_none()
                .then_some(best.external_id.as_str()),
            _ => None,
        };

        repo.attach_poster(movie.id, poster_url, external_id, &timestamp_now())
            .await?;

        debug!(movie_id = %movie.id, title = %movie.title, "Poster attached");
        report.updated += 1;
    }

    info!(
        updated = report.updated,
        skipped = report.skipped,
        "Poster back-fill finished"
    );

    Ok(report)
}
