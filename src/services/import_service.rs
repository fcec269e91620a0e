//! Domain service for importing movies from the external catalog.
//!
//! Importing is create-or-return: an id the owner already imported comes back
//! unchanged, and two concurrent imports of the same id end with one row that
//! both callers receive.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::clients::{ExternalCandidate, ExternalMovie};
use crate::constants::movie;
use crate::domain::validation::{FieldError, normalize_poster_url, validate_year};
use crate::domain::{UserId, timestamp};
use crate::models::{Movie, MovieRecord};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("Not found in external catalog: {0}")]
    NotFound(String),

    #[error("External catalog error: {0}")]
    External(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for ImportError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ImportError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportOutcome {
    pub movie: Movie,

    /// False when an existing row (possibly a concurrent winner) was returned.
    pub created: bool,
}

#[async_trait::async_trait]
pub trait ImportService: Send + Sync {
    /// Imports `external_id` into the owner's catalog.
    ///
    /// # Errors
    ///
    /// - [`ImportError::Validation`] for a blank id
    /// - [`ImportError::NotFound`] when the provider does not know the id
    /// - [`ImportError::External`] when the provider cannot be reached
    /// - [`ImportError::Database`] for any storage failure other than losing the race
    async fn import_external(
        &self,
        owner: UserId,
        external_id: &str,
        watched: bool,
        favorite: bool,
    ) -> Result<ImportOutcome, ImportError>;

    /// Provider search; a blank query yields no candidates.
    async fn search(&self, query: &str) -> Result<Vec<ExternalCandidate>, ImportError>;
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Turns provider metadata into a storable row: rating 0, empty comment,
/// values that would fail validation dropped or shortened.
#[must_use]
pub fn metadata_record(
    metadata: &ExternalMovie,
    watched: bool,
    favorite: bool,
    now: DateTime<Utc>,
) -> MovieRecord {
    let title = truncate_chars(metadata.title.trim(), movie::TITLE_MAX_CHARS);
    let title = if title.is_empty() {
        metadata.external_id.clone()
    } else {
        title
    };

    let genre = truncate_chars(&metadata.genres.join(", "), movie::GENRE_MAX_CHARS);

    MovieRecord {
        external_id: Some(metadata.external_id.clone()),
        title,
        year: metadata
            .year
            .and_then(|y| validate_year(y, now.year()).ok()),
        genre: genre.trim().to_string(),
        rating: 0,
        comment: String::new(),
        watched,
        favorite,
        poster_url: normalize_poster_url(metadata.poster_url.as_deref())
            .ok()
            .flatten(),
        last_watched_at: watched.then(|| timestamp(now)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap()
    }

    fn metadata() -> ExternalMovie {
        ExternalMovie {
            external_id: "603".to_string(),
            title: "  The Matrix ".to_string(),
            year: Some(1999),
            genres: vec!["Action".to_string(), "Science Fiction".to_string()],
            poster_url: Some("https://image.tmdb.org/t/p/w500/m.jpg".to_string()),
        }
    }

    #[test]
    fn test_metadata_is_normalised() {
        let record = metadata_record(&metadata(), false, true, clock());

        assert_eq!(record.title, "The Matrix");
        assert_eq!(record.genre, "Action, Science Fiction");
        assert_eq!(record.year, Some(1999));
        assert_eq!(record.rating, 0);
        assert_eq!(record.comment, "");
        assert!(record.favorite);
        assert!(record.last_watched_at.is_none());
        assert_eq!(record.external_id.as_deref(), Some("603"));
    }

    #[test]
    fn test_watched_import_stamps_last_watched() {
        let record = metadata_record(&metadata(), true, false, clock());
        assert_eq!(record.last_watched_at, Some(timestamp(clock())));
    }

    #[test]
    fn test_invalid_values_are_dropped() {
        let mut meta = metadata();
        meta.year = Some(1500);
        meta.poster_url = Some("/relative.jpg".to_string());
        meta.title = "x".repeat(250);

        let record = metadata_record(&meta, false, false, clock());
        assert_eq!(record.year, None);
        assert_eq!(record.poster_url, None);
        assert_eq!(record.title.chars().count(), movie::TITLE_MAX_CHARS);
    }

    #[test]
    fn test_blank_title_falls_back_to_id() {
        let mut meta = metadata();
        meta.title = "   ".to_string();
        assert_eq!(metadata_record(&meta, false, false, clock()).title, "603");
    }
}
