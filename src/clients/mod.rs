//! External movie metadata.
//!
//! The catalog only depends on [`MetadataProvider`]; [`tmdb::TmdbClient`] is
//! the production implementation and tests substitute their own.

pub mod tmdb;

use serde::Serialize;

/// Full metadata for one external id.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalMovie {
    pub external_id: String,
    pub title: String,
    pub year: Option<i32>,
    pub genres: Vec<String>,
    pub poster_url: Option<String>,
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalCandidate {
    pub external_id: String,
    pub title: String,
    pub year: Option<i32>,
    pub poster_url: Option<String>,

    #[serde(skip_serializing)]
    pub popularity: f64,
}

#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// `Ok(None)` when the provider has no such id. Transport and
    /// configuration problems are errors.
    async fn lookup(&self, external_id: &str) -> anyhow::Result<Option<ExternalMovie>>;

    async fn search(&self, query: &str) -> anyhow::Result<Vec<ExternalCandidate>>;
}

/// Prefers the first candidate released in `year`, otherwise the most popular.
#[must_use]
pub fn pick_best(candidates: &[ExternalCandidate], year: Option<i32>) -> Option<&ExternalCandidate> {
    year.and_then(|year| candidates.iter().find(|c| c.year == Some(year)))
        .or_else(|| {
            candidates
                .iter()
                .max_by(|a, b| a.popularity.total_cmp(&b.popularity))
        })
}
