use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{ExternalCandidate, ExternalMovie, MetadataProvider};
use crate::config::TmdbConfig;

#[derive(Debug, Deserialize)]
struct MovieDetails {
    id: i64,
    title: Option<String>,
    original_title: Option<String>,
    release_date: Option<String>,
    poster_path: Option<String>,
    #[serde(default)]
    genres: Vec<Genre>,
}

#[derive(Debug, Deserialize)]
struct Genre {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: i64,
    title: Option<String>,
    original_title: Option<String>,
    release_date: Option<String>,
    poster_path: Option<String>,
    #[serde(default)]
    popularity: f64,
}

#[derive(Debug, Deserialize)]
struct FindResponse {
    #[serde(default)]
    movie_results: Vec<FindHit>,
}

#[derive(Debug, Deserialize)]
struct FindHit {
    id: i64,
}

/// How an external id addresses TMDB.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ExternalRef {
    Tmdb(i64),
    Imdb(String),
}

impl ExternalRef {
    fn parse(external_id: &str) -> Option<Self> {
        let id = external_id.trim();

        if let Ok(numeric) = id.parse::<i64>() {
            return (numeric > 0).then_some(Self::Tmdb(numeric));
        }

        let digits = id.strip_prefix("tt")?;
        (!digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
            .then(|| Self::Imdb(id.to_string()))
    }
}

/// Year from a `YYYY-MM-DD` release date.
fn release_year(date: Option<&str>) -> Option<i32> {
    date.and_then(|d| d.get(..4)).and_then(|y| y.parse().ok())
}

fn pick_title(title: Option<String>, original: Option<String>) -> String {
    title
        .filter(|t| !t.trim().is_empty())
        .or(original)
        .unwrap_or_default()
}

#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    config: TmdbConfig,
}

impl TmdbClient {
    pub fn new(config: TmdbConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(concat!("cinelog/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;

        Ok(Self { client, config })
    }

    fn api_key(&self) -> Result<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("TMDB API key is missing"))
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self.config.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}{path}"))
            .with_context(|| format!("Invalid TMDB URL: {base}{path}"))?;

        url.query_pairs_mut()
            .append_pair("api_key", self.api_key()?)
            .append_pair("language", &self.config.language);

        Ok(url)
    }

    fn poster(&self, poster_path: Option<String>) -> Option<String> {
        poster_path
            .filter(|p| !p.is_empty())
            .map(|p| format!("{}{p}", self.config.image_base_url.trim_end_matches('/')))
    }

    /// `Ok(None)` on 404.
    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: Url) -> Result<Option<T>> {
        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("TMDB API error: {status} - {body}"));
        }

        Ok(Some(response.json().await?))
    }

    async fn resolve_imdb(&self, imdb_id: &str) -> Result<Option<i64>> {
        let mut url = self.endpoint(&format!("/find/{imdb_id}"))?;
        url.query_pairs_mut().append_pair("external_source", "imdb_id");

        let found: Option<FindResponse> = self.get_json(url).await?;
        Ok(found.and_then(|f| f.movie_results.first().map(|hit| hit.id)))
    }

    async fn details(&self, tmdb_id: i64) -> Result<Option<MovieDetails>> {
        let url = self.endpoint(&format!("/movie/{tmdb_id}"))?;
        self.get_json(url).await
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbClient {
    async fn lookup(&self, external_id: &str) -> Result<Option<ExternalMovie>> {
        self.api_key()?;

        let tmdb_id = match ExternalRef::parse(external_id) {
            Some(ExternalRef::Tmdb(id)) => Some(id),
            Some(ExternalRef::Imdb(imdb_id)) => self.resolve_imdb(&imdb_id).await?,
            None => None,
        };

        let Some(tmdb_id) = tmdb_id else {
            debug!(external_id, "External id does not resolve to a TMDB movie");
            return Ok(None);
        };

        let Some(details) = self.details(tmdb_id).await? else {
            return Ok(None);
        };

        debug!(external_id, tmdb_id = details.id, "Fetched TMDB details");

        Ok(Some(ExternalMovie {
            external_id: external_id.trim().to_string(),
            title: pick_title(details.title, details.original_title),
            year: release_year(details.release_date.as_deref()),
            genres: details.genres.into_iter().map(|g| g.name).collect(),
            poster_url: self.poster(details.poster_path),
        }))
    }

    async fn search(&self, query: &str) -> Result<Vec<ExternalCandidate>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut url = self.endpoint("/search/movie")?;
        url.query_pairs_mut().append_pair("query", query);

        let response: Option<SearchResponse> = self.get_json(url).await?;

        Ok(response
            .map(|r| r.results)
            .unwrap_or_default()
            .into_iter()
            .take(self.config.search_limit)
            .map(|hit| ExternalCandidate {
                external_id: hit.id.to_string(),
                year: release_year(hit.release_date.as_deref()),
                title: pick_title(hit.title, hit.original_title),
                poster_url: self.poster(hit.poster_path),
                popularity: hit.popularity,
            })
            .collect())
    }
}
