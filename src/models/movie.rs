use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{MovieId, UserId};
use crate::entities::movies;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Movie {
    pub id: MovieId,
    pub owner_id: Option<UserId>,
    pub external_id: Option<String>,
    pub title: String,
    pub year: Option<i32>,
    pub genre: String,
    pub rating: i32,
    pub comment: String,
    pub watched: bool,
    pub favorite: bool,
    pub poster_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub last_watched_at: Option<String>,
}

impl From<movies::Model> for Movie {
    fn from(model: movies::Model) -> Self {
        Self {
            id: MovieId::new(model.id),
            owner_id: model.owner_id.map(UserId::new),
            external_id: model.external_id,
            title: model.title,
            year: model.year,
            genre: model.genre,
            rating: model.rating,
            comment: model.comment,
            watched: model.watched,
            favorite: model.favorite,
            poster_url: model.poster_url,
            created_at: model.created_at,
            updated_at: model.updated_at,
            last_watched_at: model.last_watched_at,
        }
    }
}

/// Input for a direct create. Omitted fields take their neutral value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewMovie {
    pub title: String,
    pub year: Option<i32>,
    pub genre: String,
    pub rating: i32,
    pub comment: String,
    pub watched: bool,
    pub favorite: bool,
    pub poster_url: Option<String>,
    pub external_id: Option<String>,
}

/// Partial update. `None` leaves the stored value alone; for the nullable
/// columns `Some(None)` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoviePatch {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "present")]
    pub year: Option<Option<i32>>,

    #[serde(default)]
    pub genre: Option<String>,

    #[serde(default)]
    pub rating: Option<i32>,

    #[serde(default)]
    pub comment: Option<String>,

    #[serde(default)]
    pub watched: Option<bool>,

    #[serde(default)]
    pub favorite: Option<bool>,

    #[serde(default, deserialize_with = "present")]
    pub poster_url: Option<Option<String>>,
}

impl MoviePatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.year.is_none()
            && self.genre.is_none()
            && self.rating.is_none()
            && self.comment.is_none()
            && self.watched.is_none()
            && self.favorite.is_none()
            && self.poster_url.is_none()
    }
}

/// Distinguishes an explicit `null` from a missing key.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieFilter {
    /// Substring matched against title, genre and year.
    pub q: Option<String>,
    pub watched: Option<bool>,
    pub favorite: Option<bool>,
}

/// Fully validated column values for one write. Produced by the lifecycle
/// planner, consumed by the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieRecord {
    pub external_id: Option<String>,
    pub title: String,
    pub year: Option<i32>,
    pub genre: String,
    pub rating: i32,
    pub comment: String,
    pub watched: bool,
    pub favorite: bool,
    pub poster_url: Option<String>,
    pub last_watched_at: Option<String>,
}
