//! `SeaORM` implementation of the `MovieService` trait.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::constants::limits;
use crate::db::{Store, UniqueWrite, UpdateOutcome};
use crate::domain::validation::{FieldError, codes};
use crate::domain::{MovieId, UserId, timestamp};
use crate::models::{Movie, MovieFilter, MoviePatch, NewMovie};
use crate::services::lifecycle::{plan_create, plan_update};
use crate::services::movie_service::{MovieError, MovieService};

pub struct SeaOrmMovieService {
    store: Arc<Store>,
}

impl SeaOrmMovieService {
    #[must_use]
    pub const fn new(store: Arc<Store>) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl MovieService for SeaOrmMovieService {
    async fn create(&self, owner: UserId, draft: NewMovie) -> Result<Movie, MovieError> {
        let now = Utc::now();
        let record = plan_create(draft, now)?;

        let movie = match self
            .store
            .movie_repo()
            .insert_unique(owner, &record, &timestamp(now))
            .await?
        {
            UniqueWrite::Written(movie) => movie,
            UniqueWrite::Duplicate => {
                return Err(MovieError::Validation(vec![FieldError::new(
                    "external_id",
                    codes::ALREADY_TAKEN,
                    "This movie is already in your catalog",
                )]));
            }
        };

        info!(movie_id = %movie.id, owner_id = %owner, "Movie created");
        Ok(movie)
    }

    async fn update(
        &self,
        owner: UserId,
        id: MovieId,
        patch: MoviePatch,
    ) -> Result<Movie, MovieError> {
        let now = Utc::now();

        let outcome = self
            .store
            .movie_repo()
            .update_scoped(owner, id, &timestamp(now), |previous| {
                plan_update(previous, &patch, now)
            })
            .await?;

        match outcome {
            UpdateOutcome::Updated(movie) => {
                debug!(movie_id = %id, owner_id = %owner, "Movie updated");
                Ok(movie)
            }
            UpdateOutcome::NotFound => Err(MovieError::NotFound(id)),
            UpdateOutcome::Rejected(err) => Err(err),
        }
    }

    async fn set_favorite(
        &self,
        owner: UserId,
        id: MovieId,
        favorite: bool,
    ) -> Result<Movie, MovieError> {
        self.store
            .movie_repo()
            .set_favorite(owner, id, favorite, &timestamp(Utc::now()))
            .await?
            .ok_or(MovieError::NotFound(id))
    }

    async fn delete(&self, owner: UserId, id: MovieId) -> Result<(), MovieError> {
        if self.store.movie_repo().delete_scoped(owner, id).await? {
            Ok(())
        } else {
            Err(MovieError::NotFound(id))
        }
    }

    async fn get(&self, owner: UserId, id: MovieId) -> Result<Movie, MovieError> {
        self.store
            .get_movie(owner, id)
            .await?
            .ok_or(MovieError::NotFound(id))
    }

    async fn list(&self, owner: UserId, filter: MovieFilter) -> Result<Vec<Movie>, MovieError> {
        Ok(self.store.list_movies(owner, &filter).await?)
    }

    async fn recent(&self, owner: UserId) -> Result<Vec<Movie>, MovieError> {
        Ok(self
            .store
            .recent_movies(owner, limits::RECENT_LIMIT)
            .await?)
    }

    async fn favorites(&self, owner: UserId) -> Result<Vec<Movie>, MovieError> {
        Ok(self
            .store
            .favorite_movies(owner, limits::FAVORITES_LIMIT)
            .await?)
    }
}
