//! Domain service for the owner-scoped movie catalog.
//!
//! Every operation takes the acting account; rows owned by anyone else are
//! reported as [`MovieError::NotFound`], exactly like rows that do not exist.

use thiserror::Error;

use crate::domain::validation::{FieldError, RuleViolation};
use crate::domain::{MovieId, UserId};
use crate::models::{Movie, MovieFilter, MoviePatch, NewMovie};

#[derive(Debug, Error)]
pub enum MovieError {
    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("Business rule violated: {}", .0.code)]
    BusinessRule(RuleViolation),

    #[error("Movie not found: {0}")]
    NotFound(MovieId),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for MovieError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for MovieError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

#[async_trait::async_trait]
pub trait MovieService: Send + Sync {
    /// Validates and stores a new movie owned by `owner`.
    ///
    /// # Errors
    ///
    /// - [`MovieError::Validation`] when a field is malformed, or when
    ///   `external_id` is already in the owner's catalog
    /// - [`MovieError::BusinessRule`] when `rating > 0` on an unwatched movie
    async fn create(&self, owner: UserId, draft: NewMovie) -> Result<Movie, MovieError>;

    /// Applies a partial update. A rejected update leaves the row untouched.
    ///
    /// # Errors
    ///
    /// - [`MovieError::Validation`] for an empty or malformed patch
    /// - [`MovieError::BusinessRule`] when the merged state breaks the rating rule
    /// - [`MovieError::NotFound`] when `owner` has no such movie
    async fn update(
        &self,
        owner: UserId,
        id: MovieId,
        patch: MoviePatch,
    ) -> Result<Movie, MovieError>;

    async fn set_favorite(
        &self,
        owner: UserId,
        id: MovieId,
        favorite: bool,
    ) -> Result<Movie, MovieError>;

    async fn delete(&self, owner: UserId, id: MovieId) -> Result<(), MovieError>;

    async fn get(&self, owner: UserId, id: MovieId) -> Result<Movie, MovieError>;

    async fn list(&self, owner: UserId, filter: MovieFilter) -> Result<Vec<Movie>, MovieError>;

    /// Watched movies, most recently watched first.
    async fn recent(&self, owner: UserId) -> Result<Vec<Movie>, MovieError>;

    /// Favorites, most recently touched first.
    async fn favorites(&self, owner: UserId) -> Result<Vec<Movie>, MovieError>;
}
