use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::validate_movie_id;
use super::{ApiError, ApiResponse, AppState, FavoriteRequest};
use crate::models::{Movie, MovieFilter, MoviePatch, NewMovie};

/// GET /movies?q=&watched=&favorite=
pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(owner)): Extension<CurrentUser>,
    filter: Result<Query<MovieFilter>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Movie>>>, ApiError> {
    let Query(filter) = filter?;
    let movies = state.movie_service().list(owner, filter).await?;
    Ok(Json(ApiResponse::success(movies)))
}

/// GET /movies/recent
pub async fn recent_movies(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(owner)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<Movie>>>, ApiError> {
    let movies = state.movie_service().recent(owner).await?;
    Ok(Json(ApiResponse::success(movies)))
}

/// GET /movies/favorites
pub async fn favorite_movies(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(owner)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<Movie>>>, ApiError> {
    let movies = state.movie_service().favorites(owner).await?;
    Ok(Json(ApiResponse::success(movies)))
}

/// GET /movies/{id}
pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(owner)): Extension<CurrentUser>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<ApiResponse<Movie>>, ApiError> {
    let id = validate_movie_id(id?.0)?;
    let movie = state.movie_service().get(owner, id).await?;
    Ok(Json(ApiResponse::success(movie)))
}

/// POST /movies
pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(owner)): Extension<CurrentUser>,
    payload: Result<Json<NewMovie>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(draft) = payload?;
    let movie = state.movie_service().create(owner, draft).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(movie))))
}

/// PUT /movies/{id}
/// Partial update: absent fields keep their stored value.
pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(owner)): Extension<CurrentUser>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<MoviePatch>, JsonRejection>,
) -> Result<Json<ApiResponse<Movie>>, ApiError> {
    let id = validate_movie_id(id?.0)?;
    let Json(patch) = payload?;
    let movie = state.movie_service().update(owner, id, patch).await?;
    Ok(Json(ApiResponse::success(movie)))
}

/// PUT /movies/{id}/favorite
pub async fn set_favorite(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(owner)): Extension<CurrentUser>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<FavoriteRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Movie>>, ApiError> {
    let id = validate_movie_id(id?.0)?;
    let Json(request) = payload?;
    let movie = state
        .movie_service()
        .set_favorite(owner, id, request.favorite)
        .await?;
    Ok(Json(ApiResponse::success(movie)))
}

/// DELETE /movies/{id}
pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(owner)): Extension<CurrentUser>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = validate_movie_id(id?.0)?;
    state.movie_service().delete(owner, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
