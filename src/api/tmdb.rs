use axum::{
    Extension, Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::{ApiError, ApiResponse, AppState, ImportRequest, SearchQuery};
use crate::clients::ExternalCandidate;

/// GET /tmdb/search?q=
pub async fn search(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<ExternalCandidate>>>, ApiError> {
    let Query(query) = query?;
    let candidates = state.import_service().search(&query.q).await?;
    Ok(Json(ApiResponse::success(candidates)))
}

/// POST /tmdb/add
/// 201 when a row was created, 200 when the owner already had this movie.
pub async fn add(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(owner)): Extension<CurrentUser>,
    payload: Result<Json<ImportRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;

    let outcome = state
        .import_service()
        .import_external(owner, &request.external_id, request.watched, request.favorite)
        .await?;

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(ApiResponse::success(outcome))))
}
