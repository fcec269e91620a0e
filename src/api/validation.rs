use super::ApiError;
use crate::domain::MovieId;

pub fn validate_movie_id(id: i32) -> Result<MovieId, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid movie ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(MovieId::new(id))
}
