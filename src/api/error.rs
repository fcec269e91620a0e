use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

use super::ApiResponse;
use crate::domain::validation::{FieldError, RuleViolation, codes};
use crate::services::{AuthError, ImportError, MovieError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ExternalApiError { service: String, message: String },

    ValidationError {
        message: String,
        field_errors: Vec<FieldError>,
    },

    BusinessRule(RuleViolation),

    Conflict { field: String, message: String },

    InternalError(String),

    Unauthorized(String),
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub category: &'static str,
    pub message: String,
    pub field_errors: Vec<FieldError>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::ExternalApiError { service, message } => {
                write!(f, "{service} error: {message}")
            }
            Self::ValidationError { message, .. } => write!(f, "Validation error: {message}"),
            Self::BusinessRule(rule) => write!(f, "Business rule violated: {}", rule.code),
            Self::Conflict { message, .. } => write!(f, "Conflict: {message}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError { .. } => StatusCode::BAD_REQUEST,
            Self::BusinessRule(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::ExternalApiError { .. } => StatusCode::BAD_GATEWAY,
            Self::DatabaseError(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    const fn category(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::ValidationError { .. } => "validation",
            Self::BusinessRule(_) => "business_rule",
            Self::Conflict { .. } => "conflict",
            Self::Unauthorized(_) => "unauthorized",
            Self::ExternalApiError { .. } => "external",
            Self::DatabaseError(_) | Self::InternalError(_) => "server",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let category = self.category();

        let (message, field_errors) = match self {
            Self::NotFound(msg) | Self::Unauthorized(msg) => (msg, Vec::new()),
            Self::ValidationError {
                message,
                field_errors,
            } => (message, field_errors),
            Self::BusinessRule(rule) => {
                let message = rule.message.clone();
                let field = FieldError::new("rating", rule.code, rule.message);
                (message, vec![field])
            }
            Self::Conflict { field, message } => {
                let field = FieldError::new(field, codes::ALREADY_TAKEN, message.clone());
                (message, vec![field])
            }
            Self::ExternalApiError { service, message } => {
                tracing::warn!("{service} API error: {message}");
                (format!("{service} service is unavailable"), Vec::new())
            }
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {msg}");
                ("A database error occurred".to_string(), Vec::new())
            }
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {msg}");
                ("An internal error occurred".to_string(), Vec::new())
            }
        };

        let body = ApiResponse::<()>::error(ErrorBody {
            status: status.as_u16(),
            category,
            message,
            field_errors,
        });
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(format!("{err:#}"))
    }
}

impl From<MovieError> for ApiError {
    fn from(err: MovieError) -> Self {
        match err {
            MovieError::Validation(field_errors) => Self::invalid_fields(field_errors),
            MovieError::BusinessRule(rule) => Self::BusinessRule(rule),
            MovieError::NotFound(id) => Self::not_found("Movie", id),
            MovieError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Validation(field_errors) => Self::invalid_fields(field_errors),
            ImportError::NotFound(id) => {
                Self::NotFound(format!("Movie {id} not found in the external catalog"))
            }
            ImportError::External(message) => Self::ExternalApiError {
                service: "TMDB".to_string(),
                message,
            },
            ImportError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized("Invalid credentials".to_string()),
            AuthError::UserNotFound => Self::Unauthorized("Not authenticated".to_string()),
            AuthError::Validation(field_errors) => Self::invalid_fields(field_errors),
            AuthError::Conflict { field } => Self::Conflict {
                field: field.to_string(),
                message: format!("This {field} is already registered"),
            },
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(format!("Invalid query string: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::validation(format!("Invalid path parameter: {}", rejection.body_text()))
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        Self::NotFound(format!("{resource} {id} not found"))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError {
            message: msg.into(),
            field_errors: Vec::new(),
        }
    }

    pub fn invalid_fields(field_errors: Vec<FieldError>) -> Self {
        let message = match field_errors.as_slice() {
            [only] => only.message.clone(),
            _ => format!("{} fields are invalid", field_errors.len()),
        };

        Self::ValidationError {
            message,
            field_errors,
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }
}
