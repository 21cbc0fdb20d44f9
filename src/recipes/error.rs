//! Request-boundary error type. Every failure becomes `{"error": message}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info_span};
use utoipa::ToSchema;

use super::handlers::auth::RefreshError;

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Not logged in")]
    NotAuthorized,
    #[error("Recipe not found")]
    NotFound,
    #[error(transparent)]
    Refresh(#[from] RefreshError),
    #[error("Internal server error")]
    Storage(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(err)
    }
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::NotAuthorized => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Refresh(RefreshError::InvalidToken) => StatusCode::UNAUTHORIZED,
            Self::Refresh(RefreshError::NotYetExpiring) => StatusCode::BAD_REQUEST,
            Self::Refresh(RefreshError::Signing(_)) | Self::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let _respond = info_span!("respond").entered();
        match &self {
            Self::Storage(err) => error!("Request failed: {err:#}"),
            Self::Refresh(RefreshError::Signing(err)) => error!("Failed to sign token: {err}"),
            _ => {}
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
