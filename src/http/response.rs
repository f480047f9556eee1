//! Error responses.
//!
//! # Responsibilities
//! - One error type for both handlers
//! - Map each failure to its status code
//! - Render the `{"error": ...}` JSON body clients expect
//!
//! # Design Decisions
//! - Misconfiguration never says which secret is missing
//! - Upstream 404 on a release is the only upstream status surfaced as-is;
//!   every other upstream failure becomes a 500 naming the upstream status

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::github::GithubError;

/// Failures a handler can answer with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Server configuration missing")]
    ConfigurationMissing,

    #[error("Missing required parameters: version, platform, arch")]
    MissingParameters,

    #[error("Invalid platform or architecture")]
    InvalidTarget,

    #[error("Asset not found")]
    AssetNotFound { available: Vec<String> },

    #[error(transparent)]
    Github(#[from] GithubError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::MissingParameters | ApiError::InvalidTarget => StatusCode::BAD_REQUEST,
            ApiError::AssetNotFound { .. } | ApiError::Github(GithubError::ReleaseNotFound) => {
                StatusCode::NOT_FOUND
            }
            ApiError::ConfigurationMissing
            | ApiError::Github(_)
            | ApiError::Json(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::AssetNotFound { available } => json!({
                "error": self.to_string(),
                "available": available,
            }),
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
