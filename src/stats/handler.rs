//! Stats aggregation endpoint.
//!
//! `POST /api/write-stats` with `{type, platform?, fingerprint?, date?}`.
//!
//! Every accepted event is a full read-modify-write of one gist file. There
//! is no version check between the read and the write: two concurrent
//! invocations working from the same snapshot both succeed and the later
//! write wins, dropping the other increment. A failed write leaves the gist
//! untouched and the event is lost.

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;

use crate::github::GithubError;
use crate::http::request::RequestIdExt;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::stats::document::StatsDocument;
use crate::stats::event::StatsEvent;

/// The fixed CORS header set sent with stats responses.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    origin: HeaderValue,
}

impl CorsPolicy {
    pub fn new(origin: &str) -> Result<Self, header::InvalidHeaderValue> {
        Ok(Self {
            origin: HeaderValue::from_str(origin)?,
        })
    }

    pub fn headers(&self) -> [(HeaderName, HeaderValue); 3] {
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, self.origin.clone()),
            (
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("POST, OPTIONS"),
            ),
            (
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static("Content-Type"),
            ),
        ]
    }
}

#[derive(Serialize)]
struct StatsResponse<'a> {
    success: bool,
    stats: &'a StatsDocument,
}

/// Route entry point; accepts any method so preflight and 405 are ours.
pub async fn stats_handler(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let start_time = Instant::now();
    let request_id = headers.request_id();

    let response = if method == Method::OPTIONS {
        (StatusCode::OK, state.cors.headers()).into_response()
    } else if method != Method::POST {
        ApiError::MethodNotAllowed.into_response()
    } else {
        let outcome = match record_event(&state, body, &request_id).await {
            Ok(stats) => Json(StatsResponse {
                success: true,
                stats: &stats,
            })
            .into_response(),
            Err(e) => {
                tracing::error!(request_id = %request_id, error = %e, "Error updating stats");
                e.into_response()
            }
        };
        (state.cors.headers(), outcome).into_response()
    };

    metrics::record_request("stats", response.status().as_u16(), start_time);
    response
}

async fn record_event(
    state: &AppState,
    body: Body,
    request_id: &str,
) -> Result<StatsDocument, ApiError> {
    let (Some(token), Some(gist_id)) = (state.config.token(), state.config.gist_id()) else {
        return Err(ApiError::ConfigurationMissing);
    };

    let bytes = axum::body::to_bytes(body, state.config.server.max_body_bytes)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to read request body: {}", e)))?;
    let event = StatsEvent::from_body(&bytes);

    let gist = state.github.fetch_gist(token, gist_id).await?;
    let (file_name, file) = gist.file(state.config.stats.file_name.as_deref())?;
    let content = match file.content {
        Some(content) if !file.truncated => content,
        _ => return Err(GithubError::MissingContent(file_name).into()),
    };

    let mut stats: StatsDocument = serde_json::from_str(&content)?;
    let outcome = stats.apply(&event);
    stats.touch(Utc::now());

    let updated = stats.to_content()?;
    state
        .github
        .update_gist_file(token, gist_id, &file_name, &updated)
        .await?;

    metrics::record_stats_event(event.kind());
    tracing::info!(
        request_id = %request_id,
        event = event.kind(),
        outcome = ?outcome,
        file = %file_name,
        "Stats updated"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_headers() {
        let cors = CorsPolicy::new("https://example.test").unwrap();
        let headers = cors.headers();
        assert_eq!(headers[0].0, header::ACCESS_CONTROL_ALLOW_ORIGIN);
        assert_eq!(headers[0].1, "https://example.test");
        assert_eq!(headers[1].1, "POST, OPTIONS");
        assert_eq!(headers[2].1, "Content-Type");
    }

    #[test]
    fn test_invalid_origin() {
        assert!(CorsPolicy::new("bad\norigin").is_err());
    }
}
