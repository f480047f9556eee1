//! Release download proxy.
//!
//! `GET /api/serverless/download?version=..&platform=..&arch=..`
//!
//! Resolves a release, picks the matching `.zip` asset and streams it back
//! with the server-held credential attached upstream only.

use std::collections::HashMap;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::download::selection::{select_asset, Arch, Platform, Target};
use crate::github::ReleaseSelector;
use crate::http::request::RequestIdExt;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Validated download query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadQuery {
    pub version: String,
    pub target: Target,
}

impl DownloadQuery {
    /// Validate raw query parameters. Presence is checked before values, so a
    /// request missing any parameter is a 400 no matter which one.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ApiError> {
        let get = |key: &str| params.get(key).map(String::as_str).filter(|v| !v.is_empty());

        let (Some(version), Some(platform), Some(arch)) =
            (get("version"), get("platform"), get("arch"))
        else {
            return Err(ApiError::MissingParameters);
        };

        let (Ok(platform), Ok(arch)) = (platform.parse::<Platform>(), arch.parse::<Arch>()) else {
            return Err(ApiError::InvalidTarget);
        };

        Ok(Self {
            version: version.to_string(),
            target: Target { platform, arch },
        })
    }
}

/// Route entry point; accepts any method so the 405 body is ours.
pub async fn download_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let start_time = Instant::now();
    let request_id = headers.request_id();

    let response = match proxy_download(&state, &method, &uri, &request_id).await {
        Ok(response) => response,
        Err(e) => {
            if e.status().is_server_error() {
                tracing::error!(request_id = %request_id, error = %e, "Download failed");
            } else {
                tracing::debug!(request_id = %request_id, error = %e, "Download rejected");
            }
            e.into_response()
        }
    };

    metrics::record_request("download", response.status().as_u16(), start_time);
    response
}

async fn proxy_download(
    state: &AppState,
    method: &Method,
    uri: &Uri,
    request_id: &str,
) -> Result<Response, ApiError> {
    if *method != Method::GET {
        return Err(ApiError::MethodNotAllowed);
    }

    let token = state.config.token().ok_or(ApiError::ConfigurationMissing)?;

    let params = Query::<HashMap<String, String>>::try_from_uri(uri)
        .map(|Query(params)| params)
        .unwrap_or_default();
    let query = DownloadQuery::from_params(&params)?;

    let selector = ReleaseSelector::from_version(&query.version);
    let release = state.github.fetch_release(token, &selector).await?;

    let asset = select_asset(&release.assets, &query.target).ok_or_else(|| {
        ApiError::AssetNotFound {
            available: release.assets.iter().map(|a| a.name.clone()).collect(),
        }
    })?;

    tracing::info!(
        request_id = %request_id,
        version = %query.version,
        platform = %query.target.platform,
        arch = %query.target.arch,
        asset = %asset.name,
        size = asset.size,
        "Serving release asset"
    );

    let upstream = state.github.download_asset(token, asset).await?;
    metrics::record_download(query.target.platform.as_str(), query.target.arch.as_str());

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/zip")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", asset.name),
        )
        .header(header::CONTENT_LENGTH, asset.size)
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| ApiError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_valid_query() {
        let query = DownloadQuery::from_params(&params(&[
            ("version", "latest"),
            ("platform", "linux"),
            ("arch", "x64"),
        ]))
        .unwrap();
        assert_eq!(query.version, "latest");
        assert_eq!(query.target.platform, Platform::Linux);
        assert_eq!(query.target.arch, Arch::X64);
    }

    #[test]
    fn test_any_missing_parameter_is_rejected() {
        let full = [("version", "1.0.0"), ("platform", "linux"), ("arch", "x64")];
        for skip in 0..full.len() {
            let partial: Vec<_> = full
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, p)| *p)
                .collect();
            let err = DownloadQuery::from_params(&params(&partial)).unwrap_err();
            assert!(matches!(err, ApiError::MissingParameters), "skipped index {}", skip);
        }
    }

    #[test]
    fn test_empty_parameter_counts_as_missing() {
        let err = DownloadQuery::from_params(&params(&[
            ("version", ""),
            ("platform", "linux"),
            ("arch", "x64"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ApiError::MissingParameters));
    }

    #[test]
    fn test_missing_wins_over_invalid() {
        let err = DownloadQuery::from_params(&params(&[("platform", "solaris"), ("arch", "x64")]))
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingParameters));
    }

    #[test]
    fn test_unknown_platform_is_rejected() {
        let err = DownloadQuery::from_params(&params(&[
            ("version", "1.0.0"),
            ("platform", "solaris"),
            ("arch", "x64"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidTarget));
    }

    #[test]
    fn test_unknown_arch_is_rejected() {
        let err = DownloadQuery::from_params(&params(&[
            ("version", "1.0.0"),
            ("platform", "darwin"),
            ("arch", "ia32"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidTarget));
    }
}
