//! GitHub API payloads and error definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A published release and its downloadable assets.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub tag_name: Option<String>,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// A single file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    /// API locator; fetching it with `Accept: application/octet-stream`
    /// yields the asset bytes even for private repositories.
    pub url: String,
    #[serde(default)]
    pub size: u64,
}

/// Which release to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseSelector {
    Latest,
    Tag(String),
}

impl ReleaseSelector {
    /// `"latest"` selects the most recent release; anything else is treated
    /// as a version and prefixed with `v` to form the tag.
    pub fn from_version(version: &str) -> Self {
        if version == "latest" {
            Self::Latest
        } else {
            Self::Tag(format!("v{}", version))
        }
    }

    /// Path of the release endpoint, relative to the repository.
    pub fn endpoint(&self) -> String {
        match self {
            Self::Latest => "releases/latest".to_string(),
            Self::Tag(tag) => format!("releases/tags/{}", tag),
        }
    }
}

/// A gist and its files, in the order GitHub returned them.
#[derive(Debug, Clone, Deserialize)]
pub struct Gist {
    #[serde(default)]
    pub files: serde_json::Map<String, serde_json::Value>,
}

/// One file of a gist.
#[derive(Debug, Clone, Deserialize)]
pub struct GistFile {
    pub content: Option<String>,
    #[serde(default)]
    pub truncated: bool,
}

impl Gist {
    /// Resolve the file to operate on: the named one when given, otherwise
    /// the first file listed.
    pub fn file(&self, name: Option<&str>) -> GithubResult<(String, GistFile)> {
        let (key, value) = match name {
            Some(name) => self
                .files
                .get(name)
                .map(|value| (name, value))
                .ok_or_else(|| GithubError::FileNotFound(name.to_string()))?,
            None => self
                .files
                .iter()
                .next()
                .map(|(key, value)| (key.as_str(), value))
                .ok_or(GithubError::EmptyGist)?,
        };
        let file: GistFile = serde_json::from_value(value.clone())?;
        Ok((key.to_string(), file))
    }
}

/// Body of a gist update touching a single file.
#[derive(Debug, Serialize)]
pub struct GistUpdate<'a> {
    pub files: BTreeMap<&'a str, GistFileUpdate<'a>>,
}

#[derive(Debug, Serialize)]
pub struct GistFileUpdate<'a> {
    pub content: &'a str,
}

impl<'a> GistUpdate<'a> {
    pub fn single(file_name: &'a str, content: &'a str) -> Self {
        let mut files = BTreeMap::new();
        files.insert(file_name, GistFileUpdate { content });
        Self { files }
    }
}

/// Errors that can occur talking to GitHub.
#[derive(Debug, Error)]
pub enum GithubError {
    /// The requested release does not exist.
    #[error("Release not found")]
    ReleaseNotFound,

    /// Release lookup failed with a non-404 status.
    #[error("GitHub API error: {0}")]
    Api(u16),

    /// Asset download failed.
    #[error("Failed to download asset: {0}")]
    AssetDownload(u16),

    /// Gist read failed.
    #[error("Failed to fetch gist: {0}")]
    GistFetch(u16),

    /// Gist write failed.
    #[error("Failed to update gist: {0}")]
    GistUpdate(u16),

    /// Gist has no files at all.
    #[error("Gist has no files")]
    EmptyGist,

    /// The configured stats file is not part of the gist.
    #[error("File '{0}' not found in gist")]
    FileNotFound(String),

    /// GitHub returned the file without inline content (too large or truncated).
    #[error("Gist file '{0}' has no inline content")]
    MissingContent(String),

    /// The credential cannot be sent as a header value.
    #[error("Configured credential is not a valid header value")]
    InvalidCredential,

    /// Transport failure.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Malformed payload.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type for GitHub operations.
pub type GithubResult<T> = Result<T, GithubError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_selector_routes_latest() {
        let selector = ReleaseSelector::from_version("latest");
        assert_eq!(selector, ReleaseSelector::Latest);
        assert_eq!(selector.endpoint(), "releases/latest");
    }

    #[test]
    fn test_selector_prefixes_tag() {
        let selector = ReleaseSelector::from_version("2.3.0");
        assert_eq!(selector, ReleaseSelector::Tag("v2.3.0".into()));
        assert_eq!(selector.endpoint(), "releases/tags/v2.3.0");
    }

    #[test]
    fn test_release_without_assets() {
        let release: Release = serde_json::from_value(json!({"tag_name": "v1.0.0"})).unwrap();
        assert!(release.assets.is_empty());
    }

    #[test]
    fn test_gist_first_file_follows_response_order() {
        let gist: Gist = serde_json::from_str(
            r#"{"id":"g","files":{"zz-stats.json":{"content":"{}"},"aa.json":{"content":"[]"}}}"#,
        )
        .unwrap();
        let (name, file) = gist.file(None).unwrap();
        assert_eq!(name, "zz-stats.json");
        assert_eq!(file.content.as_deref(), Some("{}"));
    }

    #[test]
    fn test_gist_named_file() {
        let gist: Gist = serde_json::from_value(json!({
            "files": {"a.json": {"content": "1"}, "stats.json": {"content": "2"}}
        }))
        .unwrap();
        let (name, file) = gist.file(Some("stats.json")).unwrap();
        assert_eq!(name, "stats.json");
        assert_eq!(file.content.as_deref(), Some("2"));

        let err = gist.file(Some("missing.json")).unwrap_err();
        assert_eq!(err.to_string(), "File 'missing.json' not found in gist");
    }

    #[test]
    fn test_empty_gist() {
        let gist: Gist = serde_json::from_value(json!({"files": {}})).unwrap();
        assert!(matches!(gist.file(None), Err(GithubError::EmptyGist)));
    }

    #[test]
    fn test_update_body_shape() {
        let body = serde_json::to_value(GistUpdate::single("stats.json", "{}")).unwrap();
        assert_eq!(body, json!({"files": {"stats.json": {"content": "{}"}}}));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(GithubError::Api(502).to_string(), "GitHub API error: 502");
        assert_eq!(GithubError::GistFetch(401).to_string(), "Failed to fetch gist: 401");
        assert_eq!(GithubError::GistUpdate(500).to_string(), "Failed to update gist: 500");
        assert_eq!(
            GithubError::AssetDownload(403).to_string(),
            "Failed to download asset: 403"
        );
    }
}
