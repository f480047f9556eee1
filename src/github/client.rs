//! GitHub REST client for releases and gists.
//!
//! # Responsibilities
//! - Attach the server-held credential and the fixed User-Agent
//! - Resolve releases by tag or as "latest"
//! - Open asset downloads as byte streams
//! - Read and overwrite gist files
//!
//! Every call is a single attempt. Callers decide what a failure means.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use tracing::Instrument;

use crate::config::GithubConfig;
use crate::github::types::{
    Gist, GistUpdate, GithubError, GithubResult, Release, ReleaseAsset, ReleaseSelector,
};

const ACCEPT_JSON: &str = "application/vnd.github.v3+json";
const ACCEPT_BINARY: &str = "application/octet-stream";

/// Thin wrapper around a pooled `reqwest::Client`.
#[derive(Clone)]
pub struct GithubClient {
    client: Client,
    api_base_url: String,
    owner: String,
    repository: String,
    user_agent: String,
}

impl GithubClient {
    /// Create a client from configuration. The credential is not captured;
    /// it is passed on each call.
    pub fn new(config: &GithubConfig) -> GithubResult<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            owner: config.owner.clone(),
            repository: config.repository.clone(),
            user_agent: config.user_agent.clone(),
        })
    }

    fn headers(&self, token: &str, accept: &'static str) -> GithubResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(accept));
        let mut auth = HeaderValue::from_str(&format!("token {}", token))
            .map_err(|_| GithubError::InvalidCredential)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        if let Ok(ua) = HeaderValue::from_str(&self.user_agent) {
            headers.insert(USER_AGENT, ua);
        }
        Ok(headers)
    }

    /// URL of a release endpoint for the configured repository.
    pub fn release_url(&self, selector: &ReleaseSelector) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base_url,
            self.owner,
            self.repository,
            selector.endpoint()
        )
    }

    fn gist_url(&self, gist_id: &str) -> String {
        format!("{}/gists/{}", self.api_base_url, gist_id)
    }

    /// Fetch a release descriptor. A 404 is reported as `ReleaseNotFound`.
    pub async fn fetch_release(
        &self,
        token: &str,
        selector: &ReleaseSelector,
    ) -> GithubResult<Release> {
        let url = self.release_url(selector);
        let span = tracing::debug_span!("fetch_release", url = %url);
        self.get_release(token, &url).instrument(span).await
    }

    async fn get_release(&self, token: &str, url: &str) -> GithubResult<Release> {
        let response = self
            .client
            .get(url)
            .headers(self.headers(token, ACCEPT_JSON)?)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(GithubError::ReleaseNotFound);
        }
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Release lookup failed");
            return Err(GithubError::Api(status.as_u16()));
        }

        let release: Release = response.json().await?;
        tracing::debug!(
            tag = release.tag_name.as_deref().unwrap_or("unknown"),
            assets = release.assets.len(),
            "Release resolved"
        );
        Ok(release)
    }

    /// Start downloading an asset. The returned response has a success
    /// status and its body has not been read yet.
    pub async fn download_asset(&self, token: &str, asset: &ReleaseAsset) -> GithubResult<Response> {
        let response = self
            .client
            .get(&asset.url)
            .headers(self.headers(token, ACCEPT_BINARY)?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(asset = %asset.name, status = status.as_u16(), "Asset download failed");
            return Err(GithubError::AssetDownload(status.as_u16()));
        }
        Ok(response)
    }

    /// Fetch a gist with its file contents.
    pub async fn fetch_gist(&self, token: &str, gist_id: &str) -> GithubResult<Gist> {
        let response = self
            .client
            .get(self.gist_url(gist_id))
            .headers(self.headers(token, ACCEPT_JSON)?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GithubError::GistFetch(status.as_u16()));
        }
        Ok(response.json().await?)
    }

    /// Overwrite the full content of one gist file.
    pub async fn update_gist_file(
        &self,
        token: &str,
        gist_id: &str,
        file_name: &str,
        content: &str,
    ) -> GithubResult<()> {
        let response = self
            .client
            .patch(self.gist_url(gist_id))
            .headers(self.headers(token, ACCEPT_JSON)?)
            .json(&GistUpdate::single(file_name, content))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GithubError::GistUpdate(status.as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GithubClient {
        let mut config = GithubConfig::default();
        config.api_base_url = "https://api.example.test/".into();
        GithubClient::new(&config).unwrap()
    }

    #[test]
    fn test_release_urls() {
        let client = client();
        assert_eq!(
            client.release_url(&ReleaseSelector::Latest),
            "https://api.example.test/repos/Persistence-AI/Landing/releases/latest"
        );
        assert_eq!(
            client.release_url(&ReleaseSelector::from_version("2.3.0")),
            "https://api.example.test/repos/Persistence-AI/Landing/releases/tags/v2.3.0"
        );
    }

    #[test]
    fn test_headers_carry_credential_and_agent() {
        let headers = client().headers("secret", ACCEPT_JSON).unwrap();
        assert_eq!(headers[AUTHORIZATION], "token secret");
        assert!(headers[AUTHORIZATION].is_sensitive());
        assert_eq!(headers[USER_AGENT], "PersistenceAI-Installer");
        assert_eq!(headers[ACCEPT], ACCEPT_JSON);
    }

    #[test]
    fn test_credential_with_newline_is_rejected() {
        let err = client().headers("bad\ntoken", ACCEPT_JSON).unwrap_err();
        assert!(matches!(err, GithubError::InvalidCredential));
    }
}
