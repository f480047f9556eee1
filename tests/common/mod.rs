//! Shared utilities for integration testing.
//!
//! GitHub is replaced by a `wiremock` server. Gists are backed by an
//! in-memory store so consecutive requests observe each other's writes.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use release_gateway::config::GatewayConfig;
use release_gateway::HttpServer;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Respond, ResponseTemplate};

pub const TOKEN: &str = "test-token";
pub const GIST_ID: &str = "gist123";
pub const REPO_PATH: &str = "/repos/Persistence-AI/Landing";

/// Configuration pointing at the mock with both secrets set.
pub fn config_for(server: &MockServer) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.github.api_base_url = server.uri();
    config.github.token = Some(TOKEN.to_string());
    config.stats.gist_id = Some(GIST_ID.to_string());
    config
}

pub fn router(config: GatewayConfig) -> Router {
    HttpServer::new(config).expect("server should build").router()
}

/// Response pieces collected from a oneshot call.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response should be JSON")
    }
}

pub async fn send(router: Router, request: Request<Body>) -> TestResponse {
    let response = router.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable")
        .to_vec();
    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Release payload whose asset URLs point back at the mock.
pub fn release_json(server: &MockServer, names: &[&str]) -> Value {
    let assets: Vec<Value> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            json!({
                "name": name,
                "url": format!("{}/assets/{}", server.uri(), i),
                "size": 4,
                "content_type": "application/zip",
                "browser_download_url": format!("https://github.example/{}", name),
            })
        })
        .collect();
    json!({"tag_name": "v1.0.0", "name": "1.0.0", "assets": assets})
}

/// Empty stats document with all counters at zero.
pub fn zeroed_stats() -> Value {
    json!({
        "copyCounts": {"windows": 0, "linux": 0, "mac": 0, "total": 0},
        "visitors": {"total": 0, "fingerprints": {}, "daily": {}},
        "pageViews": {"total": 0, "daily": {}},
        "lastUpdated": null
    })
}

/// In-memory gist behind the mock's `/gists/{id}` endpoints.
#[derive(Clone)]
pub struct GistStore {
    files: Arc<Mutex<Vec<(String, String)>>>,
}

impl GistStore {
    pub fn new(files: &[(&str, Value)]) -> Self {
        let files = files
            .iter()
            .map(|(name, value)| (name.to_string(), serde_json::to_string_pretty(value).unwrap()))
            .collect();
        Self {
            files: Arc::new(Mutex::new(files)),
        }
    }

    /// Parsed content of a stored file.
    pub fn content(&self, name: &str) -> Value {
        let files = self.files.lock().unwrap();
        let (_, content) = files
            .iter()
            .find(|(n, _)| n == name)
            .expect("file should exist");
        serde_json::from_str(content).unwrap()
    }

    pub fn raw_content(&self, name: &str) -> String {
        let files = self.files.lock().unwrap();
        files
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c.clone())
            .expect("file should exist")
    }

    pub async fn mount(&self, server: &MockServer) {
        let gist_path = format!("/gists/{}", GIST_ID);
        Mock::given(method("GET"))
            .and(path(gist_path.clone()))
            .respond_with(GistRead(self.clone()))
            .mount(server)
            .await;
        Mock::given(method("PATCH"))
            .and(path(gist_path))
            .respond_with(GistWrite(self.clone()))
            .mount(server)
            .await;
    }
}

struct GistRead(GistStore);

impl Respond for GistRead {
    fn respond(&self, _request: &wiremock::Request) -> ResponseTemplate {
        let files = self.0.files.lock().unwrap();
        // Build the body by hand so file order matches insertion order.
        let entries: Vec<String> = files
            .iter()
            .map(|(name, content)| {
                format!(
                    "{}:{}",
                    Value::String(name.clone()),
                    json!({"filename": name, "content": content, "truncated": false})
                )
            })
            .collect();
        let body = format!("{{\"id\":\"{}\",\"files\":{{{}}}}}", GIST_ID, entries.join(","));
        ResponseTemplate::new(200).set_body_raw(body, "application/json")
    }
}

struct GistWrite(GistStore);

impl Respond for GistWrite {
    fn respond(&self, request: &wiremock::Request) -> ResponseTemplate {
        let update: Value = match serde_json::from_slice(&request.body) {
            Ok(v) => v,
            Err(_) => return ResponseTemplate::new(422),
        };
        let Some(updates) = update["files"].as_object() else {
            return ResponseTemplate::new(422);
        };

        let mut files = self.0.files.lock().unwrap();
        for (name, file) in updates {
            let Some(content) = file["content"].as_str() else {
                return ResponseTemplate::new(422);
            };
            match files.iter_mut().find(|(n, _)| n == name) {
                Some(entry) => entry.1 = content.to_string(),
                None => files.push((name.clone(), content.to_string())),
            }
        }
        ResponseTemplate::new(200).set_body_json(json!({"id": GIST_ID}))
    }
}
