//! GitHub integration subsystem.
//!
//! # Data Flow
//! ```text
//! download handler ──▶ fetch_release ──▶ /repos/{owner}/{repo}/releases/...
//!                  ──▶ download_asset ──▶ asset.url (octet-stream)
//!
//! stats handler    ──▶ fetch_gist ──────▶ GET   /gists/{id}
//!                  ──▶ update_gist_file ▶ PATCH /gists/{id}
//! ```
//!
//! # Design Decisions
//! - One pooled client shared by both handlers
//! - Credential passed per call, never stored in the client
//! - No retries: a non-success status is turned into a typed error at once

pub mod client;
pub mod types;

pub use client::GithubClient;
pub use types::{
    Gist, GistFile, GithubError, GithubResult, Release, ReleaseAsset, ReleaseSelector,
};
