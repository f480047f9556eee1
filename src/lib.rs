//! Release download proxy and usage-stats writer backed by the GitHub API.

pub mod config;
pub mod download;
pub mod github;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod stats;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
