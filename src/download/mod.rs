//! Release proxy subsystem.
//!
//! # Data Flow
//! ```text
//! GET ?version&platform&arch
//!     → handler.rs (method, secret and parameter checks)
//!     → github::fetch_release (latest or tag v{version})
//!     → selection.rs (platform+arch → platform → arch, .zip only)
//!     → github::download_asset
//!     → streamed application/zip response
//! ```

pub mod handler;
pub mod selection;

pub use handler::{download_handler, DownloadQuery};
pub use selection::{select_asset, Arch, Platform, Target};
