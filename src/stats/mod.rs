//! Usage statistics subsystem.
//!
//! # Data Flow
//! ```text
//! POST {type, platform?, fingerprint?, date?}
//!     → event.rs (Copy | PageView | Ignored)
//!     → github::fetch_gist → configured file or first file
//!     → document.rs (parse, apply, stamp lastUpdated)
//!     → github::update_gist_file (whole content overwritten)
//!     → {"success": true, "stats": ...}
//! ```
//!
//! # Design Decisions
//! - Unrecognized events are a no-op, never a 400
//! - Last writer wins; see `handler` for the consistency caveat

pub mod document;
pub mod event;
pub mod handler;

pub use document::{Outcome, StatsDocument};
pub use event::StatsEvent;
pub use handler::{stats_handler, CorsPolicy};
