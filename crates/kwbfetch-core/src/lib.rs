//! kwbfetch Core - Shared infrastructure for the KWB download pipeline
//!
//! This crate provides the blocking HTTP facade, logging setup, and
//! progress reporting used by the CBS source crate and the CLI.

pub mod http;
pub mod logging;
pub mod progress;

// Re-exports for convenience
pub use http::{HttpError, SHARED_RUNTIME, get_text, http_client};
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, SharedProgress, fmt_num};
