//! kwbfetch CBS - Kerncijfers Wijken en Buurten download pipeline
//!
//! This crate downloads KWB observation data from the CBS OData v4 API,
//! following server-driven pagination, and writes each year to a CSV file.
//!
//! # Example
//!
//! ```no_run
//! use kwbfetch_cbs::{Config, run};
//!
//! let config = Config {
//!     measures: vec!["M001642".to_string()],
//!     suffix: "-woz".to_string(),
//!     ..Default::default()
//! };
//!
//! let progress = std::sync::Arc::new(kwbfetch_core::ProgressContext::new());
//! let summary = run(&config, &[2020, 2021], progress);
//! println!("wrote {} rows", summary.total_rows);
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod page;
pub mod query;
pub mod runner;
pub mod sink;

// Re-exports for convenience
pub use config::Config;
pub use error::DownloadError;
pub use runner::{Outcome, RunSummary, YearResult, download_year, run};
