//! Pipeline configuration

use std::path::PathBuf;

use crate::catalog;

/// Runtime configuration for the KWB download pipeline
#[derive(Debug, Clone)]
pub struct Config {
    /// OData v4 base URL of the dataset service
    pub base_url: String,
    /// Output directory for CSV files (created recursively)
    pub output_dir: PathBuf,
    /// Resolved measure codes to filter on; empty means no filter
    pub measures: Vec<String>,
    /// Filename suffix, e.g. "-woz-koopwoningen"
    pub suffix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: catalog::ODATA_BASE.to_string(),
            output_dir: PathBuf::from("data/raw/cbs"),
            measures: Vec::new(),
            suffix: String::new(),
        }
    }
}

impl Config {
    /// Output path for one year: `{output_dir}/kwb-{year}{suffix}.csv`
    pub fn output_path(&self, year: u16) -> PathBuf {
        self.output_dir
            .join(format!("kwb-{year}{}.csv", self.suffix))
    }
}
