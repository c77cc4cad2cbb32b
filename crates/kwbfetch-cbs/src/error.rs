//! Error type for the per-year download pipeline

use kwbfetch_core::HttpError;

/// Error from downloading one year's observations.
///
/// Every variant is contained to the year being processed; the runner
/// reports it and moves on to the next requested year.
#[derive(Debug)]
pub enum DownloadError {
    /// Requested year has no catalog entry
    UnknownYear(u16),
    /// HTTP request failed or returned a non-success status
    Http(HttpError),
    /// Response body was not the expected OData JSON
    Json {
        url: String,
        source: serde_json::Error,
    },
    /// A later record's fields disagree with the established CSV header
    SchemaMismatch { field: String },
    /// Local file I/O failed
    Io(std::io::Error),
}

impl std::fmt::Display for DownloadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownYear(year) => write!(f, "no table ID found for {year}"),
            Self::Http(e) => write!(f, "{e}"),
            Self::Json { url, source } => write!(f, "invalid OData JSON from {url}: {source}"),
            Self::SchemaMismatch { field } => {
                write!(f, "record field '{field}' does not match the CSV header")
            }
            Self::Io(e) => write!(f, "IO: {e}"),
        }
    }
}

impl std::error::Error for DownloadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Json { source, .. } => Some(source),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<HttpError> for DownloadError {
    fn from(e: HttpError) -> Self {
        Self::Http(e)
    }
}

impl From<std::io::Error> for DownloadError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<csv::Error> for DownloadError {
    fn from(e: csv::Error) -> Self {
        // csv::Error is always an I/O failure here; we never serialize
        // via serde into the writer
        match e.into_kind() {
            csv::ErrorKind::Io(io) => Self::Io(io),
            other => Self::Io(std::io::Error::other(format!("CSV write: {other:?}"))),
        }
    }
}
