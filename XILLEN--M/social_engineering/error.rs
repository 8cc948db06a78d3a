use std::path::PathBuf;

use thiserror::Error;

/// Failure to persist the report snapshot. The run continues after it.
#[derive(Debug, Error)]
pub enum ReportWriteFailure {
    /// Snapshot could not be encoded.
    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
    /// File could not be created or written.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        /// Destination.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
