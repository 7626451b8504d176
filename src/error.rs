//! Error types: fatal job errors and the recorded (non-fatal) per-batch failure.

use thiserror::Error;

/// Fatal errors that abort the whole export.
///
/// Per-batch failures are deliberately NOT in here: a failed page is recorded
/// as a [`BatchFailure`] in the outcome and the loop moves on.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Missing/contradictory settings. Raised pre-flight, before the dump
    /// directory or any output file exists.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The total-count SELECT failed. Not retried; aborts before any output
    /// file is created.
    #[error("count query failed: {0:#}")]
    CountQuery(anyhow::Error),

    /// The one-shot custom CONSTRUCT path failed. All-or-nothing, never
    /// skipped like a paged batch.
    #[error("construct query failed: {0:#}")]
    ConstructQuery(anyhow::Error),

    /// Could not obtain a writable target (dump directory, or the persistent
    /// single-file sink). A per-batch file failure in split mode is recorded
    /// instead of raised.
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),
}

/// One skipped page. The cursor was still advanced past it.
#[derive(Debug, Clone)]
pub struct BatchFailure {
    /// Offset the failed page started at.
    pub offset: u64,
    /// LIMIT the failed page was requested with.
    pub batch_size: u64,
    /// Rendered error chain from the query or the write.
    pub message: String,
}

impl std::fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "batch at offset {} (limit {}): {}",
            self.offset, self.batch_size, self.message
        )
    }
}
