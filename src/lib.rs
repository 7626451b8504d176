mod client;
mod config;
mod error;
mod exporter;
mod ntriples;
mod progress;
mod query;
mod sink;
mod util;

pub use crate::client::{HttpSparqlClient, SparqlClient};
pub use crate::config::{ExportOptions, DEFAULT_BATCH_SIZE, DEFAULT_FILE_PREFIX, DEFAULT_OUTPUT_DIR};
pub use crate::error::{BatchFailure, ExportError};
pub use crate::exporter::{ExportOutcome, SparqlDump};
pub use crate::ntriples::NtWriter;
pub use crate::query::QueryPlan;

// Expose logging init so binaries embedding the library share the setup.
pub use crate::util::init_tracing_once;
