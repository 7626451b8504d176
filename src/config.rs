use crate::error::ExportError;
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_BATCH_SIZE: u64 = 50_000;
pub const DEFAULT_FILE_PREFIX: &str = "sparql-dump";
pub const DEFAULT_OUTPUT_DIR: &str = "dumps";

/// One export job, frozen at startup. All env lookups happen in
/// [`ExportOptions::from_env`]; nothing reads the environment mid-run.
///
/// Triple selection precedence: `construct_query` > `where_clause` > `graph`.
/// A job needs the endpoint plus at least one of those three to be valid.
#[derive(Clone, Debug)]
pub struct ExportOptions {
    pub endpoint: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub graph: Option<String>,           // named graph IRI, wrapped into the default WHERE
    pub where_clause: Option<String>,    // raw WHERE body, overrides the graph default
    pub construct_query: Option<String>, // full CONSTRUCT query, overrides both
    pub batch_size: u64,
    pub offset: u64, // starting offset for the cursor
    pub file_prefix: String,
    pub split_files: bool, // one file per batch instead of one big file
    pub output_dir: PathBuf,
    pub progress: bool,            // show an indicatif bar alongside log lines
    pub write_buffer_bytes: usize, // BufWriter capacity
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            endpoint: None,
            user: None,
            password: None,
            graph: None,
            where_clause: None,
            construct_query: None,
            batch_size: DEFAULT_BATCH_SIZE,
            offset: 0,
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            split_files: false,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            progress: true,
            write_buffer_bytes: 256 * 1024,
        }
    }
}

impl ExportOptions {
    /// Read the whole configuration from the environment, once.
    ///
    /// Variables: `SPARQL_ENDPOINT` (required), `SPARQL_GRAPH`, `SPARQL_USER`,
    /// `SPARQL_PASSWORD`, `SPARQL_WHERE`, `SPARQL_CONSTRUCT`,
    /// `SPARQL_BATCHSIZE` (50000), `SPARQL_OFFSET` (0), `SPLIT_FILES`
    /// (presence means true), `FILE_NAME_PREFIX` ("sparql-dump").
    /// Malformed numbers are a configuration error, not a silent default.
    pub fn from_env() -> Result<Self, ExportError> {
        let mut opts = Self::default();

        opts.endpoint = non_empty(env::var("SPARQL_ENDPOINT").ok());
        opts.graph = non_empty(env::var("SPARQL_GRAPH").ok());
        opts.user = env::var("SPARQL_USER").ok();
        opts.password = env::var("SPARQL_PASSWORD").ok();
        opts.where_clause = non_empty(env::var("SPARQL_WHERE").ok());
        opts.construct_query = non_empty(env::var("SPARQL_CONSTRUCT").ok());

        if let Ok(raw) = env::var("SPARQL_BATCHSIZE") {
            opts.batch_size = parse_u64("SPARQL_BATCHSIZE", &raw)?;
        }
        if let Ok(raw) = env::var("SPARQL_OFFSET") {
            opts.offset = parse_u64("SPARQL_OFFSET", &raw)?;
        }

        // Presence alone turns splitting on, matching the historical contract.
        opts.split_files = env::var_os("SPLIT_FILES").is_some();

        // An empty prefix falls back to the default rather than producing ".nt".
        if let Some(prefix) = non_empty(env::var("FILE_NAME_PREFIX").ok()) {
            opts.file_prefix = prefix;
        }

        Ok(opts)
    }

    /// Endpoint present, a triple selector present, and a positive batch size.
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.endpoint.as_deref().map_or(true, |e| e.is_empty()) {
            return Err(ExportError::Configuration(
                "SPARQL_ENDPOINT is not set".to_string(),
            ));
        }
        if self.graph.is_none() && self.where_clause.is_none() && self.construct_query.is_none() {
            return Err(ExportError::Configuration(
                "none of SPARQL_GRAPH, SPARQL_WHERE or SPARQL_CONSTRUCT is set".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(ExportError::Configuration(
                "SPARQL_BATCHSIZE must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }

    // -------- Builder methods --------
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }
    pub fn with_graph(mut self, graph: impl Into<String>) -> Self {
        self.graph = Some(graph.into());
        self
    }
    pub fn with_where_clause(mut self, fragment: impl Into<String>) -> Self {
        self.where_clause = Some(fragment.into());
        self
    }
    pub fn with_construct_query(mut self, query: impl Into<String>) -> Self {
        self.construct_query = Some(query.into());
        self
    }
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size;
        self
    }
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }
    pub fn with_split_files(mut self, yes: bool) -> Self {
        self.split_files = yes;
        self
    }
    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_io_write_buffer(mut self, bytes: usize) -> Self {
        self.write_buffer_bytes = bytes.max(8 * 1024);
        self
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

fn parse_u64(name: &str, raw: &str) -> Result<u64, ExportError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ExportError::Configuration(format!("{name} is not a valid integer: {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_contract() {
        let opts = ExportOptions::default();
        assert_eq!(opts.batch_size, 50_000);
        assert_eq!(opts.offset, 0);
        assert_eq!(opts.file_prefix, "sparql-dump");
        assert!(!opts.split_files);
        assert_eq!(opts.output_dir, PathBuf::from("dumps"));
    }

    #[test]
    fn validate_requires_endpoint() {
        let opts = ExportOptions::default().with_graph("http://example.org/g");
        assert!(matches!(opts.validate(), Err(ExportError::Configuration(_))));
    }

    #[test]
    fn validate_requires_a_selector() {
        let opts = ExportOptions::default().with_endpoint("http://localhost:8890/sparql");
        assert!(matches!(opts.validate(), Err(ExportError::Configuration(_))));
    }

    #[test]
    fn validate_rejects_zero_batch_size() {
        let opts = ExportOptions::default()
            .with_endpoint("http://localhost:8890/sparql")
            .with_graph("http://example.org/g")
            .with_batch_size(0);
        assert!(matches!(opts.validate(), Err(ExportError::Configuration(_))));
    }

    #[test]
    fn any_single_selector_is_enough() {
        let base = ExportOptions::default().with_endpoint("http://localhost:8890/sparql");
        assert!(base.clone().with_graph("http://example.org/g").validate().is_ok());
        assert!(base.clone().with_where_clause("?s ?p ?o").validate().is_ok());
        assert!(base
            .with_construct_query("CONSTRUCT { ?s ?p ?o } WHERE { ?s ?p ?o }")
            .validate()
            .is_ok());
    }

    #[test]
    fn bad_number_is_a_configuration_error() {
        assert!(parse_u64("SPARQL_BATCHSIZE", "lots").is_err());
        assert_eq!(parse_u64("SPARQL_OFFSET", " 42 ").unwrap(), 42);
    }
}
