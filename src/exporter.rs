//! The pagination controller: count the result set once, then drive a strictly
//! sequential loop of bounded CONSTRUCT pages into the output sinks.

use crate::client::{check_endpoint, HttpSparqlClient, SparqlClient};
use crate::config::ExportOptions;
use crate::error::{BatchFailure, ExportError};
use crate::progress::make_count_progress;
use crate::query::QueryPlan;
use crate::sink::SinkManager;
use crate::util::init_tracing_once;
use anyhow::Result;
use tracing::{info, warn};

/// Summary of one finished run.
#[derive(Debug)]
pub struct ExportOutcome {
    /// Expected triple count from the up-front COUNT query. On the raw
    /// CONSTRUCT path, where no count is issued, this is the streamed count.
    pub total: u64,
    /// Loop passes, failed ones included.
    pub batches_attempted: u64,
    pub batches_failed: u64,
    /// Where the cursor ended up; `>= total` after a completed run.
    pub final_offset: u64,
    /// The skipped pages, in offset order.
    pub failures: Vec<BatchFailure>,
}

/// Builder-style entry point for one export job.
#[derive(Clone)]
pub struct SparqlDump {
    pub(crate) opts: ExportOptions,
}

impl SparqlDump {
    pub fn new() -> Self {
        Self { opts: ExportOptions::default() }
    }

    pub fn from_options(opts: ExportOptions) -> Self {
        Self { opts }
    }

    pub fn from_env() -> Result<Self, ExportError> {
        Ok(Self { opts: ExportOptions::from_env()? })
    }

    // -------- Builder methods --------
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self { self.opts = self.opts.with_endpoint(endpoint); self }
    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self { self.opts = self.opts.with_credentials(user, password); self }
    pub fn graph(mut self, graph: impl Into<String>) -> Self { self.opts = self.opts.with_graph(graph); self }
    pub fn where_clause(mut self, fragment: impl Into<String>) -> Self { self.opts = self.opts.with_where_clause(fragment); self }
    pub fn construct_query(mut self, query: impl Into<String>) -> Self { self.opts = self.opts.with_construct_query(query); self }
    pub fn batch_size(mut self, size: u64) -> Self { self.opts = self.opts.with_batch_size(size); self }
    pub fn offset(mut self, offset: u64) -> Self { self.opts = self.opts.with_offset(offset); self }
    pub fn file_prefix(mut self, prefix: impl Into<String>) -> Self { self.opts = self.opts.with_file_prefix(prefix); self }
    pub fn split_files(mut self, yes: bool) -> Self { self.opts = self.opts.with_split_files(yes); self }
    pub fn output_dir(mut self, dir: impl AsRef<std::path::Path>) -> Self { self.opts = self.opts.with_output_dir(dir); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }

    /// Run against the configured HTTP endpoint.
    pub fn run(self) -> Result<ExportOutcome, ExportError> {
        init_tracing_once();
        self.opts.validate()?;
        let endpoint = self
            .opts
            .endpoint
            .as_deref()
            .ok_or_else(|| ExportError::Configuration("SPARQL_ENDPOINT is not set".to_string()))?;
        check_endpoint(endpoint).map_err(|e| ExportError::Configuration(format!("{e:#}")))?;
        let client = HttpSparqlClient::new(
            endpoint,
            self.opts.user.as_deref(),
            self.opts.password.as_deref(),
        )
        .map_err(|e| ExportError::Configuration(format!("{e:#}")))?;
        self.run_with(&client)
    }

    /// Run against any client. This is the full controller; `run` is just the
    /// HTTP wiring around it.
    pub fn run_with(&self, client: &dyn SparqlClient) -> Result<ExportOutcome, ExportError> {
        // Validation happens before the dump directory exists, so an invalid
        // job leaves no trace on disk.
        self.opts.validate()?;

        if let Some(raw) = &self.opts.construct_query {
            return self.run_custom_construct(client, raw);
        }

        let plan = QueryPlan::resolve(&self.opts)?;
        let mut sinks = SinkManager::create(&self.opts)?;

        // Counted once, up front. Not retried; the dataset may drift under us,
        // which is why the loop sticks to this snapshot of the total.
        let total = client
            .select_count(&plan.count_query())
            .map_err(ExportError::CountQuery)?;
        info!(
            "dumping {total} triples in batches of {}",
            self.opts.batch_size
        );

        let batch = self.opts.batch_size;
        let mut offset = self.opts.offset;
        let mut attempted = 0u64;
        let mut completed = 0u64;
        let mut failures: Vec<BatchFailure> = Vec::new();

        // The persistent sink opens as soon as the total is known, even if
        // the loop then runs zero times.
        if !self.opts.split_files {
            sinks.open_single()?;
        }

        let pb = (self.opts.progress && total > 0)
            .then(|| make_count_progress(total, "Dumping triples"));

        while offset < total {
            attempted += 1;
            match self.run_batch(client, &plan, &mut sinks, offset) {
                Ok((written, file)) => {
                    completed += 1;
                    // Historical approximation: completed pages times batch
                    // size over the total, so a short final page can push it
                    // past 100%.
                    let percent = progress_percent(completed, batch, total);
                    info!("progress {percent}% - wrote {written} triples to {file}");
                    if let Some(pb) = &pb {
                        pb.inc(written);
                    }
                }
                Err(err) => {
                    warn!("failed to retrieve triples from offset {offset} with batchsize {batch}");
                    warn!("{err:#}");
                    failures.push(BatchFailure {
                        offset,
                        batch_size: batch,
                        message: format!("{err:#}"),
                    });
                }
            }
            // The cursor advances past failed pages too; a skipped slice is
            // never retried at the same offset.
            offset += batch;
        }

        sinks.finish()?;
        if let Some(pb) = &pb {
            pb.finish_with_message("done");
        }

        Ok(ExportOutcome {
            total,
            batches_attempted: attempted,
            batches_failed: failures.len() as u64,
            final_offset: offset,
            failures,
        })
    }

    /// One page: open (or reuse) the sink, stream the bounded CONSTRUCT into
    /// it, close it in split mode. Any error here is a recordable batch
    /// failure, including a split-mode file that cannot be opened.
    fn run_batch(
        &self,
        client: &dyn SparqlClient,
        plan: &QueryPlan,
        sinks: &mut SinkManager,
        offset: u64,
    ) -> Result<(u64, String)> {
        let writer = sinks.sink_for(offset)?;
        let file = writer.path().display().to_string();
        let query = plan.construct_page(self.opts.batch_size, offset);
        let written = client.construct(&query, &mut |t| {
            writer.write_triple(&t).map_err(anyhow::Error::from)
        })?;
        sinks.end_batch()?;
        Ok((written, file))
    }

    /// The raw-CONSTRUCT path: no count, no offset cursor, one logical
    /// request streamed into a single `<prefix>.nt`. All-or-nothing; a
    /// failure here fails the job.
    fn run_custom_construct(
        &self,
        client: &dyn SparqlClient,
        raw: &str,
    ) -> Result<ExportOutcome, ExportError> {
        let mut sinks = SinkManager::create(&self.opts)?;
        let writer = sinks.open_single()?;
        let file = writer.path().display().to_string();
        let written = client
            .construct(raw, &mut |t| {
                writer.write_triple(&t).map_err(anyhow::Error::from)
            })
            .map_err(ExportError::ConstructQuery)?;
        sinks.finish()?;
        info!("wrote {written} triples to {file}");
        Ok(ExportOutcome {
            total: written,
            batches_attempted: 1,
            batches_failed: 0,
            final_offset: self.opts.offset,
            failures: Vec::new(),
        })
    }
}

impl Default for SparqlDump {
    fn default() -> Self {
        Self::new()
    }
}

fn progress_percent(completed: u64, batch_size: u64, total: u64) -> f64 {
    (completed * batch_size) as f64 / total as f64 * 100.0
}
