use sparql_dump::{init_tracing_once, SparqlDump};

fn main() {
    init_tracing_once();

    let dump = match SparqlDump::from_env() {
        Ok(dump) => dump,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };

    match dump.run() {
        Ok(outcome) => {
            if outcome.batches_failed > 0 {
                tracing::warn!(
                    "finished with {} of {} batches skipped (final offset {})",
                    outcome.batches_failed,
                    outcome.batches_attempted,
                    outcome.final_offset
                );
            } else {
                tracing::info!(
                    "finished: {} batches, {} triples expected",
                    outcome.batches_attempted,
                    outcome.total
                );
            }
        }
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    }
}
