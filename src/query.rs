//! Query plan derivation: WHERE-clause precedence and the generated
//! count / paged CONSTRUCT query texts.

use crate::config::ExportOptions;
use crate::error::ExportError;

/// Resolved query plan for a paginated run. Derived once from the options;
/// the raw CONSTRUCT path never builds one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryPlan {
    where_clause: String,
}

impl QueryPlan {
    /// Resolve the WHERE body. Precedence: explicit fragment, then the
    /// graph-wrapped default. With neither present the job cannot describe
    /// what to export, which is a configuration error.
    pub fn resolve(opts: &ExportOptions) -> Result<Self, ExportError> {
        let where_clause = match (&opts.where_clause, &opts.graph) {
            (Some(fragment), _) => fragment.clone(),
            (None, Some(graph)) => format!("GRAPH <{graph}> {{ ?s ?p ?o }}"),
            (None, None) => {
                return Err(ExportError::Configuration(
                    "no WHERE fragment and no graph to derive one from".to_string(),
                ))
            }
        };
        Ok(Self { where_clause })
    }

    pub fn where_clause(&self) -> &str {
        &self.where_clause
    }

    /// `SELECT (COUNT(*) AS ?count)` over the resolved WHERE body.
    pub fn count_query(&self) -> String {
        format!("SELECT (COUNT(*) AS ?count) WHERE {{ {} }}", self.where_clause)
    }

    /// One bounded page of the export.
    pub fn construct_page(&self, limit: u64, offset: u64) -> String {
        format!(
            "CONSTRUCT {{ ?s ?p ?o }} WHERE {{ {} }} LIMIT {} OFFSET {}",
            self.where_clause, limit, offset
        )
    }
}
