use anyhow::{anyhow, Result};
use oxrdf::{NamedNode, Triple};
use sparql_dump::SparqlClient;
use std::cell::RefCell;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Fake SPARQL endpoint over a synthetic dataset of `total` deterministic
/// triples. It answers the count query with `total` and serves CONSTRUCT
/// pages by parsing LIMIT/OFFSET back out of the query text the controller
/// built, so tests exercise the real query strings.
pub struct FakeEndpoint {
    pub total: u64,
    /// Page offsets whose CONSTRUCT should fail (before streaming anything).
    pub fail_offsets: Vec<u64>,
    /// Fail every CONSTRUCT, for the all-or-nothing custom path.
    pub fail_all_constructs: bool,
    /// Fail the count SELECT.
    pub fail_count: bool,
    pub count_queries: RefCell<Vec<String>>,
    pub construct_queries: RefCell<Vec<String>>,
}

impl FakeEndpoint {
    pub fn with_total(total: u64) -> Self {
        Self {
            total,
            fail_offsets: Vec::new(),
            fail_all_constructs: false,
            fail_count: false,
            count_queries: RefCell::new(Vec::new()),
            construct_queries: RefCell::new(Vec::new()),
        }
    }

    pub fn failing_at(mut self, offsets: &[u64]) -> Self {
        self.fail_offsets = offsets.to_vec();
        self
    }

    /// The nth triple of the synthetic dataset.
    pub fn triple_at(n: u64) -> Triple {
        Triple::new(
            NamedNode::new(format!("http://example.org/s{n}")).unwrap(),
            NamedNode::new("http://example.org/p").unwrap(),
            NamedNode::new(format!("http://example.org/o{n}")).unwrap(),
        )
    }
}

impl SparqlClient for FakeEndpoint {
    fn select_count(&self, query: &str) -> Result<u64> {
        self.count_queries.borrow_mut().push(query.to_string());
        if self.fail_count {
            return Err(anyhow!("endpoint refused the count query"));
        }
        Ok(self.total)
    }

    fn construct(
        &self,
        query: &str,
        sink: &mut dyn FnMut(Triple) -> Result<()>,
    ) -> Result<u64> {
        self.construct_queries.borrow_mut().push(query.to_string());
        if self.fail_all_constructs {
            return Err(anyhow!("endpoint refused the construct query"));
        }
        // A raw custom query carries no LIMIT/OFFSET from the controller.
        let offset = trailing_clause(query, "OFFSET").unwrap_or(0);
        let limit = trailing_clause(query, "LIMIT").unwrap_or(self.total);
        if self.fail_offsets.contains(&offset) {
            return Err(anyhow!("timeout at offset {offset}"));
        }
        let end = (offset + limit).min(self.total);
        let mut streamed = 0u64;
        for n in offset..end {
            sink(Self::triple_at(n))?;
            streamed += 1;
        }
        Ok(streamed)
    }
}

/// Pull the numeric argument of a `LIMIT`/`OFFSET` clause out of a query.
fn trailing_clause(query: &str, keyword: &str) -> Option<u64> {
    let words: Vec<&str> = query.split_whitespace().collect();
    words
        .windows(2)
        .find(|w| w[0].eq_ignore_ascii_case(keyword))
        .and_then(|w| w[1].parse().ok())
}

/// Read an N-Triples file into its non-empty lines.
pub fn read_nt_lines(path: &Path) -> Vec<String> {
    let f = File::open(path).unwrap();
    let r = BufReader::new(f);
    r.lines()
        .map(|l| l.unwrap())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse an N-Triples file back into triples.
pub fn parse_nt_file(path: &Path) -> Vec<Triple> {
    let f = File::open(path).unwrap();
    oxttl::NTriplesParser::new()
        .for_reader(BufReader::new(f))
        .map(|t| t.unwrap())
        .collect()
}

/// File names (sorted) under a directory.
pub fn dir_file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}
