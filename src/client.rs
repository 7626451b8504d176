//! SPARQL protocol client: a trait seam for the controller, and the blocking
//! HTTP implementation used by the binary.

use anyhow::{anyhow, bail, Context, Result};
use oxrdf::Triple;
use oxttl::NTriplesParser;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// User agent for all endpoint requests.
const CLIENT_USER_AGENT: &str = concat!("sparql-dump/", env!("CARGO_PKG_VERSION"));

/// Default request timeout. Large batches against loaded endpoints are slow;
/// this is a transport backstop, not a pagination knob.
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// What the pagination controller needs from an endpoint: evaluate a count
/// SELECT, and stream a CONSTRUCT result triple-by-triple into a sink.
///
/// Calls are strictly sequential and blocking; the controller never issues
/// overlapping requests.
pub trait SparqlClient {
    /// Evaluate a `SELECT (COUNT(*) AS ?count) ...` query and return the count.
    fn select_count(&self, query: &str) -> Result<u64>;

    /// Evaluate a CONSTRUCT query, feeding every resulting triple to `sink`
    /// as it is parsed. Returns the number of triples streamed.
    fn construct(
        &self,
        query: &str,
        sink: &mut dyn FnMut(Triple) -> Result<()>,
    ) -> Result<u64>;
}

/// SPARQL 1.1 Protocol over HTTP: form-encoded POST of the query, JSON
/// results for SELECT, N-Triples for CONSTRUCT, optional basic auth.
pub struct HttpSparqlClient {
    http: reqwest::blocking::Client,
    endpoint: Url,
    auth: Option<(String, String)>,
}

impl HttpSparqlClient {
    pub fn new(endpoint: &str, user: Option<&str>, password: Option<&str>) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .with_context(|| format!("invalid SPARQL endpoint URL: {endpoint}"))?;
        let http = reqwest::blocking::Client::builder()
            .user_agent(CLIENT_USER_AGENT)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("building HTTP client")?;
        // Both halves must be present for basic auth, matching the original tool.
        let auth = match (user, password) {
            (Some(u), Some(p)) => {
                tracing::debug!("using basic authentication");
                Some((u.to_string(), p.to_string()))
            }
            _ => None,
        };
        Ok(Self { http, endpoint, auth })
    }

    fn post_query(&self, query: &str, accept: &str) -> Result<reqwest::blocking::Response> {
        let mut req = self
            .http
            .post(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, accept)
            .form(&[("query", query)]);
        if let Some((user, password)) = &self.auth {
            req = req.basic_auth(user, Some(password));
        }
        let resp = req
            .send()
            .with_context(|| format!("query against {}", self.endpoint))?;
        resp.error_for_status()
            .with_context(|| format!("endpoint {} rejected the query", self.endpoint))
    }
}

impl SparqlClient for HttpSparqlClient {
    fn select_count(&self, query: &str) -> Result<u64> {
        let resp = self.post_query(query, "application/sparql-results+json")?;
        let results: SelectResults =
            serde_json::from_reader(resp).context("parsing SPARQL JSON results")?;
        let binding = results
            .results
            .bindings
            .first()
            .and_then(|row| row.get("count"))
            .ok_or_else(|| anyhow!("count query returned no ?count binding"))?;
        binding
            .value
            .trim()
            .parse::<u64>()
            .with_context(|| format!("non-numeric ?count value: {:?}", binding.value))
    }

    fn construct(
        &self,
        query: &str,
        sink: &mut dyn FnMut(Triple) -> Result<()>,
    ) -> Result<u64> {
        let resp = self.post_query(query, "application/n-triples")?;
        let mut streamed = 0u64;
        for parsed in NTriplesParser::new().for_reader(resp) {
            let triple = parsed.context("parsing N-Triples response body")?;
            sink(triple)?;
            streamed += 1;
        }
        Ok(streamed)
    }
}

/// The slice of the SPARQL 1.1 JSON results format the count query needs.
#[derive(Deserialize)]
struct SelectResults {
    results: SelectBindings,
}

#[derive(Deserialize)]
struct SelectBindings {
    bindings: Vec<HashMap<String, BindingValue>>,
}

#[derive(Deserialize)]
struct BindingValue {
    value: String,
}

/// Reject obviously unusable endpoints early, before any file is touched.
pub fn check_endpoint(endpoint: &str) -> Result<()> {
    let url = Url::parse(endpoint).with_context(|| format!("invalid endpoint URL: {endpoint}"))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        bail!("endpoint must be http(s), got {}", url.scheme());
    }
    Ok(())
}
