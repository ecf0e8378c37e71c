//! SPARQL execution — the sole network dependency of selection.

use std::{collections::HashMap, future::Future, time::Duration};

use serde::Deserialize;

use crate::{Error, Result, USER_AGENT};

/// One cell of a result row. The endpoint also sends `type`/`datatype`
/// fields; only the lexical value matters here.
#[derive(Debug, Clone, Deserialize)]
pub struct Cell {
  pub value: String,
}

/// One row of tabular bindings, keyed by variable name (without the `?`).
pub type Row = HashMap<String, Cell>;

#[derive(Debug, Deserialize)]
struct SparqlResponse {
  results: SparqlResults,
}

#[derive(Debug, Deserialize)]
struct SparqlResults {
  bindings: Vec<Row>,
}

/// Executes a query string and returns its rows.
///
/// Deliberately retry-free: retry policy belongs to the selector, which
/// alone knows whether a retry should target the same or a fresh offset.
pub trait SparqlClient: Send + Sync {
  fn execute<'a>(
    &'a self,
    query: &'a str,
  ) -> impl Future<Output = Result<Vec<Row>>> + Send + 'a;
}

/// [`SparqlClient`] backed by HTTP GET against a real endpoint.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpSparqlClient {
  client:   reqwest::Client,
  endpoint: String,
}

impl HttpSparqlClient {
  pub const DEFAULT_ENDPOINT: &'static str =
    "https://query.wikidata.org/sparql";

  pub fn new() -> Result<Self> {
    Self::with_endpoint(Self::DEFAULT_ENDPOINT)
  }

  pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self> {
    let client = reqwest::Client::builder()
      .user_agent(USER_AGENT)
      .timeout(Duration::from_secs(60))
      .build()?;
    Ok(Self {
      client,
      endpoint: endpoint.into(),
    })
  }
}

impl SparqlClient for HttpSparqlClient {
  async fn execute(&self, query: &str) -> Result<Vec<Row>> {
    let resp = self
      .client
      .get(&self.endpoint)
      .query(&[("query", query), ("format", "json")])
      .header("Accept", "application/sparql-results+json")
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      return Err(Error::UpstreamStatus(status.as_u16()));
    }

    let body: SparqlResponse = resp
      .json()
      .await
      .map_err(|e| Error::MalformedResponse(e.to_string()))?;
    Ok(body.results.bindings)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn response_shape_deserialises() {
    let json = r#"{
      "results": {
        "bindings": [
          { "count": { "type": "literal", "value": "17" } }
        ]
      }
    }"#;
    let parsed: SparqlResponse = serde_json::from_str(json).unwrap();
    assert_eq!(parsed.results.bindings.len(), 1);
    assert_eq!(parsed.results.bindings[0]["count"].value, "17");
  }
}
