//! Error type for `keel-wikidata`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The SPARQL endpoint answered with a non-success status.
  #[error("SPARQL query failed: {0}")]
  UpstreamStatus(u16),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The response body did not have the expected
  /// `results.bindings` structure.
  #[error("malformed SPARQL response: {0}")]
  MalformedResponse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
