//! Error type for `keel-clues`.
//!
//! Summary-fetch failures are recoverable by design: the synthesizer logs
//! them and degrades to "no trivia" rather than failing the run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The summary service answered with an unexpected non-success status
  /// (404 is a normal "no summary" outcome, not an error).
  #[error("summary fetch failed: {0}")]
  UpstreamStatus(u16),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
