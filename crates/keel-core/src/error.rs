//! Error types for `keel-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown game mode: {0:?}")]
  UnknownMode(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
