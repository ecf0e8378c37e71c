//! Error type for `keel-lineart`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The photo download answered with a non-success status.
  #[error("failed to download image: {0}")]
  DownloadStatus(u16),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("image decode/encode error: {0}")]
  Image(#[from] image::ImageError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
