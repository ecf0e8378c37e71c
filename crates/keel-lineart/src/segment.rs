//! Background segmentation — the one stage delegated to an external
//! collaborator.
//!
//! The collaborator receives the normalized PNG and returns a PNG whose
//! background pixels have been made transparent. It is deliberately
//! optional: an unconfigured or failing segmenter downgrades the pipeline
//! to un-segmented input rather than failing the run.

use std::{future::Future, time::Duration};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SegmentError {
  #[error("segmentation service returned status {0}")]
  Status(u16),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),
}

/// Makes background pixels transparent in a PNG.
pub trait Segmenter: Send + Sync {
  fn remove_background<'a>(
    &'a self,
    png: &'a [u8],
  ) -> impl Future<Output = Result<Vec<u8>, SegmentError>> + Send + 'a;
}

/// [`Segmenter`] backed by a remote HTTP matting service: POST the PNG,
/// receive a PNG with alpha back.
#[derive(Clone)]
pub struct HttpSegmenter {
  client:   reqwest::Client,
  endpoint: String,
  api_key:  Option<String>,
}

impl HttpSegmenter {
  pub fn new(
    endpoint: impl Into<String>,
    api_key: Option<String>,
  ) -> Result<Self, SegmentError> {
    // Matting models can be slow; allow a generous window.
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(120))
      .build()?;
    Ok(Self {
      client,
      endpoint: endpoint.into(),
      api_key,
    })
  }
}

impl Segmenter for HttpSegmenter {
  async fn remove_background(&self, png: &[u8]) -> Result<Vec<u8>, SegmentError> {
    let mut req = self
      .client
      .post(&self.endpoint)
      .header("Content-Type", "image/png")
      .header("Accept", "image/png")
      .body(png.to_vec());
    if let Some(key) = &self.api_key {
      req = req.header("X-Api-Key", key);
    }

    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
      return Err(SegmentError::Status(status.as_u16()));
    }
    Ok(resp.bytes().await?.to_vec())
  }
}
