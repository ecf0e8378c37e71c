//! Line-art rendering: an arbitrary photograph in, a base64-encoded
//! silhouette PNG out.
//!
//! Stage order is fixed: download, normalize, optional background
//! segmentation, grayscale, edge-preserving smoothing, adaptive local
//! binarization, alpha re-masking, flatten, encode. Segmentation degrades
//! gracefully — a missing or failing segmenter yields line art over the
//! full frame instead of an error. Stage parameters are tunable constants;
//! only structural determinism (same stages, same order, same parameters)
//! is guaranteed across revisions.

#![allow(async_fn_in_trait)]

pub mod error;
pub mod filter;
pub mod segment;

pub use error::{Error, Result};
pub use segment::{HttpSegmenter, Segmenter};

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use image::{DynamicImage, RgbaImage, imageops::FilterType};
use tracing::{debug, info, warn};

use crate::filter::{adaptive_threshold, bilateral_filter, remask_and_flatten};

const USER_AGENT: &str =
  "Mozilla/5.0 (compatible; KeelGame/1.0; +https://github.com/keel-game)";

/// Tunable stage parameters. The defaults are the production values.
#[derive(Debug, Clone)]
pub struct LineArtOptions {
  /// Images wider than this are downscaled; narrower ones are never
  /// upscaled.
  pub max_width:             u32,
  /// Bilateral filter diameter (pixels).
  pub bilateral_diameter:    u32,
  /// Bilateral color-similarity sigma.
  pub bilateral_sigma_color: f32,
  /// Bilateral spatial-extent sigma.
  pub bilateral_sigma_space: f32,
  /// Adaptive-threshold neighborhood size; must be odd.
  pub threshold_block_size:  u32,
  /// Constant subtracted from the local mean before comparison.
  pub threshold_offset:      f32,
  /// Pixels whose pre-grayscale alpha falls below this are background.
  pub alpha_cutoff:          u8,
}

impl Default for LineArtOptions {
  fn default() -> Self {
    Self {
      max_width:             800,
      bilateral_diameter:    9,
      bilateral_sigma_color: 75.0,
      bilateral_sigma_space: 75.0,
      threshold_block_size:  11,
      threshold_offset:      2.0,
      alpha_cutoff:          128,
    }
  }
}

/// The full pipeline: download plus [`render_from_bytes`].
///
/// `segmenter` is the optional background-removal collaborator; `None`
/// renders without segmentation.
pub struct LineArtRenderer<S> {
  client:    reqwest::Client,
  segmenter: Option<S>,
  options:   LineArtOptions,
}

impl<S: Segmenter> LineArtRenderer<S> {
  pub fn new(segmenter: Option<S>) -> Result<Self> {
    Self::with_options(segmenter, LineArtOptions::default())
  }

  pub fn with_options(
    segmenter: Option<S>,
    options: LineArtOptions,
  ) -> Result<Self> {
    assert!(
      options.threshold_block_size % 2 == 1,
      "neighborhood size must be odd"
    );
    let client = reqwest::Client::builder()
      .user_agent(USER_AGENT)
      .timeout(Duration::from_secs(60))
      .build()?;
    Ok(Self {
      client,
      segmenter,
      options,
    })
  }

  /// Download the photo and render it. Download and decode failures are
  /// fatal; segmentation failures are not.
  pub async fn render(&self, photo_url: &str) -> Result<String> {
    info!(url = photo_url, "downloading source photograph");
    let resp = self
      .client
      .get(photo_url)
      .header("Accept", "image/*,*/*")
      .send()
      .await?;
    let status = resp.status();
    if !status.is_success() {
      return Err(Error::DownloadStatus(status.as_u16()));
    }
    let bytes = resp.bytes().await?;
    self.render_from_bytes(&bytes).await
  }

  /// Stages 2-8 over already-downloaded bytes. Exposed separately so the
  /// deterministic part of the pipeline is testable without network.
  pub async fn render_from_bytes(&self, bytes: &[u8]) -> Result<String> {
    let normalized = normalize(image::load_from_memory(bytes)?, self.options.max_width);

    let segmented = match &self.segmenter {
      None => normalized,
      Some(segmenter) => {
        let png = encode_png(&normalized)?;
        match segmenter.remove_background(&png).await {
          Ok(masked_png) => match image::load_from_memory(&masked_png) {
            Ok(img) => img.to_rgba8(),
            Err(e) => {
              warn!(error = %e, "segmenter returned undecodable image, continuing un-segmented");
              normalized
            }
          },
          Err(e) => {
            warn!(error = %e, "background segmentation failed, continuing un-segmented");
            normalized
          }
        }
      }
    };

    let encoded = render_line_art(&segmented, &self.options)?;
    debug!(len = encoded.len(), "rendered line art");
    Ok(encoded)
  }
}

/// Stage 2: bounded resize (no upscaling), RGBA8 in sRGB layout.
fn normalize(img: DynamicImage, max_width: u32) -> RgbaImage {
  let img = if img.width() > max_width {
    let height =
      (img.height() as u64 * max_width as u64 / img.width() as u64).max(1);
    img.resize(max_width, height as u32, FilterType::CatmullRom)
  } else {
    img
  };
  img.to_rgba8()
}

/// Stages 4-8: the deterministic pure transforms.
fn render_line_art(rgba: &RgbaImage, options: &LineArtOptions) -> Result<String> {
  let gray = image::DynamicImage::ImageRgba8(rgba.clone()).to_luma8();
  let smoothed = bilateral_filter(
    &gray,
    options.bilateral_diameter,
    options.bilateral_sigma_color,
    options.bilateral_sigma_space,
  );
  let binary = adaptive_threshold(
    &smoothed,
    options.threshold_block_size,
    options.threshold_offset,
  );
  let flattened = remask_and_flatten(&binary, rgba, options.alpha_cutoff);
  let png = encode_png(&flattened)?;
  Ok(B64.encode(png))
}

fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
  let mut out = Vec::new();
  image::DynamicImage::ImageRgba8(img.clone())
    .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)?;
  Ok(out)
}
