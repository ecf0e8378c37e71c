//! The numeric transforms: edge-preserving smoothing, adaptive local
//! binarization, alpha re-masking.
//!
//! All functions are pure over pixel buffers. Borders are handled by
//! clamping coordinates (replicate-edge), and neighborhood weights are
//! precomputed so the inner loops stay multiply-accumulate only.

use image::{GrayImage, Luma, Rgba, RgbaImage};

fn clamp_coord(v: i64, max: u32) -> u32 {
  v.clamp(0, max as i64 - 1) as u32
}

/// Bilateral filter: a Gaussian blur whose weights are additionally damped
/// by intensity difference, so flat regions smooth while strong edges
/// survive. `diameter` is the full window width; `sigma_color` and
/// `sigma_space` control the two dampings.
pub fn bilateral_filter(
  src: &GrayImage,
  diameter: u32,
  sigma_color: f32,
  sigma_space: f32,
) -> GrayImage {
  let radius = (diameter / 2) as i64;
  let (width, height) = src.dimensions();

  // exp(-d^2 / 2s^2) lookup tables: one over the window, one over the 256
  // possible intensity differences.
  let space_coeff = -0.5 / (sigma_space * sigma_space);
  let color_coeff = -0.5 / (sigma_color * sigma_color);

  let window = (2 * radius + 1) as usize;
  let mut spatial = vec![0.0f32; window * window];
  for dy in -radius..=radius {
    for dx in -radius..=radius {
      let d2 = (dx * dx + dy * dy) as f32;
      spatial[((dy + radius) * (2 * radius + 1) + (dx + radius)) as usize] =
        (d2 * space_coeff).exp();
    }
  }
  let color: Vec<f32> = (0..256)
    .map(|d| ((d * d) as f32 * color_coeff).exp())
    .collect();

  let mut out = GrayImage::new(width, height);
  for y in 0..height {
    for x in 0..width {
      let center = src.get_pixel(x, y)[0] as i32;
      let mut sum = 0.0f32;
      let mut norm = 0.0f32;
      for dy in -radius..=radius {
        for dx in -radius..=radius {
          let nx = clamp_coord(x as i64 + dx, width);
          let ny = clamp_coord(y as i64 + dy, height);
          let value = src.get_pixel(nx, ny)[0] as i32;
          let weight = spatial
            [((dy + radius) * (2 * radius + 1) + (dx + radius)) as usize]
            * color[(value - center).unsigned_abs() as usize];
          sum += weight * value as f32;
          norm += weight;
        }
      }
      out.put_pixel(x, y, Luma([(sum / norm).round().clamp(0.0, 255.0) as u8]));
    }
  }
  out
}

/// 1-D Gaussian kernel of `size` taps. Sigma follows the usual convention
/// for deriving it from a kernel size: `0.3 * ((size - 1) * 0.5 - 1) + 0.8`.
fn gaussian_kernel(size: u32) -> Vec<f32> {
  let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
  let coeff = -0.5 / (sigma * sigma);
  let radius = (size / 2) as i64;
  let mut kernel: Vec<f32> =
    (-radius..=radius).map(|d| ((d * d) as f32 * coeff).exp()).collect();
  let total: f32 = kernel.iter().sum();
  for k in &mut kernel {
    *k /= total;
  }
  kernel
}

/// Separable Gaussian-weighted local mean with replicate-edge borders.
fn gaussian_local_mean(src: &GrayImage, block_size: u32) -> Vec<f32> {
  let (width, height) = src.dimensions();
  let kernel = gaussian_kernel(block_size);
  let radius = (block_size / 2) as i64;

  // Horizontal pass.
  let mut rows = vec![0.0f32; (width * height) as usize];
  for y in 0..height {
    for x in 0..width {
      let mut acc = 0.0;
      for (i, k) in kernel.iter().enumerate() {
        let nx = clamp_coord(x as i64 + i as i64 - radius, width);
        acc += k * src.get_pixel(nx, y)[0] as f32;
      }
      rows[(y * width + x) as usize] = acc;
    }
  }

  // Vertical pass.
  let mut means = vec![0.0f32; (width * height) as usize];
  for y in 0..height {
    for x in 0..width {
      let mut acc = 0.0;
      for (i, k) in kernel.iter().enumerate() {
        let ny = clamp_coord(y as i64 + i as i64 - radius, height);
        acc += k * rows[(ny * width + x) as usize];
      }
      means[(y * width + x) as usize] = acc;
    }
  }
  means
}

/// Adaptive local binarization: each pixel is compared against the
/// Gaussian-weighted mean of its `block_size` neighborhood minus `offset`.
/// Local thresholds cope with the uneven illumination of photographs where
/// a single global threshold cannot. `block_size` must be odd.
pub fn adaptive_threshold(
  src: &GrayImage,
  block_size: u32,
  offset: f32,
) -> GrayImage {
  assert!(block_size % 2 == 1, "neighborhood size must be odd");
  let (width, height) = src.dimensions();
  let means = gaussian_local_mean(src, block_size);

  let mut out = GrayImage::new(width, height);
  for y in 0..height {
    for x in 0..width {
      let value = src.get_pixel(x, y)[0] as f32;
      let threshold = means[(y * width + x) as usize] - offset;
      let bit = if value > threshold { 255 } else { 0 };
      out.put_pixel(x, y, Luma([bit]));
    }
  }
  out
}

/// Re-apply the segmentation mask and flatten: where the original alpha is
/// below `alpha_cutoff` the pixel is background (opaque white); everywhere
/// else the binarized luminance is kept at full opacity. The result is a
/// single flattened silhouette with no transparency artifacts.
pub fn remask_and_flatten(
  binary: &GrayImage,
  original: &RgbaImage,
  alpha_cutoff: u8,
) -> RgbaImage {
  let (width, height) = binary.dimensions();
  let mut out = RgbaImage::new(width, height);
  for y in 0..height {
    for x in 0..width {
      let alpha = original.get_pixel(x, y)[3];
      let pixel = if alpha < alpha_cutoff {
        Rgba([255, 255, 255, 255])
      } else {
        let v = binary.get_pixel(x, y)[0];
        Rgba([v, v, v, 255])
      };
      out.put_pixel(x, y, pixel);
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  fn uniform(width: u32, height: u32, value: u8) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([value]))
  }

  #[test]
  fn bilateral_preserves_a_uniform_image() {
    let img = uniform(16, 16, 120);
    let out = bilateral_filter(&img, 9, 75.0, 75.0);
    assert!(out.pixels().all(|p| p[0] == 120));
  }

  #[test]
  fn bilateral_preserves_a_hard_edge() {
    // Left half dark, right half light; the edge column must not bleed by
    // more than a small amount.
    let img = GrayImage::from_fn(32, 8, |x, _| {
      if x < 16 { Luma([20]) } else { Luma([235]) }
    });
    let out = bilateral_filter(&img, 9, 30.0, 75.0);
    assert!(out.get_pixel(0, 4)[0] <= 25);
    assert!(out.get_pixel(31, 4)[0] >= 230);
    // Pixels adjacent to the edge keep their side's intensity family.
    assert!(out.get_pixel(15, 4)[0] < 128);
    assert!(out.get_pixel(16, 4)[0] > 128);
  }

  #[test]
  fn threshold_of_a_uniform_image_is_all_white() {
    // value > mean - offset holds everywhere on a flat image.
    let img = uniform(20, 20, 100);
    let out = adaptive_threshold(&img, 11, 2.0);
    assert!(out.pixels().all(|p| p[0] == 255));
  }

  #[test]
  fn threshold_marks_dark_details_black() {
    let mut img = uniform(21, 21, 200);
    img.put_pixel(10, 10, Luma([10]));
    let out = adaptive_threshold(&img, 11, 2.0);
    assert_eq!(out.get_pixel(10, 10)[0], 0);
    assert_eq!(out.get_pixel(0, 0)[0], 255);
  }

  #[test]
  #[should_panic(expected = "odd")]
  fn even_block_size_is_rejected() {
    let img = uniform(4, 4, 0);
    adaptive_threshold(&img, 10, 2.0);
  }

  #[test]
  fn remask_forces_background_white_and_everything_opaque() {
    let binary = GrayImage::from_fn(4, 1, |x, _| {
      if x % 2 == 0 { Luma([0]) } else { Luma([255]) }
    });
    // First two pixels transparent (background), last two opaque.
    let original = RgbaImage::from_fn(4, 1, |x, _| {
      if x < 2 { Rgba([9, 9, 9, 0]) } else { Rgba([9, 9, 9, 255]) }
    });
    let out = remask_and_flatten(&binary, &original, 128);
    assert_eq!(out.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
    assert_eq!(out.get_pixel(1, 0), &Rgba([255, 255, 255, 255]));
    assert_eq!(out.get_pixel(2, 0), &Rgba([0, 0, 0, 255]));
    assert_eq!(out.get_pixel(3, 0), &Rgba([255, 255, 255, 255]));
  }

  #[test]
  fn gaussian_kernel_is_normalized_and_symmetric() {
    let k = gaussian_kernel(11);
    assert_eq!(k.len(), 11);
    let sum: f32 = k.iter().sum();
    assert!((sum - 1.0).abs() < 1e-5);
    for i in 0..5 {
      assert!((k[i] - k[10 - i]).abs() < 1e-6);
    }
  }
}
