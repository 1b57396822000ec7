//! Frame normalization shared by captured frames and reference templates

use super::config::RecognitionConfig;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::edges::canny;
use imageproc::map::map_colors;
use imageproc::stats::cumulative_histogram;

/// A captured region after normalization, ready for correlation.
#[derive(Debug, Clone)]
pub struct Frame {
    pixels: GrayImage,
}

impl Frame {
    pub fn pixels(&self) -> &GrayImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn into_pixels(self) -> GrayImage {
        self.pixels
    }
}

/// Histogram equalization over the full 0-255 range.
///
/// Levels map through `(cdf(v) - cdf_min) * 255 / (N - cdf_min)`, so the
/// darkest occupied level becomes 0 and the brightest 255 regardless of how
/// many pixels each holds. A single-level image is returned unchanged.
pub fn equalize_full_range(gray: &GrayImage) -> GrayImage {
    let cdf = cumulative_histogram(gray).channels[0];
    let total = cdf[255] as u64;
    let cdf_min = cdf.iter().copied().find(|&count| count > 0).unwrap_or(0) as u64;
    if total == cdf_min {
        return gray.clone();
    }

    let span = total - cdf_min;
    let mut lut = [0u8; 256];
    for (level, mapped) in lut.iter_mut().enumerate() {
        let above_min = (cdf[level] as u64).saturating_sub(cdf_min);
        *mapped = ((above_min * 255 + span / 2) / span) as u8;
    }
    map_colors(gray, |p| Luma([lut[p[0] as usize]]))
}

/// Final representation stage, used by both the template store and the
/// preprocessor so the two sides are always either intensities or edge maps.
pub fn to_representation(gray: GrayImage, config: &RecognitionConfig) -> GrayImage {
    if config.use_edges {
        canny(&gray, config.canny_low, config.canny_high)
    } else {
        gray
    }
}

/// Normalizes raw captures: grayscale, histogram equalization, then the shared representation.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    config: RecognitionConfig,
}

impl Preprocessor {
    pub fn new(config: RecognitionConfig) -> Self {
        Self { config }
    }

    pub fn process(&self, raw: &DynamicImage) -> Frame {
        // to_luma8 ignores alpha for RGBA captures
        let gray = raw.to_luma8();
        let equalized = equalize_full_range(&gray);
        Frame {
            pixels: to_representation(equalized, &self.config),
        }
    }

    pub fn config(&self) -> &RecognitionConfig {
        &self.config
    }
}
