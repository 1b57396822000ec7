//! Frame sources for the recognition loop

use super::error::CaptureError;
use super::types::Region;
use image::DynamicImage;
use std::path::{Path, PathBuf};

/// Supplies a raw image of the sampled region on demand.
pub trait FrameSource: Send + Sync {
    /// Capture `region`, or the whole source when `None`.
    fn capture(&mut self, region: Option<&Region>) -> Result<DynamicImage, CaptureError>;
}

/// Crop `region` out of a full capture.
pub fn crop_region(image: &DynamicImage, region: &Region) -> Result<DynamicImage, CaptureError> {
    if !region.fits_within(image.width(), image.height()) {
        return Err(CaptureError::RegionOutOfBounds {
            left: region.left,
            top: region.top,
            width: region.width,
            height: region.height,
            image_width: image.width(),
            image_height: image.height(),
        });
    }
    Ok(image.crop_imm(region.left, region.top, region.width, region.height))
}

/// Reads a screenshot file on every capture, so an external tool can keep
/// overwriting it with fresh screen contents.
#[derive(Debug, Clone)]
pub struct ImageFileSource {
    path: PathBuf,
}

impl ImageFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSource for ImageFileSource {
    fn capture(&mut self, region: Option<&Region>) -> Result<DynamicImage, CaptureError> {
        let full = image::open(&self.path).map_err(|source| CaptureError::SourceUnreadable {
            path: self.path.clone(),
            source,
        })?;
        match region {
            Some(region) => crop_region(&full, region),
            None => Ok(full),
        }
    }
}

/// Grabs one monitor of the live display on every capture.
///
/// Monitors are enumerated per capture, so a reconnected display is picked up
/// again by index.
#[cfg(feature = "screen-capture")]
#[derive(Debug, Clone)]
pub struct XcapFrameSource {
    monitor_index: usize,
}

#[cfg(feature = "screen-capture")]
impl XcapFrameSource {
    pub fn new(monitor_index: usize) -> Self {
        Self { monitor_index }
    }

    pub fn monitor_index(&self) -> usize {
        self.monitor_index
    }
}

#[cfg(feature = "screen-capture")]
impl FrameSource for XcapFrameSource {
    fn capture(&mut self, region: Option<&Region>) -> Result<DynamicImage, CaptureError> {
        let backend = |e: xcap::XCapError| CaptureError::Backend {
            description: e.to_string(),
        };
        let monitor = xcap::Monitor::all()
            .map_err(backend)?
            .into_iter()
            .nth(self.monitor_index)
            .ok_or_else(|| CaptureError::Backend {
                description: format!("monitor {} not found", self.monitor_index),
            })?;
        let full = DynamicImage::ImageRgba8(monitor.capture_image().map_err(backend)?);
        match region {
            Some(region) => crop_region(&full, region),
            None => Ok(full),
        }
    }
}
