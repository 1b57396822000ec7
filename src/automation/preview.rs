//! Preview of the latest normalized frame

use super::error::PreviewError;
use image::GrayImage;
use image::imageops::{FilterType, resize};
use std::path::PathBuf;

/// Width the preview is scaled to; height follows the frame's aspect ratio.
pub const PREVIEW_WIDTH: u32 = 480;

/// Display-only consumer of normalized frames.
pub trait PreviewSink: Send + Sync {
    fn show(&mut self, frame: &GrayImage) -> Result<(), PreviewError>;
}

/// Scale a frame to the preview width.
pub fn scale_for_preview(frame: &GrayImage) -> GrayImage {
    let height = (PREVIEW_WIDTH as u64 * frame.height() as u64 / frame.width().max(1) as u64)
        .max(1) as u32;
    resize(frame, PREVIEW_WIDTH, height, FilterType::Triangle)
}

/// Overwrites a PNG file with the most recent preview.
#[derive(Debug, Clone)]
pub struct PngPreviewSink {
    path: PathBuf,
}

impl PngPreviewSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PreviewSink for PngPreviewSink {
    fn show(&mut self, frame: &GrayImage) -> Result<(), PreviewError> {
        scale_for_preview(frame)
            .save_with_format(&self.path, image::ImageFormat::Png)
            .map_err(|source| PreviewError::Write {
                path: self.path.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_preview_keeps_aspect_ratio() {
        let frame = GrayImage::from_pixel(120, 30, Luma([10u8]));
        assert_eq!(scale_for_preview(&frame).dimensions(), (480, 120));

        let sliver = GrayImage::from_pixel(2000, 1, Luma([10u8]));
        assert_eq!(scale_for_preview(&sliver).dimensions(), (480, 1));
    }

    #[test]
    fn test_png_sink_overwrites_latest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.png");
        let mut sink = PngPreviewSink::new(&path);

        sink.show(&GrayImage::from_pixel(48, 24, Luma([0u8]))).unwrap();
        sink.show(&GrayImage::from_pixel(48, 48, Luma([255u8]))).unwrap();

        let stored = image::open(&path).unwrap().to_luma8();
        assert_eq!(stored.dimensions(), (480, 480));
        assert_eq!(stored.get_pixel(0, 0)[0], 255);
    }
}
