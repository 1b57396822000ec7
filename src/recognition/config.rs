//! Configuration for glyph recognition

use super::error::{RecognitionError, RecognitionResult};

/// Default acceptance threshold for the best correlation score.
pub const DEFAULT_THRESHOLD: f32 = 0.75;
/// Canny hysteresis thresholds on the 0-255 intensity scale.
pub const DEFAULT_CANNY_LOW: f32 = 50.0;
pub const DEFAULT_CANNY_HIGH: f32 = 150.0;

#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionConfig {
    /// Minimum best score (-1.0 to 1.0) for a symbol to be accepted
    pub threshold: f32,
    /// Match edge maps instead of raw intensities (applies to templates and frames alike)
    pub use_edges: bool,
    /// Lower Canny hysteresis threshold
    pub canny_low: f32,
    /// Upper Canny hysteresis threshold
    pub canny_high: f32,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            use_edges: true,
            canny_low: DEFAULT_CANNY_LOW,
            canny_high: DEFAULT_CANNY_HIGH,
        }
    }
}

impl RecognitionConfig {
    /// Configuration that compares raw equalized intensities.
    pub fn intensity() -> Self {
        Self {
            use_edges: false,
            ..Self::default()
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> RecognitionResult<Self> {
        if !(-1.0..=1.0).contains(&threshold) {
            return Err(RecognitionError::InvalidThreshold { value: threshold });
        }
        self.threshold = threshold;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_recognition_constants() {
        let config = RecognitionConfig::default();
        assert_eq!(config.threshold, 0.75);
        assert!(config.use_edges);
        assert_eq!(config.canny_low, 50.0);
        assert_eq!(config.canny_high, 150.0);
    }

    #[test]
    fn test_threshold_outside_range_rejected() {
        assert!(RecognitionConfig::default().with_threshold(1.5).is_err());
        assert!(RecognitionConfig::default().with_threshold(f32::NAN).is_err());
        let config = RecognitionConfig::intensity().with_threshold(0.6).unwrap();
        assert_eq!(config.threshold, 0.6);
        assert!(!config.use_edges);
    }
}
