use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for template loading and recognition setup.
pub type RecognitionResult<T> = Result<T, RecognitionError>;

/// Errors raised while building the recognition pipeline.
#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("Template directory {path:?} could not be read: {source}")]
    TemplateDirUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Template directory {path:?} contains no usable templates")]
    NoTemplates { path: PathBuf },

    #[error("Threshold {value} is outside the correlation range [-1, 1]")]
    InvalidThreshold { value: f32 },
}

/// Why a single template file was left out of the store.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Failed to decode image: {source}")]
    Image {
        #[from]
        source: image::ImageError,
    },

    #[error("File name has no usable stem")]
    MissingName,

    #[error("Image has zero width or height")]
    EmptyImage,

    #[error("Symbol '{name}' is provided by a later file")]
    DuplicateName { name: String },
}
