use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain a frame for one cycle.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Failed to read capture source {path:?}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error(
        "Region {left},{top} {width}x{height} lies outside the {image_width}x{image_height} capture"
    )]
    RegionOutOfBounds {
        left: u32,
        top: u32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },

    #[error("Capture backend error: {description}")]
    Backend { description: String },
}

/// Failure to deliver a simulated key press.
#[derive(Debug, Error)]
pub enum InjectionError {
    #[error("Failed to launch key command '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("Key command '{program}' exited with {status}")]
    CommandFailed {
        program: String,
        status: std::process::ExitStatus,
    },

    #[error("Key command is empty")]
    EmptyCommand,

    #[error("Key injection backend error: {description}")]
    Backend { description: String },
}

/// Failure to show or store the preview frame.
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Failed to write preview {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: image::ImageError,
    },
}
