// Recognition loop module
// Drives periodic capture of a screen region through the recognizer and
// forwards recognized commands to a key-injection collaborator.

pub mod capture;
pub mod channels;
pub mod cycle;
pub mod error;
pub mod preview;
pub mod runner;
pub mod sink;
pub mod types;

// Re-export the main types and functions for easy access
pub use capture::{FrameSource, ImageFileSource};
#[cfg(feature = "screen-capture")]
pub use capture::XcapFrameSource;
pub use channels::{ControlHandle, RunnerEndpoints, create_automation_channels};
pub use cycle::RecognitionCycle;
pub use error::{CaptureError, InjectionError, PreviewError};
pub use preview::{PngPreviewSink, PreviewSink};
pub use runner::AutomationRunner;
pub use sink::{CommandKeyInjector, CommandSink, KeyInjector, LogKeyInjector};
pub use types::{AutomationCommand, AutomationEvent, CycleOutcome, Region, RunnerState};
