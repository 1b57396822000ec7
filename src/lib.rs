pub mod args;
pub mod automation;
pub mod recognition;

pub use automation::{AutomationRunner, RecognitionCycle};
pub use recognition::{Recognizer, TemplateStore};
