//! Glyph recognition for a captured screen region
//!
//! Reference glyphs are loaded once into a [`TemplateStore`]; each captured
//! frame is normalized, correlated against every template and the best score
//! is thresholded into a [`MatchResult`].

pub mod config;
pub mod decision;
pub mod error;
pub mod matcher;
pub mod pipeline;
pub mod preprocess;
pub mod template;


pub use config::RecognitionConfig;
pub use decision::{Command, CommandResolution, CommandTable, DecisionPolicy, MatchResult};
pub use error::{DecodeError, RecognitionError, RecognitionResult};
pub use matcher::{BestMatch, SymbolMatcher};
pub use pipeline::{Recognition, Recognizer};
pub use preprocess::{Frame, Preprocessor};
pub use template::{SkippedTemplate, Template, TemplateStore};
