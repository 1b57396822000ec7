//! Preprocess, match and decide in one call

use super::config::RecognitionConfig;
use super::decision::{CommandResolution, CommandTable, DecisionPolicy, MatchResult};
use super::error::{RecognitionError, RecognitionResult};
use super::matcher::SymbolMatcher;
use super::preprocess::{Frame, Preprocessor};
use super::template::{SkippedTemplate, TemplateStore};
use image::DynamicImage;
use std::path::Path;
use std::sync::Arc;

/// Classification of one captured image.
#[derive(Debug, Clone)]
pub struct Recognition {
    /// Normalized frame, kept for preview
    pub frame: Frame,
    pub result: MatchResult,
}

/// Stateless recognizer; every call is an independent classification.
#[derive(Debug, Clone)]
pub struct Recognizer {
    templates: Arc<TemplateStore>,
    preprocessor: Preprocessor,
    matcher: SymbolMatcher,
    policy: DecisionPolicy,
}

impl Recognizer {
    /// The store must have been built with the same `config` so templates and
    /// frames share one representation.
    pub fn new(templates: Arc<TemplateStore>, config: RecognitionConfig, commands: CommandTable) -> Self {
        let policy = DecisionPolicy::new(config.threshold, commands);
        Self {
            templates,
            preprocessor: Preprocessor::new(config),
            matcher: SymbolMatcher::new(),
            policy,
        }
    }

    /// Load templates from `directory` and build a recognizer over them.
    ///
    /// Fails when the directory cannot be read or yields no usable template.
    pub fn from_directory(
        directory: impl AsRef<Path>,
        config: RecognitionConfig,
        commands: CommandTable,
    ) -> RecognitionResult<(Self, Vec<SkippedTemplate>)> {
        let directory = directory.as_ref();
        let (store, skipped) = TemplateStore::load(directory, &config)?;
        if store.is_empty() {
            return Err(RecognitionError::NoTemplates {
                path: directory.to_path_buf(),
            });
        }
        Ok((Self::new(Arc::new(store), config, commands), skipped))
    }

    pub fn recognize(&self, raw: &DynamicImage) -> Recognition {
        let frame = self.preprocessor.process(raw);
        let best = self.matcher.best_match(&frame, &self.templates);
        let result = self.policy.decide(best);
        Recognition { frame, result }
    }

    pub fn resolve(&self, symbol: &str) -> CommandResolution {
        self.policy.resolve(symbol)
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    pub fn config(&self) -> &RecognitionConfig {
        self.preprocessor.config()
    }
}
