//! One capture, preprocess, match, decide, act iteration

use super::capture::FrameSource;
use super::preview::PreviewSink;
use super::sink::CommandSink;
use super::types::{CycleOutcome, Region};
use crate::recognition::Recognizer;

/// Everything a single classification cycle needs.
///
/// Holds no results between runs: each call classifies the current capture
/// on its own.
pub struct RecognitionCycle {
    recognizer: Recognizer,
    source: Box<dyn FrameSource>,
    region: Option<Region>,
    sink: CommandSink,
    preview: Option<Box<dyn PreviewSink>>,
}

impl RecognitionCycle {
    pub fn new(
        recognizer: Recognizer,
        source: Box<dyn FrameSource>,
        region: Option<Region>,
        sink: CommandSink,
    ) -> Self {
        Self {
            recognizer,
            source,
            region,
            sink,
            preview: None,
        }
    }

    pub fn with_preview(mut self, preview: Box<dyn PreviewSink>) -> Self {
        self.preview = Some(preview);
        self
    }

    pub fn set_region(&mut self, region: Option<Region>) {
        self.region = region;
    }

    pub fn sink_mut(&mut self) -> &mut CommandSink {
        &mut self.sink
    }

    pub fn recognizer(&self) -> &Recognizer {
        &self.recognizer
    }

    pub fn run_once(&mut self) -> CycleOutcome {
        let raw = match self.source.capture(self.region.as_ref()) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("📸 Capture failed: {}", e);
                return CycleOutcome::CaptureFailed {
                    reason: e.to_string(),
                };
            }
        };

        let recognition = self.recognizer.recognize(&raw);

        let outcome = match recognition.result.symbol.as_deref() {
            Some(symbol) => {
                let command = self.recognizer.resolve(symbol);
                let key_sent = self.sink.dispatch(command);
                CycleOutcome::Recognized {
                    result: recognition.result.clone(),
                    command,
                    key_sent,
                }
            }
            None => CycleOutcome::NoMatch {
                score: recognition.result.score,
            },
        };

        if let Some(preview) = self.preview.as_mut()
            && let Err(e) = preview.show(recognition.frame.pixels())
        {
            log::warn!("Preview update failed: {}", e);
        }

        log::debug!("🔍 {}", outcome);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::error::{CaptureError, InjectionError, PreviewError};
    use crate::automation::sink::KeyInjector;
    use crate::recognition::{
        Command, CommandResolution, CommandTable, RecognitionConfig, Template, TemplateStore,
    };
    use image::{DynamicImage, GrayImage, Luma};
    use std::sync::{Arc, Mutex};

    fn bars(vertical: bool) -> GrayImage {
        GrayImage::from_fn(20, 20, |x, y| {
            let coord = if vertical { x } else { y };
            Luma([if (coord / 4) % 2 == 0 { 0u8 } else { 255u8 }])
        })
    }

    struct StaticSource(Option<GrayImage>);

    impl FrameSource for StaticSource {
        fn capture(&mut self, _region: Option<&Region>) -> Result<DynamicImage, CaptureError> {
            self.0
                .clone()
                .map(DynamicImage::ImageLuma8)
                .ok_or_else(|| CaptureError::Backend {
                    description: "display gone".to_string(),
                })
        }
    }

    #[derive(Clone, Default)]
    struct RecordingInjector {
        pressed: Arc<Mutex<Vec<String>>>,
    }

    impl KeyInjector for RecordingInjector {
        fn press(&self, key: &str) -> Result<(), InjectionError> {
            self.pressed.lock().unwrap().push(key.to_string());
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct CountingPreview {
        shown: Arc<Mutex<usize>>,
    }

    impl PreviewSink for CountingPreview {
        fn show(&mut self, _frame: &GrayImage) -> Result<(), PreviewError> {
            *self.shown.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn recognizer() -> Recognizer {
        let store = TemplateStore::from_templates(vec![
            Template::new("A", bars(true)),
            Template::new("B", bars(false)),
        ]);
        Recognizer::new(
            Arc::new(store),
            RecognitionConfig::intensity(),
            CommandTable::default(),
        )
    }

    fn cycle_for(frame: Option<GrayImage>, send_keys: bool) -> (RecognitionCycle, RecordingInjector) {
        let injector = RecordingInjector::default();
        let sink = CommandSink::new(Box::new(injector.clone()), send_keys);
        let cycle = RecognitionCycle::new(recognizer(), Box::new(StaticSource(frame)), None, sink);
        (cycle, injector)
    }

    #[test]
    fn test_recognized_a_presses_left_once_per_cycle() {
        let (mut cycle, injector) = cycle_for(Some(bars(true)), true);

        let outcome = cycle.run_once();
        assert_eq!(outcome.symbol(), Some("A"));
        assert!(matches!(
            outcome,
            CycleOutcome::Recognized {
                command: CommandResolution::Mapped(Command::Left),
                key_sent: true,
                ..
            }
        ));
        assert_eq!(*injector.pressed.lock().unwrap(), vec!["left".to_string()]);

        cycle.run_once();
        assert_eq!(injector.pressed.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_keys_not_sent_when_disabled() {
        let (mut cycle, injector) = cycle_for(Some(bars(false)), false);
        let outcome = cycle.run_once();
        assert_eq!(outcome.symbol(), Some("B"));
        assert!(injector.pressed.lock().unwrap().is_empty());

        cycle.sink_mut().set_send_keys(true);
        cycle.run_once();
        assert_eq!(*injector.pressed.lock().unwrap(), vec!["right".to_string()]);
    }

    #[test]
    fn test_unmatched_frame_reports_near_miss() {
        let noise = GrayImage::from_fn(20, 20, |x, y| Luma([((x * 31 + y * 17) % 256) as u8]));
        let (mut cycle, injector) = cycle_for(Some(noise), true);
        let outcome = cycle.run_once();
        match outcome {
            CycleOutcome::NoMatch { score } => assert!(score < 0.75),
            other => panic!("expected no match, got {other:?}"),
        }
        assert!(injector.pressed.lock().unwrap().is_empty());
    }

    #[test]
    fn test_capture_failure_is_distinct_outcome() {
        let (mut cycle, injector) = cycle_for(None, true);
        let outcome = cycle.run_once();
        assert!(matches!(outcome, CycleOutcome::CaptureFailed { .. }));
        assert!(injector.pressed.lock().unwrap().is_empty());
    }

    #[test]
    fn test_preview_receives_every_processed_frame() {
        let (cycle, _) = cycle_for(Some(bars(true)), false);
        let preview = CountingPreview::default();
        let mut cycle = cycle.with_preview(Box::new(preview.clone()));
        cycle.run_once();
        cycle.run_once();
        assert_eq!(*preview.shown.lock().unwrap(), 2);
    }
}
