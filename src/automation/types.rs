// Types and enums for the recognition loop
use crate::recognition::{CommandResolution, MatchResult};
use std::fmt;

/// Screen rectangle sampled every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Parse "x,y,width,height"; width and height must be positive.
    pub fn parse(text: &str) -> Option<Self> {
        let parts: Vec<&str> = text.split(',').collect();
        if parts.len() == 4
            && let (Ok(left), Ok(top), Ok(width), Ok(height)) = (
                parts[0].trim().parse::<u32>(),
                parts[1].trim().parse::<u32>(),
                parts[2].trim().parse::<u32>(),
                parts[3].trim().parse::<u32>(),
            )
            && width > 0
            && height > 0
        {
            return Some(Self::new(left, top, width, height));
        }
        None
    }

    /// Whether the region lies fully inside an image of the given size.
    pub fn fits_within(&self, image_width: u32, image_height: u32) -> bool {
        self.left
            .checked_add(self.width)
            .is_some_and(|right| right <= image_width)
            && self
                .top
                .checked_add(self.height)
                .is_some_and(|bottom| bottom <= image_height)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{} {}x{}", self.left, self.top, self.width, self.height)
    }
}

/// What happened in one capture, match, decide, act cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Recognized {
        result: MatchResult,
        command: CommandResolution,
        key_sent: bool,
    },
    /// Nothing cleared the threshold; best score kept for near-miss reporting
    NoMatch { score: f32 },
    CaptureFailed { reason: String },
}

impl CycleOutcome {
    pub fn symbol(&self) -> Option<&str> {
        match self {
            CycleOutcome::Recognized { result, .. } => result.symbol.as_deref(),
            _ => None,
        }
    }

    pub fn score(&self) -> Option<f32> {
        match self {
            CycleOutcome::Recognized { result, .. } => Some(result.score),
            CycleOutcome::NoMatch { score } => Some(*score),
            CycleOutcome::CaptureFailed { .. } => None,
        }
    }
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleOutcome::Recognized {
                result,
                command,
                key_sent,
            } => {
                let symbol = result.symbol.as_deref().unwrap_or("?");
                write!(
                    f,
                    "Last detected symbol: {} (score={:.2}) | Mapped command: {}",
                    symbol, result.score, command
                )?;
                if *key_sent && let Some(cmd) = command.command() {
                    write!(f, " | key '{}' sent", cmd.key())?;
                }
                Ok(())
            }
            CycleOutcome::NoMatch { score } => write!(
                f,
                "Last detected symbol: (no match, best score={:.2}) | Mapped command: (none)",
                score
            ),
            CycleOutcome::CaptureFailed { reason } => write!(f, "Capture failed: {}", reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    Running,
}

#[derive(Debug, Clone)]
pub enum AutomationCommand {
    Start,
    Stop,
    RunOnce,
    UpdateInterval(u64), // milliseconds
    Shutdown,
}

#[derive(Debug, Clone)]
pub enum AutomationEvent {
    StateChanged(RunnerState),
    CycleCompleted(CycleOutcome),
    IntervalUpdated(u64),
    Error(String),
}
