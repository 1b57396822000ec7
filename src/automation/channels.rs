// Command and event plumbing between the recognition loop and its controller
use super::types::{AutomationCommand, AutomationEvent};
use tokio::sync::mpsc;

/// Commands and events buffered before senders wait.
pub const CHANNEL_CAPACITY: usize = 32;

/// Controller side: issues commands, observes outcomes.
pub struct ControlHandle {
    pub commands: mpsc::Sender<AutomationCommand>,
    pub events: mpsc::Receiver<AutomationEvent>,
}

/// Runner side, consumed by `AutomationRunner::new`.
pub struct RunnerEndpoints {
    pub commands: mpsc::Receiver<AutomationCommand>,
    pub events: mpsc::Sender<AutomationEvent>,
}

pub fn create_automation_channels() -> (ControlHandle, RunnerEndpoints) {
    let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);
    (
        ControlHandle {
            commands: cmd_tx,
            events: event_rx,
        },
        RunnerEndpoints {
            commands: cmd_rx,
            events: event_tx,
        },
    )
}
