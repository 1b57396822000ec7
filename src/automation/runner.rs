// Polling loop driving one recognition cycle per tick
use super::channels::RunnerEndpoints;
use super::cycle::RecognitionCycle;
use super::types::{AutomationCommand, AutomationEvent, CycleOutcome, RunnerState};
use tokio::sync::mpsc;
use tokio::time::{Duration, Interval, MissedTickBehavior, interval};

pub const MIN_INTERVAL_MS: u64 = 100;
pub const MAX_INTERVAL_MS: u64 = 10_000;
pub const DEFAULT_INTERVAL_MS: u64 = 800;

/// Clamp a polling interval to the supported range.
pub fn clamp_interval_ms(ms: u64) -> u64 {
    ms.clamp(MIN_INTERVAL_MS, MAX_INTERVAL_MS)
}

fn polling_interval(period: Duration) -> Interval {
    let mut ticker = interval(period);
    // A slow cycle pushes the schedule back instead of queueing catch-up ticks
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

pub struct AutomationRunner {
    /// Lent to the blocking pool while a cycle runs
    cycle: Option<RecognitionCycle>,
    state: RunnerState,
    interval_ms: u64,
    capture_failing: bool,
    command_rx: mpsc::Receiver<AutomationCommand>,
    event_tx: mpsc::Sender<AutomationEvent>,
}

impl AutomationRunner {
    pub fn new(cycle: RecognitionCycle, interval_ms: u64, endpoints: RunnerEndpoints) -> Self {
        let clamped = clamp_interval_ms(interval_ms);
        if clamped != interval_ms {
            log::warn!(
                "⏱️ Interval {}ms outside {}-{}ms, using {}ms",
                interval_ms,
                MIN_INTERVAL_MS,
                MAX_INTERVAL_MS,
                clamped
            );
        }
        Self {
            cycle: Some(cycle),
            state: RunnerState::Idle,
            interval_ms: clamped,
            capture_failing: false,
            command_rx: endpoints.commands,
            event_tx: endpoints.events,
        }
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    async fn change_state(&mut self, new_state: RunnerState) {
        if self.state != new_state {
            log::debug!("🎮 Runner state: {:?} -> {:?}", self.state, new_state);
            self.state = new_state;
            let _ = self.event_tx.send(AutomationEvent::StateChanged(new_state)).await;
        }
    }

    async fn report_error(&self, message: String) {
        log::error!("❌ {}", message);
        let _ = self.event_tx.send(AutomationEvent::Error(message)).await;
    }

    async fn run_cycle(&mut self) {
        let Some(mut cycle) = self.cycle.take() else {
            return;
        };

        // Decode, correlation and key injection block; the cycle runs to completion
        let joined = tokio::task::spawn_blocking(move || {
            let outcome = cycle.run_once();
            (cycle, outcome)
        })
        .await;

        let outcome = match joined {
            Ok((cycle, outcome)) => {
                self.cycle = Some(cycle);
                outcome
            }
            Err(e) => {
                self.report_error(format!("Recognition cycle aborted: {e}")).await;
                self.change_state(RunnerState::Idle).await;
                return;
            }
        };

        // Only the first failure of a streak is raised as an error
        if let CycleOutcome::CaptureFailed { reason } = &outcome
            && !self.capture_failing
        {
            let _ = self.event_tx.send(AutomationEvent::Error(reason.clone())).await;
        }
        self.capture_failing = matches!(outcome, CycleOutcome::CaptureFailed { .. });
        let _ = self.event_tx.send(AutomationEvent::CycleCompleted(outcome)).await;
    }

    /// Returns true when the loop should exit.
    async fn process_command(&mut self, command: AutomationCommand, ticker: &mut Interval) -> bool {
        log::debug!("🤖 Processing command: {:?}", command);
        match command {
            AutomationCommand::Start => {
                if self.cycle.is_none() {
                    self.report_error("No recognition cycle left to run".to_string())
                        .await;
                } else if self.state == RunnerState::Idle {
                    // First capture happens one interval after start
                    ticker.reset();
                    self.change_state(RunnerState::Running).await;
                    log::info!("🚀 Recognition started (interval: {}ms)", self.interval_ms);
                }
            }
            AutomationCommand::Stop => {
                self.change_state(RunnerState::Idle).await;
            }
            AutomationCommand::RunOnce => {
                self.run_cycle().await;
            }
            AutomationCommand::UpdateInterval(ms) => {
                self.interval_ms = clamp_interval_ms(ms);
                *ticker = polling_interval(Duration::from_millis(self.interval_ms));
                ticker.reset();
                let _ = self
                    .event_tx
                    .send(AutomationEvent::IntervalUpdated(self.interval_ms))
                    .await;
            }
            AutomationCommand::Shutdown => {
                self.change_state(RunnerState::Idle).await;
                log::info!("🛑 Recognition loop shutting down");
                return true;
            }
        }
        false
    }

    pub async fn run(&mut self) {
        let mut ticker = polling_interval(Duration::from_millis(self.interval_ms));

        loop {
            tokio::select! {
                command = self.command_rx.recv() => {
                    let Some(command) = command else {
                        log::debug!("Command channel closed, leaving loop");
                        break;
                    };
                    if self.process_command(command, &mut ticker).await {
                        break;
                    }
                }
                _ = ticker.tick(), if self.state == RunnerState::Running => {
                    self.run_cycle().await;
                }
            }
        }
    }
}
