use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use janusmc::engine::progress::{Progress, ProgressCallback};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::warn;

const EVENT_BUFFER: usize = 1024;
const SAMPLES_TEMPLATE: &str =
    "{spinner:.green} {prefix:.bold} [{bar:30.green/white}] {pos}/{len} samples in {elapsed} | {msg}";

#[derive(Debug)]
pub enum UiEvent {
    Progress(Progress),
    Log(String),
}

/// Bar for one relaxation phase. The message slot carries the latest energy/acceptance line.
struct RelaxationBar {
    bar: ProgressBar,
    phase: &'static str,
    status: Option<String>,
}

impl RelaxationBar {
    fn begin(terminal: &MultiProgress, phase: &'static str) -> Self {
        let bar = terminal.add(ProgressBar::new_spinner());
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} {prefix:.bold} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix(phase);
        bar.set_message("preparing");
        bar.enable_steady_tick(Duration::from_millis(100));
        Self {
            bar,
            phase,
            status: None,
        }
    }

    fn count_samples(&self, total: u64) {
        self.bar.disable_steady_tick();
        self.bar.set_style(
            ProgressStyle::with_template(SAMPLES_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar.set_message("");
    }

    fn update_status(&mut self, text: String) {
        self.bar.set_message(text.clone());
        self.status = Some(text);
    }

    /// Line printed once the phase is over.
    fn summary(&self) -> String {
        match &self.status {
            Some(status) => format!("✓ {}: {}", self.phase, status),
            None => format!("✓ {}", self.phase),
        }
    }
}

/// Draws relaxation progress on stderr so stdout stays a data stream.
pub struct UiManager {
    terminal: MultiProgress,
    relaxation: Option<RelaxationBar>,
    events: mpsc::Receiver<UiEvent>,
    shutdown: watch::Receiver<bool>,
    anchor: ProgressBar,
}

impl UiManager {
    pub fn new() -> (Self, mpsc::Sender<UiEvent>, watch::Sender<bool>) {
        let (event_sender, events) = mpsc::channel(EVENT_BUFFER);
        let (shutdown_sender, shutdown) = watch::channel(false);
        let terminal = MultiProgress::with_draw_target(ProgressDrawTarget::stderr_with_hz(10));
        let anchor = terminal.add(ProgressBar::hidden());
        let manager = Self {
            terminal,
            relaxation: None,
            events,
            shutdown,
            anchor,
        };
        (manager, event_sender, shutdown_sender)
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(event) = self.events.recv() => self.handle_event(event),
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
        }
        if let Some(relaxation) = self.relaxation.take() {
            relaxation.bar.finish_and_clear();
        }
        self.anchor.finish_and_clear();
    }

    fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Log(line) => self.print(line),
            UiEvent::Progress(progress) => self.handle_progress(progress),
        }
    }

    fn print(&self, line: String) {
        if self.terminal.println(&line).is_err() {
            eprintln!("{}", line);
        }
    }

    fn handle_progress(&mut self, progress: Progress) {
        match progress {
            Progress::PhaseStart { name } => {
                if let Some(previous) = self.relaxation.take() {
                    previous.bar.finish_and_clear();
                }
                self.relaxation = Some(RelaxationBar::begin(&self.terminal, name));
            }
            Progress::TaskStart { total } => {
                if let Some(relaxation) = &self.relaxation {
                    relaxation.count_samples(total);
                }
            }
            Progress::TaskIncrement { amount } => {
                if let Some(relaxation) = &self.relaxation {
                    relaxation.bar.inc(amount);
                }
            }
            Progress::StatusUpdate { text } => {
                if let Some(relaxation) = &mut self.relaxation {
                    relaxation.update_status(text);
                }
            }
            Progress::TaskFinish => {}
            Progress::PhaseFinish => {
                if let Some(relaxation) = self.relaxation.take() {
                    relaxation.bar.finish_and_clear();
                    self.print(relaxation.summary());
                }
            }
            Progress::Message(text) => self.print(text),
        }
    }
}

/// Forwards core progress events into the UI channel without blocking the worker.
#[derive(Clone)]
pub struct CliProgressHandler {
    sender: mpsc::Sender<UiEvent>,
}

impl CliProgressHandler {
    pub fn new(sender: mpsc::Sender<UiEvent>) -> Self {
        Self { sender }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let sender = self.sender.clone();
        Box::new(move |progress: Progress| {
            if let Err(e) = sender.try_send(UiEvent::Progress(progress)) {
                warn!("Dropped a progress update: {}", e);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hidden_manager() -> (UiManager, mpsc::Sender<UiEvent>, watch::Sender<bool>) {
        let (manager, sender, shutdown) = UiManager::new();
        manager.terminal.set_draw_target(ProgressDrawTarget::hidden());
        (manager, sender, shutdown)
    }

    fn feed(manager: &mut UiManager, events: Vec<Progress>) {
        for event in events {
            manager.handle_event(UiEvent::Progress(event));
        }
    }

    #[test]
    fn phase_start_opens_a_bar_named_after_the_phase() {
        let (mut manager, _, _) = hidden_manager();
        assert!(manager.relaxation.is_none());

        feed(&mut manager, vec![Progress::PhaseStart { name: "Relaxation" }]);

        let relaxation = manager.relaxation.as_ref().unwrap();
        assert_eq!(relaxation.bar.prefix(), "Relaxation");
        assert_eq!(relaxation.bar.message(), "preparing");
    }

    #[test]
    fn sample_intervals_advance_the_bar_and_status_shows_energy() {
        let (mut manager, _, _) = hidden_manager();
        feed(
            &mut manager,
            vec![
                Progress::PhaseStart { name: "Relaxation" },
                Progress::TaskStart { total: 10 },
                Progress::TaskIncrement { amount: 1 },
                Progress::StatusUpdate {
                    text: "E = -3.000 kT, acceptance 41.0%".into(),
                },
                Progress::TaskIncrement { amount: 1 },
            ],
        );

        let relaxation = manager.relaxation.as_ref().unwrap();
        assert_eq!(relaxation.bar.length(), Some(10));
        assert_eq!(relaxation.bar.position(), 2);
        assert_eq!(relaxation.bar.message(), "E = -3.000 kT, acceptance 41.0%");
    }

    #[test]
    fn phase_summary_keeps_the_last_status() {
        let (mut manager, _, _) = hidden_manager();
        feed(
            &mut manager,
            vec![
                Progress::PhaseStart { name: "Relaxation" },
                Progress::StatusUpdate {
                    text: "E = -1.000 kT, acceptance 50.0%".into(),
                },
                Progress::StatusUpdate {
                    text: "E = -2.500 kT, acceptance 44.0%".into(),
                },
            ],
        );
        assert_eq!(
            manager.relaxation.as_ref().unwrap().summary(),
            "✓ Relaxation: E = -2.500 kT, acceptance 44.0%"
        );

        feed(&mut manager, vec![Progress::TaskFinish, Progress::PhaseFinish]);
        assert!(manager.relaxation.is_none());
    }

    #[test]
    fn phase_without_status_has_a_bare_summary() {
        let (mut manager, _, _) = hidden_manager();
        feed(&mut manager, vec![Progress::PhaseStart { name: "Relaxation" }]);
        assert_eq!(
            manager.relaxation.as_ref().unwrap().summary(),
            "✓ Relaxation"
        );
    }

    #[test]
    fn events_without_a_phase_are_ignored() {
        let (mut manager, _, _) = hidden_manager();
        feed(
            &mut manager,
            vec![
                Progress::TaskStart { total: 5 },
                Progress::TaskIncrement { amount: 1 },
                Progress::StatusUpdate { text: "E = 0.000 kT".into() },
                Progress::Message("Cancelled after 1 of 5 intervals.".to_string()),
                Progress::PhaseFinish,
            ],
        );
        manager.handle_event(UiEvent::Log("log line".to_string()));
        assert!(manager.relaxation.is_none());
    }

    #[tokio::test]
    async fn progress_handler_forwards_events() {
        let (sender, mut receiver) = mpsc::channel(1);
        let callback = CliProgressHandler::new(sender).get_callback();

        callback(Progress::TaskIncrement { amount: 2 });

        match receiver.recv().await.unwrap() {
            UiEvent::Progress(Progress::TaskIncrement { amount }) => assert_eq!(amount, 2),
            other => panic!("Unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn manager_drains_and_stops_on_shutdown() {
        let (manager, sender, shutdown) = hidden_manager();
        let handle = tokio::spawn(manager.run());

        sender
            .send(UiEvent::Progress(Progress::PhaseStart { name: "Relaxation" }))
            .await
            .unwrap();
        sender
            .send(UiEvent::Log("before shutdown".to_string()))
            .await
            .unwrap();
        shutdown.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("UI manager did not shut down")
            .unwrap();
    }
}
