//! The environment observer — passive watching without being asked.
//!
//! Three independent signal checks run on one polling interval: the
//! foreground window title, the clipboard, and system utilization. Each
//! keeps only its single last-seen value; there is no history. Detected
//! events go into the shared surface channel, and any per-signal hiccup
//! is logged and skipped so the loop always reaches its next tick.

use chrono::Utc;
use sidekick_core::context::EnvironmentSnapshot;
use sidekick_core::event::{SurfaceEvent, SurfaceSink};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use crate::probe::DesktopProbe;

/// Keywords that mark a window title or clipboard text as error-related.
const ERROR_KEYWORDS: &[&str] = &[
    "error",
    "exception",
    "failed",
    "failure",
    "traceback",
    "panic",
    "syntax",
    "warning",
];

/// Keywords that mark clipboard text as code.
const CODE_KEYWORDS: &[&str] = &[
    "def ", "import ", "class ", "function", "const ", "fn ", "let ", "pub ",
];

/// Clipboard content shorter than this is treated as an accidental copy.
const MIN_CLIPBOARD_LEN: usize = 10;

const CPU_STRESS_PERCENT: f32 = 90.0;
const MEMORY_STRESS_PERCENT: f32 = 85.0;

/// The background observer. `start` consumes it and returns a handle for
/// cooperative shutdown.
pub struct Observer {
    probe: Arc<dyn DesktopProbe>,
    sink: SurfaceSink,
    interval: Duration,
}

/// Running-observer handle: stop flag plus the loop task.
pub struct ObserverHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ObserverHandle {
    /// Cooperative stop with a bounded wait.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if tokio::time::timeout(Duration::from_secs(2), self.task)
            .await
            .is_err()
        {
            warn!("Observer did not stop within 2s");
        } else {
            info!("Observer stopped");
        }
    }
}

/// Last-seen values, one per signal type.
#[derive(Default)]
struct SignalState {
    window_title: Option<String>,
    clipboard: Option<String>,
}

impl Observer {
    pub fn new(probe: Arc<dyn DesktopProbe>, sink: SurfaceSink, interval: Duration) -> Self {
        Self {
            probe,
            sink,
            interval,
        }
    }

    /// Spawn the polling loop.
    pub fn start(self) -> ObserverHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut state = SignalState::default();
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            info!(interval_secs = self.interval.as_secs(), "Observer running");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.poll_once(&mut state);
                    }
                    result = stop_rx.changed() => {
                        if result.is_err() || *stop_rx.borrow() {
                            debug!("Observer stop requested");
                            return;
                        }
                    }
                }
            }
        });
        ObserverHandle { stop_tx, task }
    }

    /// One pass over all three signals.
    fn poll_once(&self, state: &mut SignalState) {
        if let Some(event) = self.check_window(state) {
            self.sink.deliver(event);
        }
        if let Some(event) = self.check_clipboard(state) {
            self.sink.deliver(event);
        }
        if let Some(event) = self.check_system() {
            self.sink.deliver(event);
        }
    }

    fn check_window(&self, state: &mut SignalState) -> Option<SurfaceEvent> {
        let title = self.probe.active_window_title()?;
        if state.window_title.as_deref() == Some(title.as_str()) {
            return None;
        }
        state.window_title = Some(title.clone());
        let contains_error = contains_error_keyword(&title);
        if contains_error {
            debug!("Error window detected: {title}");
        }
        Some(SurfaceEvent::WindowChange {
            title,
            contains_error,
            detected_at: Utc::now(),
        })
    }

    fn check_clipboard(&self, state: &mut SignalState) -> Option<SurfaceEvent> {
        let text = self.probe.clipboard_text()?;
        let unchanged = state.clipboard.as_deref() == Some(text.as_str());
        if unchanged || text.chars().count() < MIN_CLIPBOARD_LEN {
            state.clipboard = Some(text);
            return None;
        }
        state.clipboard = Some(text.clone());

        let (is_code, is_error) = classify_clipboard(&text);
        if !is_code && !is_error {
            return None;
        }
        debug!(chars = text.len(), is_code, is_error, "Interesting clipboard content");
        Some(SurfaceEvent::ClipboardChange {
            preview: text.chars().take(200).collect(),
            is_code,
            is_error,
            detected_at: Utc::now(),
        })
    }

    fn check_system(&self) -> Option<SurfaceEvent> {
        let load = self.probe.system_load()?;
        if load.cpu_percent <= CPU_STRESS_PERCENT && load.memory_percent <= MEMORY_STRESS_PERCENT {
            return None;
        }
        warn!(
            cpu = load.cpu_percent,
            memory = load.memory_percent,
            "System under stress"
        );
        Some(SurfaceEvent::SystemStress {
            cpu_percent: load.cpu_percent,
            memory_percent: load.memory_percent,
            detected_at: Utc::now(),
        })
    }
}

/// Capture the current environment for the pipeline's context bundle.
pub fn snapshot(probe: &dyn DesktopProbe) -> EnvironmentSnapshot {
    EnvironmentSnapshot {
        window_title: probe.active_window_title(),
        clipboard: probe.clipboard_text(),
        captured_at: Some(Utc::now()),
    }
}

fn contains_error_keyword(text: &str) -> bool {
    let lower = text.to_lowercase();
    ERROR_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// (is_code, is_error) classification of clipboard text.
fn classify_clipboard(text: &str) -> (bool, bool) {
    let lower = text.to_lowercase();
    let is_code = CODE_KEYWORDS.iter().any(|kw| lower.contains(kw));
    (is_code, contains_error_keyword(&lower))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::SystemLoad;
    use std::sync::Mutex;

    /// A probe that replays scripted values, one per poll.
    struct ScriptedProbe {
        windows: Mutex<Vec<Option<String>>>,
        clipboards: Mutex<Vec<Option<String>>>,
        load: Option<SystemLoad>,
    }

    impl ScriptedProbe {
        fn new(
            windows: Vec<Option<&str>>,
            clipboards: Vec<Option<&str>>,
            load: Option<SystemLoad>,
        ) -> Arc<Self> {
            Arc::new(Self {
                windows: Mutex::new(
                    windows.into_iter().map(|w| w.map(String::from)).collect(),
                ),
                clipboards: Mutex::new(
                    clipboards.into_iter().map(|c| c.map(String::from)).collect(),
                ),
                load,
            })
        }
    }

    impl DesktopProbe for ScriptedProbe {
        fn active_window_title(&self) -> Option<String> {
            let mut windows = self.windows.lock().unwrap();
            if windows.is_empty() { None } else { windows.remove(0) }
        }

        fn clipboard_text(&self) -> Option<String> {
            let mut clipboards = self.clipboards.lock().unwrap();
            if clipboards.is_empty() { None } else { clipboards.remove(0) }
        }

        fn system_load(&self) -> Option<SystemLoad> {
            self.load
        }
    }

    fn observer_with(probe: Arc<ScriptedProbe>) -> (Observer, tokio::sync::mpsc::Receiver<SurfaceEvent>) {
        let (sink, rx) = SurfaceSink::channel(16);
        (Observer::new(probe, sink, Duration::from_secs(5)), rx)
    }

    #[tokio::test]
    async fn window_change_emitted_once_per_change() {
        let probe = ScriptedProbe::new(
            vec![Some("editor"), Some("editor"), Some("browser — Error 500")],
            vec![None, None, None],
            None,
        );
        let (observer, mut rx) = observer_with(probe);
        let mut state = SignalState::default();

        observer.poll_once(&mut state);
        observer.poll_once(&mut state);
        observer.poll_once(&mut state);

        match rx.try_recv().unwrap() {
            SurfaceEvent::WindowChange { title, contains_error, .. } => {
                assert_eq!(title, "editor");
                assert!(!contains_error);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        match rx.try_recv().unwrap() {
            SurfaceEvent::WindowChange { contains_error, .. } => assert!(contains_error),
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unchanged_clipboard_is_silent_on_second_poll() {
        let snippet = "def main():\n    raise RuntimeError";
        let probe = ScriptedProbe::new(
            vec![None, None],
            vec![Some(snippet), Some(snippet)],
            None,
        );
        let (observer, mut rx) = observer_with(probe);
        let mut state = SignalState::default();

        observer.poll_once(&mut state);
        observer.poll_once(&mut state);

        match rx.try_recv().unwrap() {
            SurfaceEvent::ClipboardChange { is_code, is_error, .. } => {
                assert!(is_code);
                assert!(is_error);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(rx.try_recv().is_err(), "second identical poll must not emit");
    }

    #[tokio::test]
    async fn short_or_boring_clipboard_ignored() {
        let probe = ScriptedProbe::new(
            vec![None, None],
            vec![Some("ok"), Some("just some plain prose about nothing")],
            None,
        );
        let (observer, mut rx) = observer_with(probe);
        let mut state = SignalState::default();

        observer.poll_once(&mut state);
        observer.poll_once(&mut state);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn system_stress_thresholds() {
        let probe = ScriptedProbe::new(
            vec![None],
            vec![None],
            Some(SystemLoad { cpu_percent: 95.0, memory_percent: 40.0 }),
        );
        let (observer, mut rx) = observer_with(probe);
        observer.poll_once(&mut SignalState::default());

        assert!(matches!(
            rx.try_recv().unwrap(),
            SurfaceEvent::SystemStress { .. }
        ));

        let calm = ScriptedProbe::new(
            vec![None],
            vec![None],
            Some(SystemLoad { cpu_percent: 20.0, memory_percent: 50.0 }),
        );
        let (observer, mut rx) = observer_with(calm);
        observer.poll_once(&mut SignalState::default());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn loop_stops_cooperatively() {
        let probe = ScriptedProbe::new(vec![], vec![], None);
        let (sink, _rx) = SurfaceSink::channel(4);
        let observer = Observer::new(probe, sink, Duration::from_millis(10));
        let handle = observer.start();
        tokio::time::sleep(Duration::from_millis(30)).await;
        handle.stop().await;
    }

    #[test]
    fn classification_keywords() {
        assert!(contains_error_keyword("Build FAILED: 3 errors"));
        assert!(!contains_error_keyword("all tests green"));
        let (code, err) = classify_clipboard("const x = 5; // TODO");
        assert!(code);
        assert!(!err);
    }
}
