//! One-shot reminders delivered through the surface channel.
//!
//! Reminders live only in memory. Each `schedule` call spawns a task that
//! sleeps out the delay, emits a single [`SurfaceEvent::ReminderFired`],
//! and exits. A process restart drops whatever had not fired yet.

use chrono::Utc;
use sidekick_core::event::{SurfaceEvent, SurfaceSink};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub struct ReminderScheduler {
    sink: SurfaceSink,
    next_id: AtomicU64,
    stop_tx: watch::Sender<bool>,
    stop_rx: watch::Receiver<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ReminderScheduler {
    pub fn new(sink: SurfaceSink) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            sink,
            next_id: AtomicU64::new(1),
            stop_tx,
            stop_rx,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Arm a reminder and return the confirmation line shown to the user.
    pub fn schedule(&self, message: &str, delay_secs: u64) -> String {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let message = message.to_string();
        let sink = self.sink.clone();
        let mut stop_rx = self.stop_rx.clone();
        debug!(id, delay_secs, "Reminder armed");

        let task = tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(delay_secs)) => {
                    sink.deliver(SurfaceEvent::ReminderFired {
                        id,
                        message,
                        fired_at: Utc::now(),
                    });
                }
                _ = stop_rx.changed() => {
                    debug!(id, "Reminder cancelled by shutdown");
                }
            }
        });
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.retain(|t| !t.is_finished());
            tasks.push(task);
        }

        format_confirmation(delay_secs)
    }

    /// Cancel every pending reminder and wait briefly for their tasks.
    pub async fn shutdown(&self) {
        let _ = self.stop_tx.send(true);
        let tasks = match self.tasks.lock() {
            Ok(mut tasks) => std::mem::take(&mut *tasks),
            Err(_) => return,
        };
        for task in tasks {
            if tokio::time::timeout(Duration::from_secs(2), task)
                .await
                .is_err()
            {
                warn!("Reminder task did not stop within 2s");
            }
        }
        info!("Reminder scheduler stopped");
    }
}

fn format_confirmation(delay_secs: u64) -> String {
    if delay_secs >= 3600 && delay_secs % 3600 == 0 {
        let hours = delay_secs / 3600;
        format!("Okay, I'll remind you in {hours} hour{}.", plural(hours))
    } else if delay_secs >= 60 {
        let minutes = delay_secs / 60;
        format!("Okay, I'll remind you in {minutes} minute{}.", plural(minutes))
    } else {
        format!("Okay, I'll remind you in {delay_secs} second{}.", plural(delay_secs))
    }
}

fn plural(n: u64) -> &'static str {
    if n == 1 { "" } else { "s" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn zero_delay_fires_exactly_once() {
        let (sink, mut rx) = SurfaceSink::channel(4);
        let scheduler = ReminderScheduler::new(sink);
        let confirmation = scheduler.schedule("stand up", 0);
        assert_eq!(confirmation, "Okay, I'll remind you in 0 seconds.");

        match rx.recv().await.unwrap() {
            SurfaceEvent::ReminderFired { id, message, .. } => {
                assert_eq!(id, 1);
                assert_eq!(message, "stand up");
            }
            other => panic!("unexpected event: {other:?}"),
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(rx.try_recv().is_err(), "reminder must fire exactly once");
    }

    #[tokio::test]
    async fn ids_are_monotonic() {
        let (sink, mut rx) = SurfaceSink::channel(4);
        let scheduler = ReminderScheduler::new(sink);
        scheduler.schedule("first", 0);
        tokio::time::sleep(Duration::from_millis(20)).await;
        scheduler.schedule("second", 0);

        let mut ids = Vec::new();
        for _ in 0..2 {
            if let SurfaceEvent::ReminderFired { id, .. } = rx.recv().await.unwrap() {
                ids.push(id);
            }
        }
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn shutdown_cancels_pending_reminders() {
        let (sink, mut rx) = SurfaceSink::channel(4);
        let scheduler = ReminderScheduler::new(sink);
        scheduler.schedule("never arrives", 3600);
        scheduler.shutdown().await;
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn confirmation_picks_a_readable_unit() {
        assert_eq!(format_confirmation(45), "Okay, I'll remind you in 45 seconds.");
        assert_eq!(format_confirmation(60), "Okay, I'll remind you in 1 minute.");
        assert_eq!(format_confirmation(300), "Okay, I'll remind you in 5 minutes.");
        assert_eq!(format_confirmation(7200), "Okay, I'll remind you in 2 hours.");
    }
}
