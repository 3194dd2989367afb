//! Surface events — the channel the background loops speak through.
//!
//! The observer and the reminder scheduler both deliver into the same
//! conversational surface the pipeline writes to. Delivery is a bounded
//! mpsc channel: each detected event is sent at most once, and a full or
//! closed channel is logged by the emitting loop rather than killing it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;

/// An event surfaced outside the main pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SurfaceEvent {
    /// The foreground window changed.
    WindowChange {
        title: String,
        contains_error: bool,
        detected_at: DateTime<Utc>,
    },

    /// The clipboard gained interesting content (code or an error).
    ClipboardChange {
        preview: String,
        is_code: bool,
        is_error: bool,
        detected_at: DateTime<Utc>,
    },

    /// CPU or memory utilization crossed its stress threshold.
    SystemStress {
        cpu_percent: f32,
        memory_percent: f32,
        detected_at: DateTime<Utc>,
    },

    /// A one-shot reminder came due.
    ReminderFired {
        id: u64,
        message: String,
        fired_at: DateTime<Utc>,
    },
}

impl SurfaceEvent {
    /// Is this a reminder rather than a passive observation?
    pub fn is_reminder(&self) -> bool {
        matches!(self, SurfaceEvent::ReminderFired { .. })
    }
}

/// Sending half of the surface channel, shared by observer and scheduler.
#[derive(Clone)]
pub struct SurfaceSink {
    tx: mpsc::Sender<SurfaceEvent>,
}

impl SurfaceSink {
    /// Create a surface channel with the given buffer capacity.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<SurfaceEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Deliver one event. Never blocks the emitting loop: a full or closed
    /// channel drops the event with a warning.
    pub fn deliver(&self, event: SurfaceEvent) {
        if let Err(e) = self.tx.try_send(event) {
            warn!("Surface event dropped: {e}");
        }
    }
}
