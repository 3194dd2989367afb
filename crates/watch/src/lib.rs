//! Background loops for sidekick.
//!
//! Two independent loops share the surface channel with the main
//! pipeline: the [`observer::Observer`] polls the desktop for changes
//! worth mentioning, and the [`scheduler::ReminderScheduler`] fires
//! one-shot reminders. Both stop cooperatively through a watch flag
//! with a bounded join.

pub mod observer;
pub mod probe;
pub mod scheduler;

pub use observer::{Observer, ObserverHandle, snapshot};
pub use probe::{DesktopProbe, HostProbe, SystemLoad};
pub use scheduler::ReminderScheduler;
