//! Desktop probes — where the observer's raw signals come from.
//!
//! The observer polls a [`DesktopProbe`] rather than the OS directly, so
//! the signal set is pluggable (OS-level hooks, test scripts) and the
//! polling loop stays portable.

use std::process::Command;
use std::sync::Mutex;
use tracing::debug;

/// A point-in-time utilization sample.
#[derive(Debug, Clone, Copy)]
pub struct SystemLoad {
    pub cpu_percent: f32,
    pub memory_percent: f32,
}

/// The source of the observer's three signals. Every method is
/// best-effort: `None` means "could not sample", never an error.
pub trait DesktopProbe: Send + Sync {
    fn active_window_title(&self) -> Option<String>;
    fn clipboard_text(&self) -> Option<String>;
    fn system_load(&self) -> Option<SystemLoad>;
}

/// The stock probe for Linux desktops: `xdotool` for the foreground
/// window, `xclip` for the clipboard, `/proc` for utilization. Missing
/// helpers degrade that signal to `None` and the observer simply skips it.
pub struct HostProbe {
    /// Previous /proc/stat totals; CPU percent is a delta between polls.
    last_cpu: Mutex<Option<CpuTimes>>,
}

#[derive(Debug, Clone, Copy)]
struct CpuTimes {
    idle: u64,
    total: u64,
}

impl HostProbe {
    pub fn new() -> Self {
        Self {
            last_cpu: Mutex::new(None),
        }
    }

    fn read_cpu_times() -> Option<CpuTimes> {
        let stat = std::fs::read_to_string("/proc/stat").ok()?;
        let line = stat.lines().next()?;
        let fields: Vec<u64> = line
            .split_whitespace()
            .skip(1)
            .filter_map(|f| f.parse().ok())
            .collect();
        if fields.len() < 5 {
            return None;
        }
        // idle + iowait
        let idle = fields[3] + fields.get(4).copied().unwrap_or(0);
        let total: u64 = fields.iter().sum();
        Some(CpuTimes { idle, total })
    }

    fn read_memory_percent() -> Option<f32> {
        let meminfo = std::fs::read_to_string("/proc/meminfo").ok()?;
        let mut total = None;
        let mut available = None;
        for line in meminfo.lines() {
            if let Some(rest) = line.strip_prefix("MemTotal:") {
                total = rest.split_whitespace().next()?.parse::<f64>().ok();
            } else if let Some(rest) = line.strip_prefix("MemAvailable:") {
                available = rest.split_whitespace().next()?.parse::<f64>().ok();
            }
        }
        let (total, available) = (total?, available?);
        if total <= 0.0 {
            return None;
        }
        Some(((total - available) / total * 100.0) as f32)
    }

    fn run_capture(program: &str, args: &[&str]) -> Option<String> {
        let output = Command::new(program).args(args).output().ok()?;
        if !output.status.success() {
            debug!("{program} exited with {}", output.status);
            return None;
        }
        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() { None } else { Some(text) }
    }
}

impl Default for HostProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl DesktopProbe for HostProbe {
    fn active_window_title(&self) -> Option<String> {
        Self::run_capture("xdotool", &["getactivewindow", "getwindowname"])
    }

    fn clipboard_text(&self) -> Option<String> {
        Self::run_capture("xclip", &["-selection", "clipboard", "-o"])
    }

    fn system_load(&self) -> Option<SystemLoad> {
        let current = Self::read_cpu_times()?;
        let mut last = self.last_cpu.lock().ok()?;
        let cpu_percent = match last.replace(current) {
            Some(prev) if current.total > prev.total => {
                let total_delta = (current.total - prev.total) as f32;
                let idle_delta = current.idle.saturating_sub(prev.idle) as f32;
                (1.0 - idle_delta / total_delta) * 100.0
            }
            // First sample has no baseline; report idle rather than a spike.
            _ => 0.0,
        };
        Some(SystemLoad {
            cpu_percent,
            memory_percent: Self::read_memory_percent()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(target_os = "linux")]
    fn proc_sampling_yields_sane_ranges() {
        let probe = HostProbe::new();
        // First call establishes the CPU baseline.
        let first = probe.system_load().unwrap();
        assert_eq!(first.cpu_percent, 0.0);
        assert!((0.0..=100.0).contains(&first.memory_percent));

        let second = probe.system_load().unwrap();
        assert!((0.0..=100.0).contains(&second.cpu_percent));
    }
}
