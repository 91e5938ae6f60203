//! Progress bars for sync operations
//!
//! [`ProgressObserver`] turns the engine's emitted states into `indicatif`
//! output: a spinner while records are fetched, then one bar per delete or
//! upload phase.

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use recsync_core::domain::{SyncState, SyncStatus};
use recsync_core::ports::ISyncObserver;

const BAR_TEMPLATE: &str = "{msg:>10} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({percent}%)";
const SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";

struct Phase {
    status: SyncStatus,
    bar: ProgressBar,
}

/// Sync observer drawing progress bars on stderr
pub struct ProgressObserver {
    enabled: bool,
    phase: Mutex<Option<Phase>>,
}

impl ProgressObserver {
    /// Creates an observer; a disabled one draws nothing
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            phase: Mutex::new(None),
        }
    }

    fn start(status: SyncStatus, total: u64) -> ProgressBar {
        match status {
            SyncStatus::Loading => {
                let bar = ProgressBar::new_spinner();
                if let Ok(style) = ProgressStyle::with_template(SPINNER_TEMPLATE) {
                    bar.set_style(style);
                }
                bar.set_message("Fetching records...");
                bar.enable_steady_tick(Duration::from_millis(100));
                bar
            }
            _ => {
                let bar = ProgressBar::new(total);
                if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
                    bar.set_style(style.progress_chars("=> "));
                }
                bar.set_message(if status == SyncStatus::Deleting {
                    "Deleting"
                } else {
                    "Uploading"
                });
                bar
            }
        }
    }
}

impl ISyncObserver for ProgressObserver {
    fn on_state(&self, state: &SyncState) {
        if !self.enabled {
            return;
        }
        let Ok(mut phase) = self.phase.lock() else {
            return;
        };

        let status = state.status();
        if status.is_busy() {
            if phase.as_ref().map(|p| p.status) != Some(status) {
                if let Some(previous) = phase.take() {
                    previous.bar.finish_and_clear();
                }
                *phase = Some(Phase {
                    status,
                    bar: Self::start(status, state.progress().total),
                });
            }
            if let Some(current) = phase.as_ref() {
                if status != SyncStatus::Loading {
                    current.bar.set_position(state.progress().current);
                }
            }
            return;
        }

        if let Some(finished) = phase.take() {
            match (finished.status, status) {
                (_, SyncStatus::Error) => finished.bar.abandon_with_message("failed"),
                (SyncStatus::Loading, _) => {
                    finished.bar.finish_with_message(format!("Fetched {} records", state.records().len()))
                }
                _ => finished.bar.finish(),
            }
        }
    }
}
