//! Schedule thread

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::state::{WatcherState, DEBOUNCE_MS};

/// How rescans are triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanTrigger {
    #[default]
    Poll,
    Watch,
}

impl fmt::Display for ScanTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanTrigger::Poll => f.write_str("poll"),
            ScanTrigger::Watch => f.write_str("watch"),
        }
    }
}

impl FromStr for ScanTrigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "poll" => Ok(ScanTrigger::Poll),
            "watch" => Ok(ScanTrigger::Watch),
            other => Err(format!("unknown scan trigger '{other}' (expected poll or watch)")),
        }
    }
}

pub(super) enum Signal {
    Stop,
    Changed(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ScanSchedule {
    trigger: ScanTrigger,
    interval: Duration,
    watch_root: PathBuf,
}

impl ScanSchedule {
    pub fn new(trigger: ScanTrigger, interval: Duration, watch_root: impl Into<PathBuf>) -> Self {
        Self {
            trigger,
            interval,
            watch_root: watch_root.into(),
        }
    }

    /// Whether `spawn` would start anything
    pub fn is_armed(&self) -> bool {
        !self.interval.is_zero()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn trigger(&self) -> ScanTrigger {
        self.trigger
    }

    /// Start calling `task` in the background. Returns `None` for a zero interval.
    pub fn spawn<F>(self, name: &str, task: F) -> std::io::Result<Option<ScheduleHandle>>
    where
        F: FnMut() + Send + 'static,
    {
        if !self.is_armed() {
            return Ok(None);
        }

        let (tx, rx) = mpsc::channel();
        let watcher = match self.trigger {
            ScanTrigger::Poll => None,
            ScanTrigger::Watch => watch(&self.watch_root, tx.clone()),
        };

        let interval = self.interval;
        let thread = thread::Builder::new()
            .name(format!("scan-{name}"))
            .spawn(move || run(rx, interval, task))?;

        info!(
            schedule = name,
            trigger = %self.trigger,
            watching = watcher.is_some(),
            interval_secs = interval.as_secs_f64(),
            "scan schedule armed"
        );

        Ok(Some(ScheduleHandle {
            stop: tx,
            thread: Some(thread),
            _watcher: watcher,
        }))
    }
}

/// Watch `root` recursively, forwarding changed paths. `None` if the watcher
/// cannot be set up; the interval poll still runs.
fn watch(root: &Path, tx: Sender<Signal>) -> Option<RecommendedWatcher> {
    let mut watcher = match RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                for path in event.paths {
                    let _ = tx.send(Signal::Changed(path));
                }
            }
        },
        notify::Config::default(),
    ) {
        Ok(watcher) => watcher,
        Err(e) => {
            warn!(root = %root.display(), error = %e, "file watcher unavailable, polling only");
            return None;
        }
    };

    if let Err(e) = watcher.watch(root, RecursiveMode::Recursive) {
        info!(root = %root.display(), error = %e, "cannot watch scan root, polling only");
        return None;
    }
    Some(watcher)
}

/// Schedule loop: runs `task` on every interval tick and once per settled
/// burst of change signals, until `Stop` arrives or every sender is gone.
pub(super) fn run<F: FnMut()>(rx: Receiver<Signal>, interval: Duration, mut task: F) {
    let mut state = WatcherState::new();
    let mut next_tick = Instant::now() + interval;

    loop {
        let mut wait = next_tick.saturating_duration_since(Instant::now());
        if state.has_pending() {
            wait = wait.min(Duration::from_millis(DEBOUNCE_MS / 2));
        }

        match rx.recv_timeout(wait) {
            Ok(Signal::Stop) | Err(RecvTimeoutError::Disconnected) => break,
            Ok(Signal::Changed(path)) => state.add_change(path),
            Err(RecvTimeoutError::Timeout) => {}
        }

        if state.should_scan() {
            let changes = state.take_changes();
            debug!(changes = changes.len(), "changes settled, rescanning");
        } else if Instant::now() < next_tick {
            continue;
        } else {
            state.take_changes();
        }

        task();
        next_tick = Instant::now() + interval;
    }
}

/// Running schedule. Dropping it stops the thread.
pub struct ScheduleHandle {
    stop: Sender<Signal>,
    thread: Option<JoinHandle<()>>,
    _watcher: Option<RecommendedWatcher>,
}

impl ScheduleHandle {
    /// Signal the thread and wait for it. A scan in progress completes first.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = self.stop.send(Signal::Stop);
            if thread.join().is_err() {
                warn!("scan schedule thread panicked");
            }
        }
    }
}

impl Drop for ScheduleHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for ScheduleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduleHandle")
            .field("running", &self.thread.is_some())
            .field("watching", &self._watcher.is_some())
            .finish()
    }
}
