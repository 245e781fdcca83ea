use crate::state::debug_log::DebugLog;
use crate::HarvestError;
use chrono::Local;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Progress file name shown once a run has finished
pub const COMPLETION_MARKER: &str = "done";

/// Download progress of the current (or last) run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Number of documents discovered
    pub total: usize,

    /// Number of download attempts finished
    pub current: usize,

    /// Document being downloaded, or the last one saved
    pub filename: String,

    /// `current / total` as a whole percentage, 100 when nothing was found
    pub percentage: u8,
}

impl Progress {
    fn recompute(&mut self) {
        self.percentage = if self.total == 0 {
            100
        } else {
            ((self.current * 100) / self.total).min(100) as u8
        };
    }
}

/// Point-in-time copy of the run state
#[derive(Debug, Clone, Serialize)]
pub struct RunSnapshot {
    pub running: bool,
    pub last_run: Option<String>,
    pub destination: Option<PathBuf>,
    pub progress: Progress,
    pub debug_log: Vec<String>,
}

#[derive(Debug)]
struct Inner {
    running: bool,
    last_run: Option<String>,
    destination: Option<PathBuf>,
    progress: Progress,
    log: DebugLog,
}

/// Process-wide state of crawl runs
///
/// All fields live behind one lock so a reader never observes progress from one
/// run next to the debug log of another. Only the holder of the [`RunGuard`]
/// returned by [`RunState::begin`] mutates it; everybody else takes snapshots.
#[derive(Debug)]
pub struct RunState {
    inner: Mutex<Inner>,
}

impl RunState {
    /// Creates an idle state whose debug log keeps `log_capacity` entries
    pub fn new(log_capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                running: false,
                last_run: None,
                destination: None,
                progress: Progress::default(),
                log: DebugLog::new(log_capacity),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panicking run must not take status reporting down with it
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    /// Returns a copy of the current state
    pub fn snapshot(&self) -> RunSnapshot {
        let inner = self.lock();
        RunSnapshot {
            running: inner.running,
            last_run: inner.last_run.clone(),
            destination: inner.destination.clone(),
            progress: inner.progress.clone(),
            debug_log: inner.log.to_vec(),
        }
    }

    /// Starts a run: resets progress and the debug log and sets the running flag
    ///
    /// # Returns
    ///
    /// * `Ok(RunGuard)` - The write handle for the new run
    /// * `Err(HarvestError::AlreadyRunning)` - Another run holds the state; nothing was changed
    pub fn begin(self: &Arc<Self>, destination: PathBuf) -> Result<RunGuard, HarvestError> {
        let mut inner = self.lock();
        if inner.running {
            return Err(HarvestError::AlreadyRunning);
        }

        inner.running = true;
        inner.destination = Some(destination);
        inner.progress = Progress::default();
        inner.log.clear();

        Ok(RunGuard {
            state: Arc::clone(self),
        })
    }

    fn append(&self, message: String) {
        tracing::debug!("{}", message);
        self.lock().log.push(message);
    }
}

/// Write handle of the active run
///
/// Dropping the guard ends the run: the completion time is recorded and the
/// running flag cleared, whether the run finished, returned early or panicked.
#[derive(Debug)]
pub struct RunGuard {
    state: Arc<RunState>,
}

impl RunGuard {
    /// Appends a line to the debug log
    pub fn log(&self, message: impl Into<String>) {
        self.state.append(message.into());
    }

    /// Records how many documents discovery produced
    pub fn set_total(&self, total: usize) {
        let mut inner = self.state.lock();
        inner.progress.total = total;
        inner.progress.current = 0;
        inner.progress.recompute();
    }

    /// Marks the start of a download attempt
    pub fn begin_item(&self, filename: &str) {
        self.state.lock().progress.filename = filename.to_string();
    }

    /// Marks a download attempt as finished; `saved_as` is set when it succeeded
    pub fn complete_item(&self, saved_as: Option<&str>) {
        let mut inner = self.state.lock();
        inner.progress.current += 1;
        if let Some(name) = saved_as {
            inner.progress.filename = name.to_string();
        }
        inner.progress.recompute();
    }

    /// Marks every attempt as done
    pub fn finish(&self) {
        let mut inner = self.state.lock();
        inner.progress.filename = COMPLETION_MARKER.to_string();
        inner.progress.percentage = 100;
    }

    pub fn progress(&self) -> Progress {
        self.state.lock().progress.clone()
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.state
                .append("Crawl aborted by an internal error".to_string());
        }

        let mut inner = self.state.lock();
        inner.running = false;
        inner.last_run = Some(Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
    }
}
