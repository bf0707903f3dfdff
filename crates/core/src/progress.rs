//! Per-job progress tracking.
//!
//! A [`ProgressRecord`] is the single mutable object describing one
//! translation job. The worker driving the job writes to it; any number of
//! pollers read it through [`ProgressRecord::snapshot`]. Every operation
//! takes the record's own mutex exactly once and never performs I/O while
//! holding it.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::types::{JobId, Timestamp};

/// Number of log entries retained per job. Older entries are discarded.
pub const MAX_LOG_ENTRIES: usize = 50;

/// Maximum length (in characters) of [`ProgressSnapshot::current_item`].
pub const MAX_ITEM_CHARS: usize = 100;

/// Message recorded when a failure carries no text of its own.
const UNKNOWN_ERROR: &str = "Unknown error";

// ---------------------------------------------------------------------------
// Status and log types
// ---------------------------------------------------------------------------

/// Lifecycle status of a translation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Paused,
    Completed,
    Error,
    Cancelled,
}

impl JobStatus {
    /// Terminal statuses never transition again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error | Self::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Error => "error",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Severity of a user-facing job log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// One timestamped line in a job's log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: Timestamp,
    pub message: String,
    pub level: LogLevel,
}

/// Point-in-time copy of a [`ProgressRecord`], safe to serialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub current: u64,
    pub total: u64,
    pub status: JobStatus,
    pub current_item: String,
    pub errors: u64,
    pub tokens_used: u64,
    pub start_time: Option<Timestamp>,
    pub error_message: Option<String>,
    pub output_file: Option<String>,
    /// At most [`MAX_LOG_ENTRIES`] entries, oldest first.
    pub logs: Vec<LogEntry>,
}

// ---------------------------------------------------------------------------
// Partial updates
// ---------------------------------------------------------------------------

/// A set of counter and description assignments applied atomically by
/// [`ProgressRecord::update`].
///
/// Status, error message and output path are deliberately absent: they only
/// change through the transition methods so the record's invariants hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressPatch {
    pub current: Option<u64>,
    pub total: Option<u64>,
    pub current_item: Option<String>,
    pub errors: Option<u64>,
    pub tokens_used: Option<u64>,
}

impl ProgressPatch {
    pub fn current(mut self, current: u64) -> Self {
        self.current = Some(current);
        self
    }

    pub fn total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    pub fn current_item(mut self, item: impl Into<String>) -> Self {
        self.current_item = Some(item.into());
        self
    }

    pub fn errors(mut self, errors: u64) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn tokens_used(mut self, tokens: u64) -> Self {
        self.tokens_used = Some(tokens);
        self
    }
}

// ---------------------------------------------------------------------------
// ProgressRecord
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct ProgressState {
    status: JobStatus,
    current: u64,
    total: u64,
    current_item: String,
    errors: u64,
    tokens_used: u64,
    start_time: Option<Timestamp>,
    error_message: Option<String>,
    output_file: Option<PathBuf>,
    logs: VecDeque<LogEntry>,
}

impl ProgressState {
    fn new() -> Self {
        Self {
            status: JobStatus::Pending,
            current: 0,
            total: 0,
            current_item: String::new(),
            errors: 0,
            tokens_used: 0,
            start_time: None,
            error_message: None,
            output_file: None,
            logs: VecDeque::with_capacity(MAX_LOG_ENTRIES),
        }
    }

    fn push_log(&mut self, message: String, level: LogLevel) {
        if self.logs.len() == MAX_LOG_ENTRIES {
            self.logs.pop_front();
        }
        self.logs.push_back(LogEntry {
            timestamp: chrono::Utc::now(),
            message,
            level,
        });
    }
}

/// Thread-safe progress object for one job.
///
/// Shared as `Arc<ProgressRecord>` between the registry, the worker thread
/// and request handlers.
#[derive(Debug)]
pub struct ProgressRecord {
    id: JobId,
    state: Mutex<ProgressState>,
}

impl ProgressRecord {
    /// Create a fresh record in `pending` status.
    pub fn new(id: JobId) -> Self {
        Self {
            id,
            state: Mutex::new(ProgressState::new()),
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    /// The state is plain data, so a panic in another holder cannot leave it
    /// half-written in a way readers care about; recover from poisoning.
    fn lock(&self) -> MutexGuard<'_, ProgressState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Apply a set of field assignments in one critical section.
    ///
    /// `current`, `errors` and `tokens_used` never move backwards.
    pub fn update(&self, patch: ProgressPatch) {
        let mut state = self.lock();
        if let Some(current) = patch.current {
            state.current = state.current.max(current);
        }
        if let Some(total) = patch.total {
            state.total = total;
        }
        if let Some(item) = patch.current_item {
            state.current_item = truncate_item(&item);
        }
        if let Some(errors) = patch.errors {
            state.errors = state.errors.max(errors);
        }
        if let Some(tokens) = patch.tokens_used {
            state.tokens_used = state.tokens_used.max(tokens);
        }
    }

    /// Append one timestamped log entry, discarding the oldest entry once
    /// [`MAX_LOG_ENTRIES`] are held.
    pub fn append_log(&self, message: impl Into<String>, level: LogLevel) {
        self.lock().push_log(message.into(), level);
    }

    /// Copy every field for external consumption.
    pub fn snapshot(&self) -> ProgressSnapshot {
        let state = self.lock();
        ProgressSnapshot {
            current: state.current,
            total: state.total,
            status: state.status,
            current_item: state.current_item.clone(),
            errors: state.errors,
            tokens_used: state.tokens_used,
            start_time: state.start_time,
            error_message: state.error_message.clone(),
            output_file: state
                .output_file
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
            logs: state.logs.iter().cloned().collect(),
        }
    }

    pub fn status(&self) -> JobStatus {
        self.lock().status
    }

    /// Path of the relocated artifact, present only for completed jobs.
    pub fn output_file(&self) -> Option<PathBuf> {
        self.lock().output_file.clone()
    }

    // -- engine-driven counters ---------------------------------------------

    /// Count one processed unit and remember its (truncated) description.
    pub fn record_unit(&self, description: &str) {
        let mut state = self.lock();
        state.current += 1;
        state.current_item = truncate_item(description);
    }

    /// Count one recoverable unit-level failure.
    pub fn record_unit_failure(&self) {
        self.lock().errors += 1;
    }

    pub fn add_tokens(&self, tokens: u64) {
        let mut state = self.lock();
        state.tokens_used = state.tokens_used.saturating_add(tokens);
    }

    // -- status transitions -------------------------------------------------
    //
    // Each transition returns `false` without touching the record when the
    // job is already terminal.

    /// Worker start: `pending -> running` and stamp `start_time`.
    ///
    /// A job paused before its worker started keeps the `paused` label.
    pub fn mark_running(&self) -> bool {
        let mut state = self.lock();
        if state.status.is_terminal() {
            return false;
        }
        if state.status == JobStatus::Pending {
            state.status = JobStatus::Running;
        }
        state.start_time.get_or_insert_with(chrono::Utc::now);
        true
    }

    /// Flip the label to `paused`. The worker is not suspended.
    pub fn pause(&self) -> bool {
        let mut state = self.lock();
        if state.status.is_terminal() {
            return false;
        }
        state.status = JobStatus::Paused;
        state.push_log("Translation paused by user".into(), LogLevel::Warning);
        true
    }

    /// Flip the label back to `running`.
    pub fn resume(&self) -> bool {
        let mut state = self.lock();
        if state.status.is_terminal() {
            return false;
        }
        state.status = JobStatus::Running;
        state.start_time.get_or_insert_with(chrono::Utc::now);
        state.push_log("Translation resumed by user".into(), LogLevel::Info);
        true
    }

    /// Successful finish, optionally with the relocated artifact.
    pub fn mark_completed(&self, output_file: Option<&Path>) -> bool {
        let mut state = self.lock();
        if state.status.is_terminal() {
            return false;
        }
        state.status = JobStatus::Completed;
        state.output_file = output_file.map(Path::to_path_buf);
        true
    }

    /// Failed finish; records the message and an error-level log entry.
    pub fn mark_failed(&self, message: &str) -> bool {
        let mut state = self.lock();
        if state.status.is_terminal() {
            return false;
        }
        let message = if message.trim().is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            message.to_string()
        };
        state.status = JobStatus::Error;
        state.push_log(format!("Translation failed: {message}"), LogLevel::Error);
        state.error_message = Some(message);
        true
    }

    /// User cancellation. Label only: whoever runs the job keeps running.
    pub fn mark_cancelled(&self) -> bool {
        let mut state = self.lock();
        if state.status.is_terminal() {
            return false;
        }
        state.status = JobStatus::Cancelled;
        state.push_log("Translation cancelled by user".into(), LogLevel::Warning);
        true
    }
}

/// Cut a unit description down to [`MAX_ITEM_CHARS`] characters.
fn truncate_item(item: &str) -> String {
    item.chars().take(MAX_ITEM_CHARS).collect()
}
