//! In-memory job registry.
//!
//! Every job id lives in exactly one of two partitions: `active` (created,
//! not yet terminal) or `completed` (terminal). Both partitions sit behind a
//! single `RwLock` so a lookup can never observe an id in neither partition
//! while it is being moved.
//!
//! Entries are never evicted; the registry grows for the lifetime of the
//! process.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::progress::ProgressRecord;
use crate::types::JobId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Translation {0} already exists")]
    DuplicateId(JobId),

    #[error("Translation {0} not found")]
    NotFound(JobId),

    #[error("Translation {0} is not active")]
    NotActive(JobId),
}

#[derive(Default)]
struct Partitions {
    active: HashMap<JobId, Arc<ProgressRecord>>,
    completed: HashMap<JobId, Arc<ProgressRecord>>,
}

/// Two-partition map of all jobs known to this process.
#[derive(Default)]
pub struct JobRegistry {
    partitions: RwLock<Partitions>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Partitions> {
        match self.partitions.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Partitions> {
        match self.partitions.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Insert a fresh `pending` record into `active`.
    pub fn create(&self, id: JobId) -> Result<Arc<ProgressRecord>, RegistryError> {
        let mut parts = self.write();
        if parts.active.contains_key(&id) || parts.completed.contains_key(&id) {
            return Err(RegistryError::DuplicateId(id));
        }
        let record = Arc::new(ProgressRecord::new(id));
        parts.active.insert(id, Arc::clone(&record));
        Ok(record)
    }

    /// Find a job in either partition, `active` first.
    pub fn lookup(&self, id: JobId) -> Result<Arc<ProgressRecord>, RegistryError> {
        let parts = self.read();
        parts
            .active
            .get(&id)
            .or_else(|| parts.completed.get(&id))
            .cloned()
            .ok_or(RegistryError::NotFound(id))
    }

    /// Find a job that has not reached a terminal status yet.
    pub fn lookup_active(&self, id: JobId) -> Result<Arc<ProgressRecord>, RegistryError> {
        self.read()
            .active
            .get(&id)
            .cloned()
            .ok_or(RegistryError::NotFound(id))
    }

    /// Find a job that has reached a terminal status.
    pub fn lookup_completed(&self, id: JobId) -> Result<Arc<ProgressRecord>, RegistryError> {
        self.read()
            .completed
            .get(&id)
            .cloned()
            .ok_or(RegistryError::NotFound(id))
    }

    /// Apply a terminal `transition` to the job and move it to `completed`
    /// in one step, so no reader sees a terminal record still in `active`.
    ///
    /// Returns whether the transition applied. A job that is already in
    /// `completed` (cancelled while running) is left where it is and the
    /// transition still runs, where the sticky terminal status turns it into a
    /// no-op. Unknown ids fail with [`RegistryError::NotActive`].
    pub fn complete<F>(&self, id: JobId, transition: F) -> Result<bool, RegistryError>
    where
        F: FnOnce(&ProgressRecord) -> bool,
    {
        let mut parts = self.write();
        if let Some(record) = parts.active.remove(&id) {
            let applied = transition(&record);
            parts.completed.insert(id, record);
            return Ok(applied);
        }
        match parts.completed.get(&id) {
            Some(record) => Ok(transition(record)),
            None => Err(RegistryError::NotActive(id)),
        }
    }

    /// Label the job `cancelled` and move it to `completed` in one step.
    ///
    /// Only active jobs can be cancelled; a second cancel of the same id
    /// reports [`RegistryError::NotFound`]. Whatever is executing the job is
    /// not interrupted.
    pub fn cancel(&self, id: JobId) -> Result<Arc<ProgressRecord>, RegistryError> {
        let mut parts = self.write();
        let record = parts
            .active
            .remove(&id)
            .ok_or(RegistryError::NotFound(id))?;
        record.mark_cancelled();
        parts.completed.insert(id, Arc::clone(&record));
        Ok(record)
    }

    /// `(active, completed)` partition sizes.
    pub fn counts(&self) -> (usize, usize) {
        let parts = self.read();
        (parts.active.len(), parts.completed.len())
    }
}
