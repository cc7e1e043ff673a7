// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory job status tracker.
//
// Records live for the lifetime of the process and are not persisted. Status
// only ever moves out of `Queued`; terminal states are final.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{debug, info, instrument};

use spoolgate_core::error::{Result, SpoolgateError};
use spoolgate_core::types::{JobId, JobStatus, PrintJob};

/// Process-wide table of submitted jobs.
#[derive(Debug, Default)]
pub struct JobTracker {
    jobs: Mutex<HashMap<JobId, PrintJob>>,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn jobs(&self) -> MutexGuard<'_, HashMap<JobId, PrintJob>> {
        // The map holds plain data; a panic mid-update cannot leave it torn.
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a new job record with its initial status.
    #[instrument(skip(self, job), fields(job_id = %job.id, status = %job.status))]
    pub fn record(&self, job: PrintJob) -> Result<()> {
        let mut jobs = self.jobs();
        if let Some(existing) = jobs.get(&job.id) {
            return Err(SpoolgateError::InvalidTransition {
                job_id: job.id.to_string(),
                from: existing.status,
                to: job.status,
            });
        }
        info!("job recorded");
        jobs.insert(job.id, job);
        Ok(())
    }

    /// Move a job to `status`, optionally noting an error message.
    ///
    /// Fails with `JobNotFound` for unknown ids and `InvalidTransition` when
    /// the job has already reached a terminal state.
    #[instrument(skip(self, error_message), fields(job_id = %job_id))]
    pub fn transition(
        &self,
        job_id: &JobId,
        status: JobStatus,
        error_message: Option<&str>,
    ) -> Result<PrintJob> {
        let mut jobs = self.jobs();
        let job = jobs
            .get_mut(job_id)
            .ok_or_else(|| SpoolgateError::JobNotFound(job_id.to_string()))?;

        if !job.status.can_transition_to(status) {
            return Err(SpoolgateError::InvalidTransition {
                job_id: job_id.to_string(),
                from: job.status,
                to: status,
            });
        }

        job.status = status;
        job.updated_at = Utc::now();
        if let Some(message) = error_message {
            job.error_message = Some(message.to_string());
        }

        debug!(status = %status, "job status updated");
        Ok(job.clone())
    }

    /// Remember the identifier the spooler assigned.
    pub fn attach_spool_id(&self, job_id: &JobId, spool_id: &str) -> Result<()> {
        let mut jobs = self.jobs();
        let job = jobs
            .get_mut(job_id)
            .ok_or_else(|| SpoolgateError::JobNotFound(job_id.to_string()))?;
        job.spool_id = Some(spool_id.to_string());
        Ok(())
    }

    /// Retrieve a job by id.
    pub fn get(&self, job_id: &JobId) -> Result<PrintJob> {
        self.jobs()
            .get(job_id)
            .cloned()
            .ok_or_else(|| SpoolgateError::JobNotFound(job_id.to_string()))
    }

    /// Retrieve a job by its textual id. Text that is not a valid id is
    /// reported as not found.
    pub fn lookup(&self, raw_id: &str) -> Result<PrintJob> {
        let job_id: JobId = raw_id
            .parse()
            .map_err(|_| SpoolgateError::JobNotFound(raw_id.to_string()))?;
        self.get(&job_id)
    }

    pub fn len(&self) -> usize {
        self.jobs().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs().is_empty()
    }
}
