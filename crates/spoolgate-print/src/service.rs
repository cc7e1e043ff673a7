// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print submission pipeline.
//
// Order of work for one submission:
//
//   1. document present?            -> MissingDocument
//   2. resolve printer/paper config  -> ConfigValidation
//   3. decode + inspect document     -> InvalidDocument
//   4. write temporary file          -> Storage
//   5. record job as queued
//   6. dispatch (always releases the file)
//   7. move job to unknown/completed/failed
//
// Steps 1-3 touch neither the disk nor the spooler.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use spoolgate_core::config::{PrinterDefaults, ServerConfig};
use spoolgate_core::error::{Result, SpoolgateError};
use spoolgate_core::types::{JobId, JobStatus, PrintJob, PrinterDescriptor};
use spoolgate_spooler::PrintSpooler;

use crate::directory::PrinterDirectory;
use crate::dispatcher::PrintDispatcher;
use crate::id::{JobIdGenerator, UuidJobIds};
use crate::resolver::{RequestFields, resolve};
use crate::store::{self, DocumentStore};
use crate::tracker::JobTracker;

/// How the document arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentPayload {
    /// Base64 text from a JSON body.
    Inline(String),
    /// Raw bytes from a multipart upload.
    Upload(Vec<u8>),
}

impl DocumentPayload {
    fn is_blank(&self) -> bool {
        match self {
            Self::Inline(text) => text.trim().is_empty(),
            Self::Upload(bytes) => bytes.is_empty(),
        }
    }

    fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            Self::Inline(text) => store::decode_inline(&text),
            Self::Upload(bytes) => Ok(bytes),
        }
    }
}

/// One parsed print request.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub document: Option<DocumentPayload>,
    pub fields: RequestFields,
}

/// Result of a submission that reached the spooler.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub job_id: JobId,
    pub status: JobStatus,
    pub submitted_at: DateTime<Utc>,
    /// Internal failure detail when `status` is `Failed`.
    pub diagnostic: Option<String>,
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        self.status != JobStatus::Failed
    }
}

/// The print gateway's application service.
#[derive(Clone)]
pub struct PrintService {
    defaults: PrinterDefaults,
    directory: PrinterDirectory,
    store: Arc<DocumentStore>,
    dispatcher: PrintDispatcher,
    tracker: Arc<JobTracker>,
    ids: Arc<dyn JobIdGenerator>,
}

impl PrintService {
    pub fn new(config: &ServerConfig, spooler: Arc<dyn PrintSpooler>, store: DocumentStore) -> Self {
        let store = Arc::new(store);
        Self {
            defaults: config.printer.clone(),
            directory: PrinterDirectory::new(Arc::clone(&spooler)),
            dispatcher: PrintDispatcher::new(spooler, Arc::clone(&store)),
            store,
            tracker: Arc::new(JobTracker::new()),
            ids: Arc::new(UuidJobIds),
        }
    }

    /// Replace the job id source.
    pub fn with_id_generator(mut self, ids: Arc<dyn JobIdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn tracker(&self) -> &JobTracker {
        &self.tracker
    }

    /// List printers known to the OS.
    pub async fn list_printers(&self) -> Result<Vec<PrinterDescriptor>> {
        self.directory.list_printers().await
    }

    /// Run one submission through the pipeline.
    ///
    /// Validation and storage failures are returned as errors and leave no
    /// job record. Once the job is recorded, a spooler failure is reported
    /// through the outcome's `Failed` status instead.
    pub async fn submit(&self, submission: Submission) -> Result<SubmissionOutcome> {
        let Submission { document, fields } = submission;

        let document = document
            .filter(|d| !d.is_blank())
            .ok_or(SpoolgateError::MissingDocument)?;
        let config = resolve(&fields, &self.defaults)?;
        let bytes = document.into_bytes()?;
        store::inspect(&bytes)?;

        let stored = self.store.store(&bytes).await?;
        drop(bytes);

        let job_id = self.ids.next_id();
        let job = PrintJob::new(job_id, config.clone(), stored.sha256().to_string());
        let submitted_at = job.submitted_at;
        self.tracker.record(job)?;

        info!(
            job_id = %job_id,
            printer = %config.printer_id,
            paper_size = %config.paper_size,
            orientation = ?config.orientation,
            content_type = stored.document_type().mime_type(),
            bytes = stored.len(),
            sha256 = %stored.sha256(),
            "print job submitted"
        );

        let title = format!("spoolgate-{job_id}");
        let result = self.dispatcher.dispatch(stored, &config, &title).await;

        let (status, diagnostic) = match (&result.receipt, result.success) {
            (Some(receipt), true) => {
                if let Some(spool_id) = &receipt.spool_id {
                    self.tracker.attach_spool_id(&job_id, spool_id)?;
                }
                let status = if receipt.completed {
                    JobStatus::Completed
                } else {
                    JobStatus::Unknown
                };
                (status, None)
            }
            _ => (JobStatus::Failed, result.diagnostic.clone()),
        };

        if let Err(e) = self.tracker.transition(&job_id, status, diagnostic.as_deref()) {
            warn!(job_id = %job_id, error = %e, "could not record dispatch outcome");
        }

        Ok(SubmissionOutcome {
            job_id,
            status,
            submitted_at,
            diagnostic,
        })
    }

    /// Look up a job by its textual id.
    pub fn job_status(&self, raw_id: &str) -> Result<PrintJob> {
        self.tracker.lookup(raw_id)
    }
}
