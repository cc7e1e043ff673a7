// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print dispatch. Hands a stored document to the spooler and always releases
// it afterwards.
//
// The spooler call is blocking, so it runs on tokio's blocking pool. The
// document is released only once that call has returned (or panicked), never
// before and never skipped. Failures come back as a `DispatchResult` rather
// than an error so callers always get the two-outcome contract.

use std::sync::Arc;

use tracing::{error, info, warn};

use spoolgate_core::error::SpoolgateError;
use spoolgate_core::types::PrintJobConfig;
use spoolgate_spooler::{PrintSpooler, SpoolReceipt};

use crate::store::{DocumentStore, StoredDocument};

/// Outcome of one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult {
    pub success: bool,
    /// Internal failure detail, for logs and the job record only.
    pub diagnostic: Option<String>,
    /// Spooler receipt on success.
    pub receipt: Option<SpoolReceipt>,
}

impl DispatchResult {
    fn accepted(receipt: SpoolReceipt) -> Self {
        Self {
            success: true,
            diagnostic: None,
            receipt: Some(receipt),
        }
    }

    fn failed(diagnostic: String) -> Self {
        Self {
            success: false,
            diagnostic: Some(diagnostic),
            receipt: None,
        }
    }
}

/// Sends stored documents to the OS spooler.
#[derive(Clone)]
pub struct PrintDispatcher {
    spooler: Arc<dyn PrintSpooler>,
    store: Arc<DocumentStore>,
}

impl PrintDispatcher {
    pub fn new(spooler: Arc<dyn PrintSpooler>, store: Arc<DocumentStore>) -> Self {
        Self { spooler, store }
    }

    /// Print `document` with `config`, then release it.
    pub async fn dispatch(
        &self,
        document: StoredDocument,
        config: &PrintJobConfig,
        title: &str,
    ) -> DispatchResult {
        let spooler = Arc::clone(&self.spooler);
        let path = document.path().to_path_buf();
        let job_config = config.clone();
        let job_title = title.to_string();

        let outcome = tokio::task::spawn_blocking(move || {
            spooler.print(&path, &job_config, &job_title)
        })
        .await;

        if let Err(e) = self.store.release(&document).await {
            warn!(error = %e, "failed to release document after dispatch");
        }
        drop(document);

        let result = match outcome {
            Ok(Ok(receipt)) => DispatchResult::accepted(receipt),
            Ok(Err(SpoolgateError::Dispatch(detail))) => DispatchResult::failed(detail),
            Ok(Err(other)) => DispatchResult::failed(other.to_string()),
            Err(join) => DispatchResult::failed(format!("print task failed: {join}")),
        };

        if result.success {
            info!(
                printer = %config.printer_id,
                backend = self.spooler.backend_name(),
                "print job dispatched"
            );
        } else {
            error!(
                printer = %config.printer_id,
                backend = self.spooler.backend_name(),
                diagnostic = result.diagnostic.as_deref().unwrap_or_default(),
                "print dispatch failed"
            );
        }
        result
    }
}
