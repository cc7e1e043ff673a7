// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer directory. A fresh spooler query on every call, nothing cached.

use std::sync::Arc;

use tracing::{debug, error};

use spoolgate_core::error::{Result, SpoolgateError};
use spoolgate_core::types::PrinterDescriptor;
use spoolgate_spooler::PrintSpooler;

/// Read-only view of the printers the OS knows about.
#[derive(Clone)]
pub struct PrinterDirectory {
    spooler: Arc<dyn PrintSpooler>,
}

impl PrinterDirectory {
    pub fn new(spooler: Arc<dyn PrintSpooler>) -> Self {
        Self { spooler }
    }

    /// List printers in the order the spooler reports them.
    ///
    /// Every failure surfaces as `PrinterEnumeration`.
    pub async fn list_printers(&self) -> Result<Vec<PrinterDescriptor>> {
        let spooler = Arc::clone(&self.spooler);
        let outcome = tokio::task::spawn_blocking(move || spooler.list_printers()).await;

        let result = match outcome {
            Ok(Ok(printers)) => Ok(printers),
            Ok(Err(SpoolgateError::PrinterEnumeration(detail))) => {
                Err(SpoolgateError::PrinterEnumeration(detail))
            }
            Ok(Err(other)) => Err(SpoolgateError::PrinterEnumeration(other.to_string())),
            Err(join) => Err(SpoolgateError::PrinterEnumeration(format!(
                "printer query task failed: {join}"
            ))),
        };

        match &result {
            Ok(printers) => debug!(
                backend = self.spooler.backend_name(),
                count = printers.len(),
                "printers listed"
            ),
            Err(e) => error!(backend = self.spooler.backend_name(), error = %e, "error fetching printers"),
        }
        result
    }
}
