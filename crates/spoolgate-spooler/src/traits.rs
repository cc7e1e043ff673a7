// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait for the OS print capability.

use std::path::Path;

use spoolgate_core::error::Result;
use spoolgate_core::types::{PrintJobConfig, PrinterDescriptor};

/// What the spooler reports back after accepting a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpoolReceipt {
    /// Identifier the spooler assigned to the job, if it printed one.
    pub spool_id: Option<String>,
    /// True only when the spooler confirms the job finished printing.
    pub completed: bool,
}

/// The opaque OS print facility.
///
/// Calls are blocking. Async callers run them on the blocking pool
/// (`tokio::task::spawn_blocking`).
pub trait PrintSpooler: Send + Sync {
    /// Human-readable backend name (e.g. "CUPS").
    fn backend_name(&self) -> &str;

    /// Enumerate the printers the OS knows about, in spooler order.
    ///
    /// Fails with `SpoolgateError::PrinterEnumeration` when the query fails.
    fn list_printers(&self) -> Result<Vec<PrinterDescriptor>>;

    /// Submit the file at `document` with the given options.
    ///
    /// Fails with `SpoolgateError::Dispatch` when the spooler rejects it.
    fn print(&self, document: &Path, config: &PrintJobConfig, title: &str)
        -> Result<SpoolReceipt>;
}
