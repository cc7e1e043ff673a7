// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spoolgate print: the submission pipeline. Documents are validated and
// written to a private temporary file, handed to the OS spooler, removed
// again, and the outcome is recorded against a job id the caller can query.

pub mod directory;
pub mod dispatcher;
pub mod id;
pub mod resolver;
pub mod service;
pub mod store;
pub mod tracker;

pub use directory::PrinterDirectory;
pub use dispatcher::{DispatchResult, PrintDispatcher};
pub use id::{JobIdGenerator, UuidJobIds};
pub use resolver::{RequestFields, resolve};
pub use service::{DocumentPayload, PrintService, Submission, SubmissionOutcome};
pub use store::{DocumentStore, StoredDocument};
pub use tracker::JobTracker;
