// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Spoolgate.

use thiserror::Error;

use crate::types::{ConfigField, JobStatus};

/// Top-level error type for all Spoolgate operations.
#[derive(Debug, Error)]
pub enum SpoolgateError {
    // -- Submission validation --
    #[error("no document supplied")]
    MissingDocument,

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("missing required configuration field: {field}")]
    ConfigValidation { field: ConfigField },

    // -- Spooler --
    #[error("printer enumeration failed: {0}")]
    PrinterEnumeration(String),

    #[error("print dispatch failed: {0}")]
    Dispatch(String),

    // -- Job tracking --
    #[error("job not found: {0}")]
    JobNotFound(String),

    #[error("job {job_id} cannot move from {from} to {to}")]
    InvalidTransition {
        job_id: String,
        from: JobStatus,
        to: JobStatus,
    },

    // -- Storage / process --
    #[error("document storage failed: {0}")]
    Storage(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("HTTP server error: {0}")]
    Server(String),

    #[error("print spooler not available on this platform")]
    PlatformUnavailable,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SpoolgateError>;
