// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Spoolgate print gateway.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a print job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Lifecycle states of a print job.
///
/// `Queued` is the only non-terminal state. `Unknown` means the spooler took
/// the job but gave no way to observe whether it finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted by the gateway, not yet handed to the spooler.
    Queued,
    /// The spooler reported the job as printed.
    Completed,
    /// Rejected by the spooler or lost before dispatch.
    Failed,
    /// Handed to the spooler; completion is not observable.
    Unknown,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Queued)
    }

    /// Transitions only ever leave `Queued`.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        !self.is_terminal() && next != Self::Queued
    }

    /// Coarse progress percentage reported by the status endpoint.
    pub fn progress(&self) -> Option<u8> {
        match self {
            Self::Queued | Self::Failed => Some(0),
            Self::Completed => Some(100),
            Self::Unknown => None,
        }
    }

    /// Short human-readable summary for status responses.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Queued => "Print job is queued",
            Self::Completed => "Print job completed",
            Self::Failed => "Print job failed",
            Self::Unknown => "Print job was handed to the spooler; completion is not reported",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported input document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    Pdf,
}

impl DocumentType {
    /// MIME type string.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
        }
    }

    /// File extension used for stored documents.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
        }
    }

    /// Infer the document type from its leading bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"%PDF-") {
            Some(Self::Pdf)
        } else {
            None
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// Parse a raw value, falling back to portrait for anything unrecognised.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) if s == "landscape" => Self::Landscape,
            _ => Self::Portrait,
        }
    }

    /// IPP `orientation-requested` enum value (RFC 8011 §5.2.10).
    pub fn ipp_enum_value(&self) -> i32 {
        match self {
            Self::Portrait => 3,
            Self::Landscape => 4,
        }
    }
}

/// Page scaling applied by the spooler. Only `NoScale` is offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    #[default]
    NoScale,
}

impl ScaleMode {
    /// IPP `print-scaling` keyword.
    pub fn ipp_keyword(&self) -> &'static str {
        match self {
            Self::NoScale => "none",
        }
    }
}

/// Required job configuration fields with no safe default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigField {
    PrinterId,
    PaperSize,
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrinterId => f.write_str("printer ID"),
            Self::PaperSize => f.write_str("paper size"),
        }
    }
}

/// Fully resolved options for one print submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintJobConfig {
    pub printer_id: String,
    pub orientation: Orientation,
    pub paper_size: String,
    pub scale: ScaleMode,
}

/// A tracked print submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintJob {
    pub id: JobId,
    pub config: PrintJobConfig,
    pub status: JobStatus,
    /// SHA-256 hash of the submitted document bytes.
    pub document_hash: String,
    /// Identifier the OS spooler assigned, when it reports one.
    pub spool_id: Option<String>,
    pub error_message: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PrintJob {
    pub fn new(id: JobId, config: PrintJobConfig, document_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            config,
            status: JobStatus::Queued,
            document_hash,
            spool_id: None,
            error_message: None,
            submitted_at: now,
            updated_at: now,
        }
    }
}

/// A printer known to the OS print subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterDescriptor {
    pub name: String,
    /// State line reported by the spooler (e.g. "idle").
    pub description: Option<String>,
    pub is_default: bool,
}
