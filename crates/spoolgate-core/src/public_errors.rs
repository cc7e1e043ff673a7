// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Caller-facing error descriptions.
//
// Every internal error is mapped to an HTTP status plus a short, fixed
// message. Spooler stderr, file paths, and I/O details stay in the logs.

use serde::Serialize;

use crate::error::SpoolgateError;
use crate::types::ConfigField;

/// Which side of the exchange caused the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blame {
    /// The request was incomplete or malformed (4xx).
    Caller,
    /// The gateway or the OS print subsystem failed (5xx).
    Gateway,
}

/// An error as it is shown to an API caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicError {
    #[serde(skip)]
    pub status: u16,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PublicError {
    fn new(status: u16, error: &str) -> Self {
        Self {
            status,
            error: error.into(),
            message: None,
        }
    }

    fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn blame(&self) -> Blame {
        if self.status < 500 {
            Blame::Caller
        } else {
            Blame::Gateway
        }
    }
}

/// Error text shared by every 5xx response.
pub const INTERNAL_ERROR: &str = "Internal server error";

/// Convert a `SpoolgateError` into the body an API caller receives.
pub fn public_error(err: &SpoolgateError) -> PublicError {
    match err {
        SpoolgateError::MissingDocument
        | SpoolgateError::ConfigValidation {
            field: ConfigField::PrinterId,
        } => PublicError::new(400, "Missing required field: document or printer ID"),

        SpoolgateError::ConfigValidation {
            field: ConfigField::PaperSize,
        } => PublicError::new(400, "Missing required configuration field: paper size"),

        SpoolgateError::InvalidDocument(_) => PublicError::new(400, "Invalid document")
            .with_message("Document must be a base64-encoded or uploaded PDF"),

        SpoolgateError::JobNotFound(_) => PublicError::new(404, "Job not found"),

        SpoolgateError::PrinterEnumeration(_) => {
            PublicError::new(500, INTERNAL_ERROR).with_message("Failed to retrieve printers")
        }

        SpoolgateError::Dispatch(_)
        | SpoolgateError::Storage(_)
        | SpoolgateError::InvalidTransition { .. }
        | SpoolgateError::PlatformUnavailable => {
            PublicError::new(500, INTERNAL_ERROR).with_message("Failed to submit print job")
        }

        SpoolgateError::Config(_) | SpoolgateError::Server(_) => {
            PublicError::new(500, INTERNAL_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_printer_matches_missing_document() {
        let a = public_error(&SpoolgateError::MissingDocument);
        let b = public_error(&SpoolgateError::ConfigValidation {
            field: ConfigField::PrinterId,
        });
        assert_eq!(a, b);
        assert_eq!(a.status, 400);
        assert_eq!(a.blame(), Blame::Caller);
    }

    #[test]
    fn enumeration_failure_hides_detail() {
        let err = SpoolgateError::PrinterEnumeration("lpstat: scheduler is not running".into());
        let public = public_error(&err);
        assert_eq!(public.status, 500);
        assert_eq!(public.error, INTERNAL_ERROR);
        assert_eq!(public.message.as_deref(), Some("Failed to retrieve printers"));
        assert_eq!(public.blame(), Blame::Gateway);
    }

    #[test]
    fn dispatch_failure_hides_detail() {
        let public = public_error(&SpoolgateError::Dispatch("lp: No such file".into()));
        assert_eq!(public.message.as_deref(), Some("Failed to submit print job"));
        let body = serde_json::to_value(&public).expect("serialize");
        assert!(!body.to_string().contains("No such file"));
    }

    #[test]
    fn paper_size_has_its_own_message() {
        let public = public_error(&SpoolgateError::ConfigValidation {
            field: ConfigField::PaperSize,
        });
        assert_eq!(public.error, "Missing required configuration field: paper size");
        let body = serde_json::to_value(&public).expect("serialize");
        assert!(body.get("message").is_none());
        assert!(body.get("status").is_none());
    }
}
