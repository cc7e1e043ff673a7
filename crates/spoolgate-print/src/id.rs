// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Job identifier generation.

use spoolgate_core::types::JobId;

/// Source of job identifiers (swappable for deterministic ids in tests).
pub trait JobIdGenerator: Send + Sync {
    /// Produce an identifier no earlier call has returned.
    fn next_id(&self) -> JobId;
}

/// Random UUID v4 identifiers.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidJobIds;

impl JobIdGenerator for UuidJobIds {
    fn next_id(&self) -> JobId {
        JobId::new()
    }
}
