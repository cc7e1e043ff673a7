// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub spooler for hosts without the CUPS command-line tools.
//
// Every method returns `PlatformUnavailable`.

use std::path::Path;

use spoolgate_core::error::{Result, SpoolgateError};
use spoolgate_core::types::{PrintJobConfig, PrinterDescriptor};

use crate::traits::{PrintSpooler, SpoolReceipt};

/// No-op spooler returned on non-unix platforms.
pub struct StubSpooler;

impl PrintSpooler for StubSpooler {
    fn backend_name(&self) -> &str {
        "unavailable (stub)"
    }

    fn list_printers(&self) -> Result<Vec<PrinterDescriptor>> {
        tracing::warn!("PrintSpooler::list_printers called on stub spooler");
        Err(SpoolgateError::PlatformUnavailable)
    }

    fn print(
        &self,
        _document: &Path,
        _config: &PrintJobConfig,
        _title: &str,
    ) -> Result<SpoolReceipt> {
        tracing::warn!("PrintSpooler::print called on stub spooler");
        Err(SpoolgateError::PlatformUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spoolgate_core::types::{Orientation, ScaleMode};

    #[test]
    fn every_call_is_unavailable() {
        let spooler = StubSpooler;
        assert!(!spooler.backend_name().is_empty());
        assert!(matches!(
            spooler.list_printers(),
            Err(SpoolgateError::PlatformUnavailable)
        ));

        let config = PrintJobConfig {
            printer_id: "HP-LaserJet".into(),
            orientation: Orientation::Portrait,
            paper_size: "A4".into(),
            scale: ScaleMode::NoScale,
        };
        assert!(matches!(
            spooler.print(Path::new("/tmp/doc.pdf"), &config, "doc.pdf"),
            Err(SpoolgateError::PlatformUnavailable)
        ));
    }
}
