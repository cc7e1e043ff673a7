// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spoolgate spooler: bridge to the operating system's print spooler.
//
// The rest of the gateway only sees the `PrintSpooler` trait. On unix hosts
// the implementation shells out to the CUPS command-line tools; elsewhere a
// stub reports the capability as unavailable.

pub mod traits;

#[cfg(unix)]
pub mod cups;

#[cfg(any(test, not(unix)))]
pub mod stub;

use std::sync::Arc;

use spoolgate_core::ServerConfig;

pub use traits::{PrintSpooler, SpoolReceipt};

/// Build the spooler implementation for the target operating system.
pub fn platform_spooler(config: &ServerConfig) -> Arc<dyn PrintSpooler> {
    #[cfg(unix)]
    {
        Arc::new(cups::CupsSpooler::new(
            config.lp_command.clone(),
            config.lpstat_command.clone(),
        ))
    }
    #[cfg(not(unix))]
    {
        let _ = config;
        Arc::new(stub::StubSpooler)
    }
}
