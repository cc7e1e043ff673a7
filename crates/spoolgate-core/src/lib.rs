// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spoolgate core: types, error definitions, and configuration shared across
// all crates.

pub mod config;
pub mod error;
pub mod public_errors;
pub mod types;

pub use config::{PrinterDefaults, ServerConfig};
pub use error::SpoolgateError;
pub use types::*;
