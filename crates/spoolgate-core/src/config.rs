// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Process-wide configuration, read once at start-up.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpoolgateError};

/// Default request body cap (matches a 10 MiB JSON limit).
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Printer options applied when a request does not carry its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterDefaults {
    pub printer_id: Option<String>,
    /// Raw orientation text; unrecognised values resolve to portrait.
    pub orientation: Option<String>,
    pub paper_size: Option<String>,
}

/// Settings for the gateway process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    pub host: IpAddr,
    /// Port for the HTTP listener (0 picks a free port).
    pub port: u16,
    /// Directory holding in-flight documents.
    pub upload_dir: PathBuf,
    /// Largest accepted request body.
    pub max_body_bytes: usize,
    pub printer: PrinterDefaults,
    /// CUPS submit program.
    pub lp_command: String,
    /// CUPS query program.
    pub lpstat_command: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            upload_dir: PathBuf::from("uploads"),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            printer: PrinterDefaults::default(),
            lp_command: "lp".into(),
            lpstat_command: "lpstat".into(),
        }
    }
}

impl ServerConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let host = match get("HOST") {
            Some(raw) => raw
                .parse::<IpAddr>()
                .map_err(|e| SpoolgateError::Config(format!("HOST={raw}: {e}")))?,
            None => defaults.host,
        };

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| SpoolgateError::Config(format!("PORT={raw}: {e}")))?,
            None => defaults.port,
        };

        let max_body_bytes = match get("MAX_BODY_BYTES") {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|e| SpoolgateError::Config(format!("MAX_BODY_BYTES={raw}: {e}")))?,
            None => defaults.max_body_bytes,
        };

        Ok(Self {
            host,
            port,
            upload_dir: get("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            max_body_bytes,
            printer: PrinterDefaults {
                printer_id: get("PRINTER_ID"),
                orientation: get("PRINTER_ORIENTATION"),
                paper_size: get("PRINTER_PAPER_SIZE"),
            },
            lp_command: get("LP_COMMAND").unwrap_or(defaults.lp_command),
            lpstat_command: get("LPSTAT_COMMAND").unwrap_or(defaults.lpstat_command),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).expect("config");
        assert_eq!(config.port, 3000);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert_eq!(config.printer, PrinterDefaults::default());
        assert_eq!(config.lp_command, "lp");
    }

    #[test]
    fn printer_settings_are_read() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PRINTER_ID", "HP-LaserJet"),
            ("PRINTER_ORIENTATION", "landscape"),
            ("PRINTER_PAPER_SIZE", "A4"),
            ("PORT", "8080"),
        ]))
        .expect("config");
        assert_eq!(config.port, 8080);
        assert_eq!(config.printer.printer_id.as_deref(), Some("HP-LaserJet"));
        assert_eq!(config.printer.orientation.as_deref(), Some("landscape"));
        assert_eq!(config.printer.paper_size.as_deref(), Some("A4"));
    }

    #[test]
    fn blank_values_count_as_absent() {
        let config = ServerConfig::from_lookup(lookup(&[("PRINTER_ID", "   "), ("PORT", "")]))
            .expect("config");
        assert!(config.printer.printer_id.is_none());
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = ServerConfig::from_lookup(lookup(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, SpoolgateError::Config(_)));
    }
}
