// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CUPS spooler driven through its command-line tools.
//
// Printer enumeration uses `lpstat -p` (plus `lpstat -d` for the default
// destination) and submission uses `lp`. Both run with `LC_ALL=C` so the
// output we parse is not localised.
//
// `lp` returns as soon as the scheduler has queued the file. CUPS does not
// tell us when the page actually leaves the printer, so receipts from this
// backend never claim completion.

use std::path::Path;
use std::process::{Command, Output, Stdio};

use tracing::{debug, info, warn};

use spoolgate_core::error::{Result, SpoolgateError};
use spoolgate_core::types::{PrintJobConfig, PrinterDescriptor};

use crate::traits::{PrintSpooler, SpoolReceipt};

/// `lpstat` prints this (and exits non-zero) when no queues exist.
const NO_DESTINATIONS: &str = "No destinations added";

/// Spooler backed by the CUPS `lp` and `lpstat` programs.
#[derive(Debug, Clone)]
pub struct CupsSpooler {
    lp_program: String,
    lpstat_program: String,
}

impl Default for CupsSpooler {
    fn default() -> Self {
        Self::new("lp", "lpstat")
    }
}

impl CupsSpooler {
    pub fn new(lp_program: impl Into<String>, lpstat_program: impl Into<String>) -> Self {
        Self {
            lp_program: lp_program.into(),
            lpstat_program: lpstat_program.into(),
        }
    }

    /// Build the `lp` argument list for one submission.
    pub fn lp_args(document: &Path, config: &PrintJobConfig, title: &str) -> Vec<String> {
        vec![
            "-d".into(),
            config.printer_id.clone(),
            "-o".into(),
            format!("media={}", config.paper_size),
            "-o".into(),
            format!("orientation-requested={}", config.orientation.ipp_enum_value()),
            "-o".into(),
            format!("print-scaling={}", config.scale.ipp_keyword()),
            "-t".into(),
            title.into(),
            "--".into(),
            document.display().to_string(),
        ]
    }

    fn run(program: &str, args: &[String]) -> std::io::Result<Output> {
        debug!(program, ?args, "running spooler command");
        Command::new(program)
            .args(args)
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
    }

    /// Name of the system default destination, if one is configured.
    fn default_destination(&self) -> Option<String> {
        match Self::run(&self.lpstat_program, &["-d".into()]) {
            Ok(output) if output.status.success() => {
                parse_default_destination(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(output) => {
                debug!(
                    stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                    "lpstat -d reported no default destination"
                );
                None
            }
            Err(e) => {
                warn!(error = %e, "lpstat -d could not be run");
                None
            }
        }
    }
}

impl PrintSpooler for CupsSpooler {
    fn backend_name(&self) -> &str {
        "CUPS"
    }

    fn list_printers(&self) -> Result<Vec<PrinterDescriptor>> {
        let output = Self::run(&self.lpstat_program, &["-p".into()]).map_err(|e| {
            SpoolgateError::PrinterEnumeration(format!("{}: {e}", self.lpstat_program))
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            if stderr.contains(NO_DESTINATIONS) {
                debug!("CUPS has no destinations configured");
                return Ok(Vec::new());
            }
            return Err(SpoolgateError::PrinterEnumeration(format!(
                "{} -p exited with {}: {}",
                self.lpstat_program,
                output.status,
                stderr.trim()
            )));
        }

        let default = self.default_destination();
        let printers = parse_printer_lines(&stdout, default.as_deref());
        debug!(count = printers.len(), "enumerated CUPS printers");
        Ok(printers)
    }

    fn print(
        &self,
        document: &Path,
        config: &PrintJobConfig,
        title: &str,
    ) -> Result<SpoolReceipt> {
        let args = Self::lp_args(document, config, title);
        let output = Self::run(&self.lp_program, &args)
            .map_err(|e| SpoolgateError::Dispatch(format!("{}: {e}", self.lp_program)))?;

        if !output.status.success() {
            return Err(SpoolgateError::Dispatch(format!(
                "{} exited with {}: {}",
                self.lp_program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let spool_id = parse_request_id(&String::from_utf8_lossy(&output.stdout));
        info!(
            printer = %config.printer_id,
            spool_id = ?spool_id,
            "document accepted by CUPS"
        );

        Ok(SpoolReceipt {
            spool_id,
            completed: false,
        })
    }
}

/// Parse `lpstat -p` output into printer descriptors.
///
/// Lines look like `printer HP-LaserJet is idle.  enabled since ...` or
/// `printer Office disabled since ...`; continuation lines (indented) are
/// ignored.
pub fn parse_printer_lines(stdout: &str, default: Option<&str>) -> Vec<PrinterDescriptor> {
    stdout
        .lines()
        .filter_map(|line| line.strip_prefix("printer "))
        .filter_map(|rest| {
            let mut parts = rest.splitn(2, char::is_whitespace);
            let name = parts.next()?.trim();
            if name.is_empty() {
                return None;
            }
            let description = parts
                .next()
                .map(|tail| {
                    let tail = tail.trim_start();
                    let tail = tail.strip_prefix("is ").unwrap_or(tail);
                    tail.split('.').next().unwrap_or(tail).trim().to_string()
                })
                .filter(|d| !d.is_empty());
            Some(PrinterDescriptor {
                name: name.to_string(),
                description,
                is_default: default == Some(name),
            })
        })
        .collect()
}

/// Parse `lpstat -d` output (`system default destination: NAME`).
pub fn parse_default_destination(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .find_map(|line| line.split_once("system default destination:"))
        .map(|(_, name)| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Parse the job id from `lp` output (`request id is NAME-42 (1 file(s))`).
pub fn parse_request_id(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .find_map(|line| line.trim().strip_prefix("request id is "))
        .and_then(|rest| rest.split_whitespace().next())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spoolgate_core::types::{Orientation, ScaleMode};

    fn config() -> PrintJobConfig {
        PrintJobConfig {
            printer_id: "HP-LaserJet".into(),
            orientation: Orientation::Landscape,
            paper_size: "A4".into(),
            scale: ScaleMode::NoScale,
        }
    }

    #[test]
    fn parses_printer_states() {
        let out = "printer HP-LaserJet is idle.  enabled since Mon 01 Jan 2026\n\
                   printer Office now printing Office-7.  enabled since Tue\n\
                   \tWaiting for job to complete.\n\
                   printer Basement disabled since Wed -\n\
                   \treason unknown\n";
        let printers = parse_printer_lines(out, Some("Office"));
        assert_eq!(printers.len(), 3);
        assert_eq!(printers[0].name, "HP-LaserJet");
        assert_eq!(printers[0].description.as_deref(), Some("idle"));
        assert!(!printers[0].is_default);
        assert_eq!(printers[1].description.as_deref(), Some("now printing Office-7"));
        assert!(printers[1].is_default);
        assert_eq!(printers[2].name, "Basement");
        assert_eq!(printers[2].description.as_deref(), Some("disabled since Wed -"));
    }

    #[test]
    fn empty_output_has_no_printers() {
        assert!(parse_printer_lines("", None).is_empty());
    }

    #[test]
    fn parses_default_destination() {
        assert_eq!(
            parse_default_destination("system default destination: HP-LaserJet\n").as_deref(),
            Some("HP-LaserJet")
        );
        assert_eq!(parse_default_destination("no system default destination\n"), None);
    }

    #[test]
    fn parses_request_id() {
        assert_eq!(
            parse_request_id("request id is HP-LaserJet-42 (1 file(s))\n").as_deref(),
            Some("HP-LaserJet-42")
        );
        assert_eq!(parse_request_id(""), None);
    }

    #[test]
    fn lp_args_carry_every_option() {
        let args = CupsSpooler::lp_args(Path::new("/tmp/doc.pdf"), &config(), "job-1");
        assert_eq!(
            args,
            vec![
                "-d",
                "HP-LaserJet",
                "-o",
                "media=A4",
                "-o",
                "orientation-requested=4",
                "-o",
                "print-scaling=none",
                "-t",
                "job-1",
                "--",
                "/tmp/doc.pdf",
            ]
        );
    }

    #[test]
    fn failing_lp_is_a_dispatch_error() {
        let spooler = CupsSpooler::new("false", "false");
        let err = spooler
            .print(Path::new("/tmp/doc.pdf"), &config(), "job")
            .unwrap_err();
        assert!(matches!(err, SpoolgateError::Dispatch(_)));
    }

    #[test]
    fn failing_lpstat_is_an_enumeration_error() {
        let spooler = CupsSpooler::new("false", "false");
        let err = spooler.list_printers().unwrap_err();
        assert!(matches!(err, SpoolgateError::PrinterEnumeration(_)));
    }

    #[test]
    fn missing_program_is_a_dispatch_error() {
        let spooler = CupsSpooler::new("/nonexistent/lp", "/nonexistent/lpstat");
        let err = spooler
            .print(Path::new("/tmp/doc.pdf"), &config(), "job")
            .unwrap_err();
        assert!(matches!(err, SpoolgateError::Dispatch(_)));
    }

    #[test]
    fn successful_lp_without_request_id() {
        // `true` accepts any arguments and prints nothing.
        let spooler = CupsSpooler::new("true", "true");
        let receipt = spooler
            .print(Path::new("/tmp/doc.pdf"), &config(), "job")
            .expect("print");
        assert_eq!(receipt, SpoolReceipt::default());
    }
}
