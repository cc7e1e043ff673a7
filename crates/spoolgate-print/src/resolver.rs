// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Job configuration resolution.
//
// Per-request fields win over the process defaults when they are present and
// non-blank. Printer id and paper size have no safe fallback and must be
// present after merging; orientation falls back to portrait.

use serde::Deserialize;

use spoolgate_core::config::PrinterDefaults;
use spoolgate_core::error::{Result, SpoolgateError};
use spoolgate_core::types::{ConfigField, Orientation, PrintJobConfig, ScaleMode};

/// Printer options supplied with a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFields {
    pub printer_id: Option<String>,
    pub paper_size: Option<String>,
    pub orientation: Option<String>,
}

fn pick<'a>(request: Option<&'a str>, default: Option<&'a str>) -> Option<&'a str> {
    let non_blank = |v: &&str| !v.trim().is_empty();
    request
        .filter(non_blank)
        .or_else(|| default.filter(non_blank))
        .map(str::trim)
}

/// Merge request fields with the process defaults.
///
/// Fails with `ConfigValidation` naming the first missing field, printer id
/// before paper size. Nothing is partially applied.
pub fn resolve(fields: &RequestFields, defaults: &PrinterDefaults) -> Result<PrintJobConfig> {
    let printer_id = pick(fields.printer_id.as_deref(), defaults.printer_id.as_deref())
        .ok_or(SpoolgateError::ConfigValidation {
            field: ConfigField::PrinterId,
        })?;

    let paper_size = pick(fields.paper_size.as_deref(), defaults.paper_size.as_deref())
        .ok_or(SpoolgateError::ConfigValidation {
            field: ConfigField::PaperSize,
        })?;

    let orientation = Orientation::parse_lenient(pick(
        fields.orientation.as_deref(),
        defaults.orientation.as_deref(),
    ));

    Ok(PrintJobConfig {
        printer_id: printer_id.to_string(),
        orientation,
        paper_size: paper_size.to_string(),
        scale: ScaleMode::NoScale,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults(printer: Option<&str>, paper: Option<&str>, orientation: Option<&str>) -> PrinterDefaults {
        PrinterDefaults {
            printer_id: printer.map(Into::into),
            orientation: orientation.map(Into::into),
            paper_size: paper.map(Into::into),
        }
    }

    #[test]
    fn defaults_alone_resolve() {
        let config = resolve(
            &RequestFields::default(),
            &defaults(Some("HP-LaserJet"), Some("A4"), None),
        )
        .expect("resolve");
        assert_eq!(config.printer_id, "HP-LaserJet");
        assert_eq!(config.paper_size, "A4");
        assert_eq!(config.orientation, Orientation::Portrait);
        assert_eq!(config.scale, ScaleMode::NoScale);
    }

    #[test]
    fn request_fields_override_defaults() {
        let fields = RequestFields {
            printer_id: Some("Office".into()),
            paper_size: Some("Letter".into()),
            orientation: Some("landscape".into()),
        };
        let config = resolve(&fields, &defaults(Some("HP-LaserJet"), Some("A4"), Some("portrait")))
            .expect("resolve");
        assert_eq!(config.printer_id, "Office");
        assert_eq!(config.paper_size, "Letter");
        assert_eq!(config.orientation, Orientation::Landscape);
    }

    #[test]
    fn blank_request_field_does_not_override() {
        let fields = RequestFields {
            printer_id: Some("  ".into()),
            ..Default::default()
        };
        let config = resolve(&fields, &defaults(Some("HP-LaserJet"), Some("A4"), None))
            .expect("resolve");
        assert_eq!(config.printer_id, "HP-LaserJet");
    }

    #[test]
    fn missing_printer_is_reported_first() {
        let err = resolve(&RequestFields::default(), &defaults(None, None, None)).unwrap_err();
        assert!(matches!(
            err,
            SpoolgateError::ConfigValidation {
                field: ConfigField::PrinterId
            }
        ));
    }

    #[test]
    fn missing_paper_size_is_rejected() {
        let err = resolve(
            &RequestFields::default(),
            &defaults(Some("HP-LaserJet"), None, Some("landscape")),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SpoolgateError::ConfigValidation {
                field: ConfigField::PaperSize
            }
        ));
    }

    #[test]
    fn unknown_orientation_is_portrait() {
        let config = resolve(
            &RequestFields::default(),
            &defaults(Some("HP-LaserJet"), Some("A4"), Some("diagonal")),
        )
        .expect("resolve");
        assert_eq!(config.orientation, Orientation::Portrait);
    }
}
