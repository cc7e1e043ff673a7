// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `application/x-www-form-urlencoded` bodies.
//
// `+` decodes to a space, so a base64 document sent this way must carry its
// own `+` characters as `%2B`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("invalid percent escape")]
    BadEscape,

    #[error("form value is not UTF-8")]
    NotUtf8,
}

/// True when `content_type` names a URL-encoded form.
pub fn is_form_urlencoded(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| {
            mime.trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
}

/// Split a form body into decoded `(name, value)` pairs, in order.
///
/// Empty segments (`a=1&&b=2`) are skipped and a segment without `=` is a
/// name with an empty value.
pub fn parse(body: &[u8]) -> Result<Vec<(String, String)>, FormError> {
    body.split(|&b| b == b'&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let (name, value) = match segment.iter().position(|&b| b == b'=') {
                Some(eq) => (&segment[..eq], &segment[eq + 1..]),
                None => (segment, &[][..]),
            };
            Ok((decode(name)?, decode(value)?))
        })
        .collect()
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

fn decode(raw: &[u8]) -> Result<String, FormError> {
    let mut out = Vec::with_capacity(raw.len());
    let mut bytes = raw.iter().copied();
    while let Some(byte) = bytes.next() {
        match byte {
            b'+' => out.push(b' '),
            b'%' => {
                let hi = bytes.next().and_then(hex_value).ok_or(FormError::BadEscape)?;
                let lo = bytes.next().and_then(hex_value).ok_or(FormError::BadEscape)?;
                out.push(hi << 4 | lo);
            }
            other => out.push(other),
        }
    }
    String::from_utf8(out).map_err(|_| FormError::NotUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_detection() {
        assert!(is_form_urlencoded("application/x-www-form-urlencoded"));
        assert!(is_form_urlencoded("Application/X-WWW-Form-Urlencoded; charset=UTF-8"));
        assert!(!is_form_urlencoded("application/json"));
    }

    #[test]
    fn pairs_are_decoded() {
        let pairs = parse(b"document=JVBERi0x%2B%2F%3D&printerId=HP+LaserJet&&paperSize=A4&flag")
            .expect("parse");
        assert_eq!(
            pairs,
            vec![
                ("document".to_string(), "JVBERi0x+/=".to_string()),
                ("printerId".to_string(), "HP LaserJet".to_string()),
                ("paperSize".to_string(), "A4".to_string()),
                ("flag".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn bad_escapes_are_rejected() {
        assert_eq!(parse(b"document=%4"), Err(FormError::BadEscape));
        assert_eq!(parse(b"document=%zz"), Err(FormError::BadEscape));
        assert_eq!(parse(b"document=%ff"), Err(FormError::NotUtf8));
    }

    #[test]
    fn empty_body_has_no_pairs() {
        assert!(parse(b"").expect("parse").is_empty());
    }
}
