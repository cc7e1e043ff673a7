// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `multipart/form-data` parsing (RFC 7578) for document uploads.
//
// The whole body is already in memory, so parts borrow nothing and are
// copied out. Only the headers needed to find a part's name and filename are
// interpreted.

use thiserror::Error;

use crate::http::find_subsequence;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MultipartError {
    #[error("content type has no multipart boundary")]
    MissingBoundary,

    #[error("malformed multipart body: {0}")]
    Malformed(&'static str),
}

/// One part of a form submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Part {
    pub name: Option<String>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl Part {
    /// The part's data as text, if it is valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}

/// True when `content_type` names a multipart form.
pub fn is_multipart(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("multipart/form-data"))
}

/// Extract the `boundary` parameter from a `Content-Type` value.
pub fn boundary(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|b| !b.is_empty())
}

/// Split `body` into its parts.
pub fn parse(body: &[u8], boundary: &str) -> Result<Vec<Part>, MultipartError> {
    if boundary.is_empty() {
        return Err(MultipartError::MissingBoundary);
    }
    let delimiter = format!("--{boundary}").into_bytes();
    let next_delimiter = format!("\r\n--{boundary}").into_bytes();

    let start = find_subsequence(body, &delimiter)
        .ok_or(MultipartError::Malformed("opening boundary not found"))?;
    let mut cursor = start + delimiter.len();
    let mut parts = Vec::new();

    loop {
        let rest = &body[cursor..];
        if rest.starts_with(b"--") {
            return Ok(parts);
        }
        let rest = rest
            .strip_prefix(b"\r\n")
            .ok_or(MultipartError::Malformed("boundary not followed by CRLF"))?;
        let part_start = body.len() - rest.len();

        let header_end = find_subsequence(rest, b"\r\n\r\n")
            .ok_or(MultipartError::Malformed("part headers not terminated"))?;
        let mut part = parse_part_headers(&rest[..header_end])?;

        let data_start = part_start + header_end + 4;
        let data_len = find_subsequence(&body[data_start..], &next_delimiter)
            .ok_or(MultipartError::Malformed("closing boundary not found"))?;
        part.data = body[data_start..data_start + data_len].to_vec();
        parts.push(part);

        cursor = data_start + data_len + next_delimiter.len();
    }
}

fn parse_part_headers(raw: &[u8]) -> Result<Part, MultipartError> {
    let text = std::str::from_utf8(raw)
        .map_err(|_| MultipartError::Malformed("part headers are not UTF-8"))?;
    let mut part = Part::default();

    for line in text.split("\r\n").filter(|l| !l.is_empty()) {
        let (name, value) = line
            .split_once(':')
            .ok_or(MultipartError::Malformed("bad part header"))?;
        let name = name.trim();
        if name.eq_ignore_ascii_case("content-disposition") {
            for param in value.split(';').skip(1) {
                let Some((key, val)) = param.split_once('=') else {
                    continue;
                };
                let val = val.trim().trim_matches('"').to_string();
                match key.trim().to_ascii_lowercase().as_str() {
                    "name" => part.name = Some(val),
                    "filename" => part.filename = Some(val),
                    _ => {}
                }
            }
        } else if name.eq_ignore_ascii_case("content-type") {
            part.content_type = Some(value.trim().to_string());
        }
    }
    Ok(part)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(boundary: &str, parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, filename, data) in parts {
            body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
            match filename {
                Some(f) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\nContent-Type: application/pdf\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
        body
    }

    #[test]
    fn boundary_is_extracted() {
        assert_eq!(
            boundary("multipart/form-data; boundary=----abc123").as_deref(),
            Some("----abc123")
        );
        assert_eq!(
            boundary("multipart/form-data; charset=utf-8; boundary=\"q w\"").as_deref(),
            Some("q w")
        );
        assert_eq!(boundary("multipart/form-data"), None);
        assert!(is_multipart("Multipart/Form-Data; boundary=x"));
        assert!(!is_multipart("application/json"));
    }

    #[test]
    fn parses_file_and_text_parts() {
        let body = form(
            "XyZ",
            &[
                ("document", Some("report.pdf"), b"%PDF-1.4 binary\r\n\x00\xff"),
                ("printerId", None, b"HP-LaserJet"),
                ("paperSize", None, b"A4"),
            ],
        );
        let parts = parse(&body, "XyZ").expect("parse");
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].name.as_deref(), Some("document"));
        assert_eq!(parts[0].filename.as_deref(), Some("report.pdf"));
        assert_eq!(parts[0].content_type.as_deref(), Some("application/pdf"));
        assert_eq!(parts[0].data, b"%PDF-1.4 binary\r\n\x00\xff");
        assert_eq!(parts[1].text(), Some("HP-LaserJet"));
        assert_eq!(parts[2].text(), Some("A4"));
    }

    #[test]
    fn empty_form_has_no_parts() {
        assert!(parse(b"--b--\r\n", "b").expect("parse").is_empty());
    }

    #[test]
    fn malformed_bodies_are_rejected() {
        assert!(parse(b"no boundary here", "b").is_err());
        assert!(parse(b"--b\r\nContent-Disposition: form-data; name=\"x\"\r\n\r\nunterminated", "b").is_err());
        assert!(parse(b"--bgarbage", "b").is_err());
        assert_eq!(parse(b"--b--", ""), Err(MultipartError::MissingBoundary));
    }
}
