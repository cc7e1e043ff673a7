// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Minimal HTTP/1.1 framing.
//
// A request is read as a head terminated by CRLFCRLF (capped at
// `MAX_HEAD_BYTES`) followed by exactly `Content-Length` body bytes. Chunked
// transfer encoding is not supported. Every response closes the connection.

use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::error;

use spoolgate_core::error::{Result, SpoolgateError};

/// Largest request head (request line plus headers) accepted.
pub const MAX_HEAD_BYTES: usize = 64 * 1024;

/// Read size for each socket read while looking for the end of the head.
const READ_CHUNK: usize = 8 * 1024;

/// Why a request could not be read off the wire.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("malformed request: {0}")]
    Malformed(&'static str),

    #[error("request body of {0} bytes exceeds the limit")]
    TooLarge(usize),

    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A fully read HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    /// Request target as sent, including any query string.
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// The target without its query string or fragment.
    pub fn path(&self) -> &str {
        let end = self
            .target
            .find(['?', '#'])
            .unwrap_or(self.target.len());
        &self.target[..end]
    }

    /// First header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

/// Request line and headers, before the body has been read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub content_length: Option<usize>,
}

impl RequestHead {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Parse a request head (everything before the blank line).
pub fn parse_head(head: &[u8]) -> std::result::Result<RequestHead, ReadError> {
    let text = std::str::from_utf8(head).map_err(|_| ReadError::Malformed("head is not UTF-8"))?;
    let mut lines = text.split("\r\n");

    let request_line = lines.next().ok_or(ReadError::Malformed("empty request"))?;
    let mut parts = request_line.split_ascii_whitespace();
    let (Some(method), Some(target), Some(version), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ReadError::Malformed("bad request line"));
    };
    if !version.starts_with("HTTP/1.") {
        return Err(ReadError::Malformed("unsupported HTTP version"));
    }

    let mut headers = Vec::new();
    for line in lines.filter(|l| !l.is_empty()) {
        let (name, value) = line
            .split_once(':')
            .ok_or(ReadError::Malformed("bad header line"))?;
        headers.push((name.trim().to_string(), value.trim().to_string()));
    }

    let mut head = RequestHead {
        method: method.to_ascii_uppercase(),
        target: target.to_string(),
        headers,
        content_length: None,
    };

    if head.header("transfer-encoding").is_some() {
        return Err(ReadError::Malformed("transfer encodings are not supported"));
    }
    head.content_length = head
        .header("content-length")
        .map(|v| v.parse::<usize>())
        .transpose()
        .map_err(|_| ReadError::Malformed("invalid Content-Length"))?;

    Ok(head)
}

/// Find the first occurrence of `needle` in `haystack`.
pub fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Read one request from `stream`.
///
/// Returns `Ok(None)` when the peer closes the connection without sending
/// anything. Bodies larger than `max_body` are rejected from the declared
/// length alone, before any body bytes are read.
pub async fn read_request<S>(
    stream: &mut S,
    max_body: usize,
) -> std::result::Result<Option<HttpRequest>, ReadError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    let header_end = loop {
        if let Some(pos) = find_subsequence(&buf, b"\r\n\r\n") {
            break pos;
        }
        if buf.len() > MAX_HEAD_BYTES {
            return Err(ReadError::Malformed("request head too large"));
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            if buf.is_empty() {
                return Ok(None);
            }
            return Err(ReadError::Malformed("connection closed inside request head"));
        }
        buf.extend_from_slice(&chunk[..n]);
    };
    if header_end > MAX_HEAD_BYTES {
        return Err(ReadError::Malformed("request head too large"));
    }

    let head = parse_head(&buf[..header_end])?;
    let length = head.content_length.unwrap_or(0);
    if length > max_body {
        return Err(ReadError::TooLarge(length));
    }

    let mut body = buf.split_off(header_end + 4);
    if body.len() >= length {
        body.truncate(length);
    } else {
        if head
            .header("expect")
            .is_some_and(|v| v.eq_ignore_ascii_case("100-continue"))
        {
            stream.write_all(b"HTTP/1.1 100 Continue\r\n\r\n").await?;
            stream.flush().await?;
        }
        let have = body.len();
        body.resize(length, 0);
        stream.read_exact(&mut body[have..]).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                ReadError::Malformed("body shorter than Content-Length")
            } else {
                ReadError::Io(e)
            }
        })?;
    }

    Ok(Some(HttpRequest {
        method: head.method,
        target: head.target,
        headers: head.headers,
        body,
    }))
}

/// A JSON response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Serialise `value` as the response body.
    pub fn json<T: Serialize + ?Sized>(status: u16, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self { status, body },
            Err(e) => {
                error!(error = %e, "failed to serialise response body");
                Self {
                    status: 500,
                    body: br#"{"error":"Internal server error"}"#.to_vec(),
                }
            }
        }
    }

    /// Status line, headers, and body as sent on the wire.
    pub fn to_bytes(&self) -> Vec<u8> {
        let head = format!(
            "HTTP/1.1 {} {}\r\n\
             Content-Type: application/json; charset=utf-8\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\
             \r\n",
            self.status,
            reason_phrase(self.status),
            self.body.len()
        );
        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Write `response` and flush.
pub async fn write_response<W>(stream: &mut W, response: &HttpResponse) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    stream
        .write_all(&response.to_bytes())
        .await
        .map_err(|e| SpoolgateError::Server(format!("write response: {e}")))?;
    stream
        .flush()
        .await
        .map_err(|e| SpoolgateError::Server(format!("flush: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    async fn read_from(raw: &[u8], max_body: usize) -> std::result::Result<Option<HttpRequest>, ReadError> {
        let (mut client, mut server) = duplex(1 << 20);
        client.write_all(raw).await.expect("write");
        drop(client);
        read_request(&mut server, max_body).await
    }

    #[test]
    fn parse_head_extracts_fields() {
        let head = parse_head(
            b"POST /api/print?x=1 HTTP/1.1\r\nHost: localhost\r\nContent-Length: 12\r\nContent-Type: application/json",
        )
        .expect("parse");
        assert_eq!(head.method, "POST");
        assert_eq!(head.target, "/api/print?x=1");
        assert_eq!(head.content_length, Some(12));
        assert_eq!(head.headers.len(), 3);
    }

    #[test]
    fn parse_head_rejects_garbage() {
        assert!(parse_head(b"hello").is_err());
        assert!(parse_head(b"GET / SPDY/3").is_err());
        assert!(parse_head(b"GET / HTTP/1.1\r\nno-colon-here").is_err());
        assert!(parse_head(b"POST / HTTP/1.1\r\nContent-Length: lots").is_err());
        assert!(parse_head(b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked").is_err());
    }

    #[test]
    fn find_subsequence_works() {
        assert_eq!(find_subsequence(b"abc\r\n\r\nbody", b"\r\n\r\n"), Some(3));
        assert_eq!(find_subsequence(b"no terminator", b"\r\n\r\n"), None);
    }

    #[test]
    fn path_strips_query() {
        let req = HttpRequest {
            method: "GET".into(),
            target: "/api/printers?verbose=1".into(),
            headers: vec![("Content-Type".into(), "text/plain".into())],
            body: Vec::new(),
        };
        assert_eq!(req.path(), "/api/printers");
        assert_eq!(req.content_type(), Some("text/plain"));
        assert_eq!(req.header("CONTENT-TYPE"), Some("text/plain"));
    }

    #[tokio::test]
    async fn reads_body_by_content_length() {
        let req = read_from(
            b"POST /api/print HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello trailing",
            1024,
        )
        .await
        .expect("read")
        .expect("request");
        assert_eq!(req.body, b"hello");
    }

    #[tokio::test]
    async fn get_without_length_has_empty_body() {
        let req = read_from(b"GET /health HTTP/1.1\r\nHost: x\r\n\r\n", 1024)
            .await
            .expect("read")
            .expect("request");
        assert_eq!(req.method, "GET");
        assert!(req.body.is_empty());
    }

    #[tokio::test]
    async fn oversized_body_is_rejected_before_reading() {
        let err = read_from(b"POST / HTTP/1.1\r\nContent-Length: 2048\r\n\r\n", 1024)
            .await
            .unwrap_err();
        assert!(matches!(err, ReadError::TooLarge(2048)));
    }

    #[tokio::test]
    async fn truncated_body_is_malformed() {
        let err = read_from(b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc", 1024)
            .await
            .unwrap_err();
        assert!(matches!(err, ReadError::Malformed(_)));
    }

    #[tokio::test]
    async fn expect_continue_gets_interim_response() {
        let (mut client, mut server) = duplex(1 << 16);
        client
            .write_all(b"POST /api/print HTTP/1.1\r\nExpect: 100-continue\r\nContent-Length: 5\r\n\r\n")
            .await
            .expect("write head");
        let reader = tokio::spawn(async move { read_request(&mut server, 1024).await });

        let mut interim = [0u8; 25];
        client.read_exact(&mut interim).await.expect("interim");
        assert_eq!(&interim, b"HTTP/1.1 100 Continue\r\n\r\n");

        client.write_all(b"hello").await.expect("write body");
        let req = reader
            .await
            .expect("join")
            .expect("read")
            .expect("request");
        assert_eq!(req.body, b"hello");
    }

    #[tokio::test]
    async fn empty_connection_yields_none() {
        assert!(read_from(b"", 1024).await.expect("read").is_none());
    }

    #[tokio::test]
    async fn oversized_head_is_rejected() {
        let mut raw = b"GET / HTTP/1.1\r\nX-Filler: ".to_vec();
        raw.extend(std::iter::repeat_n(b'a', MAX_HEAD_BYTES + 10));
        let err = read_from(&raw, 1024).await.unwrap_err();
        assert!(matches!(err, ReadError::Malformed(_)));
    }

    #[test]
    fn response_bytes_have_framing() {
        let resp = HttpResponse::json(404, &serde_json::json!({"error": "Endpoint not found"}));
        let text = String::from_utf8(resp.to_bytes()).expect("utf8");
        assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(text.contains(&format!("Content-Length: {}\r\n", resp.body.len())));
        assert!(text.contains("Connection: close\r\n"));
        assert!(text.ends_with(r#"{"error":"Endpoint not found"}"#));
    }
}
