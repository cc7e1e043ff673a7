// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spoolgate server: a small HTTP/1.1 front end for the print pipeline.
//
// One request per connection, bodies framed by Content-Length, JSON
// responses only. Print requests arrive as JSON, multipart uploads, or
// URL-encoded forms.

pub mod form;
pub mod http;
pub mod multipart;
pub mod routes;
pub mod server;

pub use server::HttpServer;
