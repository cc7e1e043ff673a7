// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Request routing and response bodies.
//
// Handlers translate between HTTP and `PrintService`. Internal error detail
// is logged here and replaced by the fixed text from `public_error`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use spoolgate_core::error::SpoolgateError;
use spoolgate_core::public_errors::{Blame, INTERNAL_ERROR, public_error};
use spoolgate_print::{DocumentPayload, PrintService, RequestFields, Submission};

use crate::form;
use crate::http::{HttpRequest, HttpResponse};
use crate::multipart::{self, Part};

/// Routes served, for the start-up banner.
pub const ROUTES: &[&str] = &[
    "GET  /health",
    "GET  /api/printers",
    "POST /api/print",
    "GET  /api/print-status/:jobId",
];

const STATUS_PREFIX: &str = "/api/print-status/";

/// Form field names that may carry the uploaded document.
const DOCUMENT_FIELDS: &[&str] = &["document", "file"];

/// Dispatch `request` to its handler.
pub async fn route(request: &HttpRequest, service: &PrintService) -> HttpResponse {
    match (request.method.as_str(), request.path()) {
        ("GET", "/health") => health(),
        ("GET", "/api/printers") => list_printers(service).await,
        ("POST", "/api/print") => submit_print(request, service).await,
        ("GET", path) if path.starts_with(STATUS_PREFIX) => {
            let job_id = &path[STATUS_PREFIX.len()..];
            if job_id.is_empty() || job_id.contains('/') {
                not_found(request)
            } else {
                print_status(job_id, service)
            }
        }
        _ => not_found(request),
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn health() -> HttpResponse {
    HttpResponse::json(
        200,
        &json!({
            "status": "OK",
            "message": "Printer Driver API is running",
            "timestamp": timestamp(Utc::now()),
        }),
    )
}

async fn list_printers(service: &PrintService) -> HttpResponse {
    match service.list_printers().await {
        Ok(printers) => HttpResponse::json(
            200,
            &json!({
                "message": "List of available printers",
                "printers": printers,
            }),
        ),
        Err(e) => error_response(&e),
    }
}

/// JSON body of `POST /api/print`.
#[derive(Debug, Default, Deserialize)]
struct PrintRequestBody {
    document: Option<String>,
    #[serde(flatten)]
    fields: RequestFields,
}

async fn submit_print(request: &HttpRequest, service: &PrintService) -> HttpResponse {
    let submission = match parse_submission(request) {
        Ok(submission) => submission,
        Err(response) => return response,
    };

    match service.submit(submission).await {
        Ok(outcome) if outcome.is_success() => HttpResponse::json(
            200,
            &json!({
                "message": "Print job submitted successfully",
                "timestamp": timestamp(Utc::now()),
                "jobId": outcome.job_id,
                "status": outcome.status,
            }),
        ),
        Ok(outcome) => {
            error!(
                job_id = %outcome.job_id,
                diagnostic = outcome.diagnostic.as_deref().unwrap_or_default(),
                "error submitting print job"
            );
            HttpResponse::json(
                500,
                &json!({
                    "error": INTERNAL_ERROR,
                    "message": "Failed to submit print job",
                    "jobId": outcome.job_id,
                }),
            )
        }
        Err(e) => error_response(&e),
    }
}

/// Build a `Submission` from a JSON, multipart, or URL-encoded form body.
fn parse_submission(request: &HttpRequest) -> Result<Submission, HttpResponse> {
    let content_type = request.content_type().unwrap_or_default();

    if multipart::is_multipart(content_type) {
        let parts = multipart::boundary(content_type)
            .ok_or(multipart::MultipartError::MissingBoundary)
            .and_then(|b| multipart::parse(&request.body, &b))
            .map_err(|e| {
                warn!(error = %e, "rejected multipart body");
                HttpResponse::json(400, &json!({ "error": "Invalid multipart body" }))
            })?;
        return Ok(submission_from_parts(parts));
    }

    if form::is_form_urlencoded(content_type) {
        let pairs = form::parse(&request.body).map_err(|e| {
            warn!(error = %e, "rejected form body");
            HttpResponse::json(
                400,
                &json!({ "error": "Bad request", "message": "Request body is not a valid form" }),
            )
        })?;
        return Ok(submission_from_pairs(pairs));
    }

    if request.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Submission::default());
    }

    let body: PrintRequestBody = serde_json::from_slice(&request.body).map_err(|e| {
        warn!(error = %e, "rejected JSON body");
        HttpResponse::json(
            400,
            &json!({ "error": "Bad request", "message": "Request body is not valid JSON" }),
        )
    })?;

    Ok(Submission {
        document: body.document.map(DocumentPayload::Inline),
        fields: body.fields,
    })
}

fn submission_from_parts(parts: Vec<Part>) -> Submission {
    let mut submission = Submission::default();

    for part in parts {
        let name = part.name.as_deref().unwrap_or_default();
        let is_document = DOCUMENT_FIELDS.contains(&name) || part.filename.is_some();

        if is_document {
            if submission.document.is_none() {
                submission.document = Some(DocumentPayload::Upload(part.data));
            }
            continue;
        }

        set_field(&mut submission.fields, name, part.text().map(str::to_string));
    }
    submission
}

fn submission_from_pairs(pairs: Vec<(String, String)>) -> Submission {
    let mut submission = Submission::default();

    for (name, value) in pairs {
        if name == "document" {
            if submission.document.is_none() {
                submission.document = Some(DocumentPayload::Inline(value));
            }
            continue;
        }
        set_field(&mut submission.fields, &name, Some(value));
    }
    submission
}

fn set_field(fields: &mut RequestFields, name: &str, value: Option<String>) {
    match name {
        "printerId" => fields.printer_id = value,
        "paperSize" => fields.paper_size = value,
        "orientation" => fields.orientation = value,
        _ => {}
    }
}

fn print_status(raw_id: &str, service: &PrintService) -> HttpResponse {
    match service.job_status(raw_id) {
        Ok(job) => HttpResponse::json(
            200,
            &json!({
                "jobId": job.id,
                "status": job.status,
                "progress": job.status.progress(),
                "message": job.status.describe(),
                "timestamp": timestamp(job.updated_at),
            }),
        ),
        Err(SpoolgateError::JobNotFound(_)) => {
            HttpResponse::json(404, &json!({ "error": "Job not found", "jobId": raw_id }))
        }
        Err(e) => error_response(&e),
    }
}

fn not_found(request: &HttpRequest) -> HttpResponse {
    HttpResponse::json(
        404,
        &json!({ "error": "Endpoint not found", "path": request.target }),
    )
}

/// Map a pipeline error to its public response, logging the detail.
pub fn error_response(err: &SpoolgateError) -> HttpResponse {
    let public = public_error(err);
    match public.blame() {
        Blame::Caller => warn!(error = %err, status = public.status, "request rejected"),
        Blame::Gateway => error!(error = %err, status = public.status, "request failed"),
    }
    HttpResponse::json(public.status, &public)
}
