// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Temporary document storage.
//
// Each submission's bytes are written to their own file inside the upload
// directory so the spooler can read them by path. File names combine a
// nanosecond timestamp with a random UUID and are created with `create_new`,
// so two submissions can never share or overwrite a file. A stored document
// must be released once dispatch has finished, whatever the outcome.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use chrono::Utc;
use sha2::{Digest, Sha256};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use spoolgate_core::error::{Result, SpoolgateError};
use spoolgate_core::types::DocumentType;

/// How many fresh names to try before giving up on `AlreadyExists`.
const MAX_NAME_ATTEMPTS: usize = 3;

/// Standard alphabet, padding optional.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Compute the SHA-256 hash of `data` as a lowercase hex string.
pub fn fingerprint(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Decode an inline base64 document.
///
/// Whitespace (including MIME line breaks) and a leading `data:...;base64,`
/// prefix are tolerated. Padding is optional and the URL-safe characters
/// `-` and `_` are read as `+` and `/`.
pub fn decode_inline(encoded: &str) -> Result<Vec<u8>> {
    let trimmed = encoded.trim();
    let payload = match trimmed.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => trimmed,
    };
    let compact: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    LENIENT_BASE64
        .decode(compact.as_bytes())
        .map_err(|e| SpoolgateError::InvalidDocument(format!("base64 decode: {e}")))
}

/// Check that the bytes are a document type the gateway can print.
pub fn inspect(bytes: &[u8]) -> Result<DocumentType> {
    if bytes.is_empty() {
        return Err(SpoolgateError::InvalidDocument("empty document".into()));
    }
    DocumentType::sniff(bytes)
        .ok_or_else(|| SpoolgateError::InvalidDocument("unsupported document type".into()))
}

/// A document written to the upload directory.
///
/// Dropping an unreleased handle removes the file as a last resort; the
/// normal path is [`DocumentStore::release`].
#[derive(Debug)]
pub struct StoredDocument {
    path: PathBuf,
    document_type: DocumentType,
    sha256: String,
    len: usize,
    released: AtomicBool,
}

impl StoredDocument {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    /// SHA-256 of the stored bytes.
    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

impl Drop for StoredDocument {
    fn drop(&mut self) {
        if self.is_released() {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => warn!(path = %self.path.display(), "unreleased document removed on drop"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove document on drop"),
        }
    }
}

/// Owner of the upload directory.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    dir: PathBuf,
}

impl DocumentStore {
    /// Open the store, creating the directory if it does not exist.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await.map_err(|e| {
            SpoolgateError::Storage(format!("create {}: {e}", dir.display()))
        })?;
        debug!(dir = %dir.display(), "document store opened");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// A fresh file name: nanosecond timestamp plus a random suffix.
    fn unique_name(document_type: DocumentType) -> String {
        let nanos = Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_else(|| Utc::now().timestamp_micros().saturating_mul(1000));
        format!(
            "{nanos}-{}.{}",
            Uuid::new_v4().simple(),
            document_type.extension()
        )
    }

    /// Persist `bytes` under a unique name.
    ///
    /// Fails with `InvalidDocument` for anything that is not a printable
    /// document, or `Storage` when the file cannot be written. A partially
    /// written file is removed before returning the error.
    #[instrument(skip_all, fields(len = bytes.len()))]
    pub async fn store(&self, bytes: &[u8]) -> Result<StoredDocument> {
        let document_type = inspect(bytes)?;

        for _ in 0..MAX_NAME_ATTEMPTS {
            let path = self.dir.join(Self::unique_name(document_type));

            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => file,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    warn!(path = %path.display(), "document name collision, retrying");
                    continue;
                }
                Err(e) => {
                    return Err(SpoolgateError::Storage(format!(
                        "create {}: {e}",
                        path.display()
                    )));
                }
            };

            let written = async {
                file.write_all(bytes).await?;
                file.flush().await
            }
            .await;

            if let Err(e) = written {
                drop(file);
                if let Err(rm) = fs::remove_file(&path).await {
                    warn!(path = %path.display(), error = %rm, "failed to remove partial document");
                }
                return Err(SpoolgateError::Storage(format!(
                    "write {}: {e}",
                    path.display()
                )));
            }

            let stored = StoredDocument {
                sha256: fingerprint(bytes),
                path,
                document_type,
                len: bytes.len(),
                released: AtomicBool::new(false),
            };
            debug!(path = %stored.path.display(), sha256 = %stored.sha256, "document stored");
            return Ok(stored);
        }

        Err(SpoolgateError::Storage(format!(
            "no unique document name after {MAX_NAME_ATTEMPTS} attempts"
        )))
    }

    /// Delete the document's backing file.
    ///
    /// Idempotent: releasing an already released (or never written) document
    /// succeeds.
    #[instrument(skip_all, fields(path = %document.path.display()))]
    pub async fn release(&self, document: &StoredDocument) -> Result<()> {
        if document.is_released() {
            return Ok(());
        }
        match fs::remove_file(&document.path).await {
            Ok(()) => debug!("document released"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("document already gone");
            }
            Err(e) => {
                return Err(SpoolgateError::Storage(format!(
                    "remove {}: {e}",
                    document.path.display()
                )));
            }
        }
        document.released.store(true, Ordering::Release);
        Ok(())
    }
}
