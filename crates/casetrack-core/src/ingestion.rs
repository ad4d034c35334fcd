use std::fs;
use std::path::Path;

use blake3::Hasher;
use casetrack_import::{normalize, validate_file, ImportBatch, ImportError, ParseOptions};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::repository::CaseRepository;

#[derive(Debug, Clone, Copy)]
pub struct FileUpload<'a> {
    pub file_name: &'a str,
    pub contents: &'a [u8],
}

/// An upload read from disk.
#[derive(Debug, Clone)]
pub struct LoadedUpload {
    pub file_name: String,
    pub contents: Vec<u8>,
}

impl LoadedUpload {
    pub fn as_upload(&self) -> FileUpload<'_> {
        FileUpload {
            file_name: &self.file_name,
            contents: &self.contents,
        }
    }
}

/// Checks the file name and on-disk size before reading, so an oversized
/// file is rejected without being loaded.
pub fn read_upload(path: &Path) -> Result<LoadedUpload> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ImportError::UnsupportedExtension {
            file_name: path.display().to_string(),
        })?
        .to_string();
    let size = fs::metadata(path)?.len();
    validate_file(&file_name, size)?;

    let contents = fs::read(path)?;
    Ok(LoadedUpload {
        file_name,
        contents,
    })
}

#[derive(Debug)]
pub struct PreparedImport {
    pub file_name: String,
    pub file_hash: String,
    pub batch: ImportBatch,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub file_name: String,
    pub file_hash: String,
    pub inserted: usize,
    pub skipped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl ImportReport {
    fn new(prepared: &PreparedImport, inserted: usize) -> Self {
        let skipped = prepared.batch.skipped;
        Self {
            file_name: prepared.file_name.clone(),
            file_hash: prepared.file_hash.clone(),
            inserted,
            skipped,
            warning: skipped_warning(skipped),
        }
    }
}

pub fn skipped_warning(skipped: usize) -> Option<String> {
    match skipped {
        0 => None,
        1 => Some("1 row skipped due to missing required fields".to_string()),
        n => Some(format!("{n} rows skipped due to missing required fields")),
    }
}

/// Hashes and normalizes an upload without touching storage.
pub fn prepare_import(
    upload: FileUpload<'_>,
    options: &ParseOptions,
) -> std::result::Result<PreparedImport, ImportError> {
    let file_hash = compute_hash(upload.contents);
    match normalize(upload.file_name, upload.contents, options) {
        Ok(batch) => {
            if batch.skipped > 0 {
                warn!(
                    file_name = upload.file_name,
                    skipped = batch.skipped,
                    "rows skipped due to missing parties or forum"
                );
            }
            Ok(PreparedImport {
                file_name: upload.file_name.to_string(),
                file_hash,
                batch,
            })
        }
        Err(err) => {
            warn!(
                file_name = upload.file_name,
                file_hash = %file_hash,
                error = %err,
                "rejected case import"
            );
            Err(err)
        }
    }
}

/// Normalizes an upload and hands the valid records to `repository` on
/// behalf of `owner_id`.
pub async fn run_import(
    upload: FileUpload<'_>,
    owner_id: Uuid,
    repository: &dyn CaseRepository,
    options: &ParseOptions,
) -> Result<ImportReport> {
    let prepared = prepare_import(upload, options)?;
    let stored = repository
        .bulk_insert(owner_id, &prepared.batch.records)
        .await?;

    let report = ImportReport::new(&prepared, stored.len());
    info!(
        file_name = %report.file_name,
        file_hash = %report.file_hash,
        owner = %owner_id,
        inserted = report.inserted,
        skipped = report.skipped,
        "imported litigation cases"
    );
    Ok(report)
}

pub fn compute_hash(contents: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(contents);
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_wording() {
        assert_eq!(skipped_warning(0), None);
        assert_eq!(
            skipped_warning(1).as_deref(),
            Some("1 row skipped due to missing required fields")
        );
        assert_eq!(
            skipped_warning(3).as_deref(),
            Some("3 rows skipped due to missing required fields")
        );
    }

    #[test]
    fn hash_is_stable_hex() {
        let hash = compute_hash(b"Parties,Forum\n");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, compute_hash(b"Parties,Forum\n"));
        assert_ne!(hash, compute_hash(b"Parties,Forum\r\n"));
    }
}
