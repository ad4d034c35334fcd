use std::fmt;
use std::path::Path;

use crate::errors::ImportError;

pub const CASE_IMPORT_MAX_BYTES: u64 = 5 * 1024 * 1024;
pub const ATTACHMENT_MAX_BYTES: u64 = 500 * 1024 * 1024;
pub const ATTACHMENT_MAX_FILES: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Csv,
    Xlsx,
    Xls,
}

impl FileKind {
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let extension = Path::new(file_name).extension()?.to_str()?;
        match extension.to_ascii_lowercase().as_str() {
            "csv" => Some(FileKind::Csv),
            "xlsx" => Some(FileKind::Xlsx),
            "xls" => Some(FileKind::Xls),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FileKind::Csv => "csv",
            FileKind::Xlsx => "xlsx",
            FileKind::Xls => "xls",
        }
    }

    pub fn is_workbook(&self) -> bool {
        matches!(self, FileKind::Xlsx | FileKind::Xls)
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".{}", self.extension())
    }
}

pub fn validate_file(file_name: &str, size: u64) -> Result<FileKind, ImportError> {
    let kind =
        FileKind::from_file_name(file_name).ok_or_else(|| ImportError::UnsupportedExtension {
            file_name: file_name.to_string(),
        })?;

    if size > CASE_IMPORT_MAX_BYTES {
        return Err(ImportError::FileTooLarge {
            file_name: file_name.to_string(),
            size,
            limit: CASE_IMPORT_MAX_BYTES,
        });
    }

    Ok(kind)
}

/// Checks a set of dispute attachments. Attachments are stored as-is, so only
/// the count and per-file size are limited.
pub fn validate_attachments<'a, I>(files: I) -> Result<(), ImportError>
where
    I: IntoIterator<Item = (&'a str, u64)>,
{
    let files: Vec<_> = files.into_iter().collect();
    if files.len() > ATTACHMENT_MAX_FILES {
        return Err(ImportError::TooManyFiles {
            count: files.len(),
            limit: ATTACHMENT_MAX_FILES,
        });
    }

    for (file_name, size) in files {
        if size > ATTACHMENT_MAX_BYTES {
            return Err(ImportError::FileTooLarge {
                file_name: file_name.to_string(),
                size,
                limit: ATTACHMENT_MAX_BYTES,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_supported_extensions_case_insensitively() {
        assert_eq!(validate_file("cases.csv", 10).unwrap(), FileKind::Csv);
        assert_eq!(validate_file("Cases.XLSX", 10).unwrap(), FileKind::Xlsx);
        assert_eq!(validate_file("old export.xls", 10).unwrap(), FileKind::Xls);
    }

    #[test]
    fn rejects_unknown_or_missing_extension() {
        for name in ["cases.pdf", "cases", "cases.csv.bak"] {
            assert!(matches!(
                validate_file(name, 10),
                Err(ImportError::UnsupportedExtension { .. })
            ));
        }
    }

    #[test]
    fn rejects_files_over_five_megabytes() {
        assert!(validate_file("cases.csv", CASE_IMPORT_MAX_BYTES).is_ok());
        let err = validate_file("cases.csv", CASE_IMPORT_MAX_BYTES + 1).unwrap_err();
        assert!(matches!(
            err,
            ImportError::FileTooLarge { limit, .. } if limit == CASE_IMPORT_MAX_BYTES
        ));
    }

    #[test]
    fn attachment_limits_apply_per_file_and_per_batch() {
        let ok: Vec<(&str, u64)> = vec![("notice.pdf", ATTACHMENT_MAX_BYTES); 2];
        assert!(validate_attachments(ok).is_ok());

        let too_many: Vec<(&str, u64)> = vec![("scan.png", 1); ATTACHMENT_MAX_FILES + 1];
        assert!(matches!(
            validate_attachments(too_many),
            Err(ImportError::TooManyFiles { count: 51, limit: 50 })
        ));

        let too_big = [("reply.docx", ATTACHMENT_MAX_BYTES + 1)];
        assert!(matches!(
            validate_attachments(too_big),
            Err(ImportError::FileTooLarge { .. })
        ));
    }
}
