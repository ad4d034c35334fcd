use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("unsupported file type '{file_name}': expected .csv, .xlsx or .xls")]
    UnsupportedExtension { file_name: String },

    #[error("file '{file_name}' is {size} bytes, above the {limit} byte limit")]
    FileTooLarge {
        file_name: String,
        size: u64,
        limit: u64,
    },

    #[error("{count} files selected, at most {limit} may be attached")]
    TooManyFiles { count: usize, limit: usize },

    #[error("file has {count} data rows, at most {limit} can be imported at once")]
    TooManyRows { count: usize, limit: usize },

    #[error("{parser} could not read file: {message}")]
    Parse {
        parser: &'static str,
        message: String,
    },

    #[error("no valid rows found: {skipped} rows were missing parties or forum")]
    NoValidRows { skipped: usize },
}

impl ImportError {
    pub(crate) fn parse(parser: &'static str, message: impl Into<String>) -> Self {
        ImportError::Parse {
            parser,
            message: message.into(),
        }
    }
}
