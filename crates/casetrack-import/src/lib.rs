pub mod batch;
pub mod coerce;
pub mod errors;
pub mod formats;
pub mod model;
mod registry;
pub mod sanitize;
pub mod schema;
pub mod upload;

pub use batch::{build_batch, build_record, MAX_IMPORT_ROWS};
pub use coerce::{coerce_amount, coerce_date, coerce_serial, coerce_text, MAX_AMOUNT};
pub use errors::ImportError;
pub use model::{CaseRecord, CaseStatus, CellValue, ImportBatch, ImportRow};
pub use registry::{normalize, parse_rows, ParseOptions, TabularParser};
pub use sanitize::{sanitize_cell, sanitize_row};
pub use schema::{lookup_field, CaseField};
pub use upload::{
    validate_attachments, validate_file, FileKind, ATTACHMENT_MAX_BYTES, ATTACHMENT_MAX_FILES,
    CASE_IMPORT_MAX_BYTES,
};
