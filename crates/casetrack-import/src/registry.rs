use tracing::info;

use crate::batch::build_batch;
use crate::errors::ImportError;
use crate::formats::{DelimitedParser, WorkbookParser};
use crate::model::{ImportBatch, ImportRow};
use crate::upload::{validate_file, FileKind};

pub trait TabularParser {
    fn name(&self) -> &'static str;
    fn parse(&self, bytes: &[u8]) -> Result<Vec<ImportRow>, ImportError>;
}

#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    pub delimiter: u8,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

pub fn parse_rows(
    bytes: &[u8],
    kind: FileKind,
    options: &ParseOptions,
) -> Result<Vec<ImportRow>, ImportError> {
    let delimited = DelimitedParser::new(options.delimiter);
    let xlsx = WorkbookParser::xlsx();
    let xls = WorkbookParser::xls();
    let parser: &dyn TabularParser = match kind {
        FileKind::Csv => &delimited,
        FileKind::Xlsx => &xlsx,
        FileKind::Xls => &xls,
    };
    parser.parse(bytes)
}

pub fn normalize(
    file_name: &str,
    bytes: &[u8],
    options: &ParseOptions,
) -> Result<ImportBatch, ImportError> {
    let kind = validate_file(file_name, bytes.len() as u64)?;
    let rows = parse_rows(bytes, kind, options)?;
    let batch = build_batch(rows)?;
    info!(
        file_name,
        kind = %kind,
        records = batch.len(),
        skipped = batch.skipped,
        "normalized case import"
    );
    Ok(batch)
}
