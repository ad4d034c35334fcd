use std::io::Cursor;

use calamine::{Data, Reader, Xls, Xlsx};
use tracing::debug;

use super::common::{build_row, clean_header};
use crate::errors::ImportError;
use crate::model::{CellValue, ImportRow};
use crate::registry::TabularParser;

pub const PREFERRED_SHEET: &str = "Sheet1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkbookFormat {
    OpenXml,
    Binary,
}

#[derive(Debug, Clone, Copy)]
pub struct WorkbookParser {
    format: WorkbookFormat,
}

impl WorkbookParser {
    pub fn xlsx() -> Self {
        Self {
            format: WorkbookFormat::OpenXml,
        }
    }

    pub fn xls() -> Self {
        Self {
            format: WorkbookFormat::Binary,
        }
    }

    pub fn format(&self) -> WorkbookFormat {
        self.format
    }
}

impl TabularParser for WorkbookParser {
    fn name(&self) -> &'static str {
        match self.format {
            WorkbookFormat::OpenXml => "xlsx",
            WorkbookFormat::Binary => "xls",
        }
    }

    fn parse(&self, bytes: &[u8]) -> Result<Vec<ImportRow>, ImportError> {
        let parser = self.name();
        let cursor = Cursor::new(bytes);
        match self.format {
            WorkbookFormat::OpenXml => {
                let workbook: Xlsx<_> = Xlsx::new(cursor)
                    .map_err(|err| ImportError::parse(parser, err.to_string()))?;
                read_rows(parser, workbook)
            }
            WorkbookFormat::Binary => {
                let workbook: Xls<_> = Xls::new(cursor)
                    .map_err(|err| ImportError::parse(parser, err.to_string()))?;
                read_rows(parser, workbook)
            }
        }
    }
}

fn read_rows<'a, R>(parser: &'static str, mut workbook: R) -> Result<Vec<ImportRow>, ImportError>
where
    R: Reader<Cursor<&'a [u8]>>,
    R::Error: std::fmt::Display,
{
    let sheet_names = workbook.sheet_names();
    let sheet = select_sheet(&sheet_names)
        .ok_or_else(|| ImportError::parse(parser, "workbook has no worksheet"))?
        .to_string();
    debug!(sheet = %sheet, available = ?sheet_names, "reading worksheet");

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|err| ImportError::parse(parser, format!("sheet '{sheet}': {err}")))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| clean_header(&cell_value(cell).to_string()))
            .collect(),
        None => return Ok(Vec::new()),
    };

    Ok(rows
        .map(|cells| build_row(&headers, cells.iter().map(cell_value)))
        .filter(|row| !row.is_blank())
        .collect())
}

/// `Sheet1` when present, otherwise the first sheet in workbook order.
pub fn select_sheet(sheet_names: &[String]) -> Option<&str> {
    sheet_names
        .iter()
        .find(|name| name.as_str() == PREFERRED_SHEET)
        .or_else(|| sheet_names.first())
        .map(String::as_str)
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::empty(),
        Data::String(text) => CellValue::Text(text.clone()),
        Data::Float(value) => CellValue::Number(*value),
        Data::Int(value) => CellValue::Number(*value as f64),
        Data::Bool(value) => CellValue::Text(value.to_string()),
        Data::DateTime(value) => match value.as_datetime() {
            Some(datetime) => CellValue::Date(datetime.date()),
            None => CellValue::Number(value.as_f64()),
        },
        Data::DateTimeIso(text) | Data::DurationIso(text) => CellValue::Text(text.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn prefers_sheet1_over_document_order() {
        assert_eq!(select_sheet(&names(&["Summary", "Sheet1"])), Some("Sheet1"));
    }

    #[test]
    fn falls_back_to_first_sheet() {
        assert_eq!(select_sheet(&names(&["Cases", "Archive"])), Some("Cases"));
        assert_eq!(select_sheet(&names(&["sheet1", "Other"])), Some("sheet1"));
        assert_eq!(select_sheet(&[]), None);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = WorkbookParser::xlsx().parse(b"not a zip archive").unwrap_err();
        assert!(matches!(err, ImportError::Parse { parser: "xlsx", .. }));
        let err = WorkbookParser::xls().parse(b"not a compound file").unwrap_err();
        assert!(matches!(err, ImportError::Parse { parser: "xls", .. }));
    }
}
