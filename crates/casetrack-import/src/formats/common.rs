use crate::model::{CellValue, ImportRow};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub(crate) fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

pub(crate) fn clean_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

/// Zips a header row with one data row. Columns without a header are
/// dropped and missing trailing cells become empty strings.
pub(crate) fn build_row<I>(headers: &[String], cells: I) -> ImportRow
where
    I: IntoIterator<Item = CellValue>,
{
    let mut cells = cells.into_iter();
    let mut row = ImportRow::with_capacity(headers.len());
    for header in headers {
        let value = cells.next().unwrap_or_default();
        if header.is_empty() {
            continue;
        }
        row.push(header.clone(), value);
    }
    row
}
