mod common;
mod delimited;
mod workbook;

pub use delimited::DelimitedParser;
pub use workbook::{select_sheet, WorkbookFormat, WorkbookParser, PREFERRED_SHEET};
