use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One loosely typed spreadsheet cell. An absent cell is `Text` holding the
/// empty string.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl CellValue {
    pub fn empty() -> Self {
        CellValue::Text(String::new())
    }

    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Text(text) => text.trim().is_empty(),
            CellValue::Number(_) | CellValue::Date(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::empty()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(text) => f.write_str(text),
            CellValue::Number(value) => write!(f, "{value}"),
            CellValue::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportRow {
    cells: Vec<(String, CellValue)>,
}

impl ImportRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, header: impl Into<String>, value: CellValue) {
        self.cells.push((header.into(), value));
    }

    pub fn cells(&self) -> &[(String, CellValue)] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut CellValue> {
        self.cells.iter_mut().map(|(_, value)| value)
    }

    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == header)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, value)| value.is_blank())
    }
}

impl<H: Into<String>> FromIterator<(H, CellValue)> for ImportRow {
    fn from_iter<T: IntoIterator<Item = (H, CellValue)>>(iter: T) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(header, value)| (header.into(), value))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseStatus {
    #[default]
    Active,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Active => "Active",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRecord {
    pub serial_number: i32,
    pub parties: String,
    pub forum: String,
    pub particulars: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub last_hearing_date: Option<NaiveDate>,
    pub next_hearing_date: Option<NaiveDate>,
    pub amount_involved: Option<f64>,
    pub treatment_resolution: Option<String>,
    pub remarks: Option<String>,
    pub status: CaseStatus,
}

impl CaseRecord {
    pub fn is_valid(&self) -> bool {
        !self.parties.trim().is_empty() && !self.forum.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportBatch {
    pub records: Vec<CaseRecord>,
    pub skipped: usize,
}

impl ImportBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
