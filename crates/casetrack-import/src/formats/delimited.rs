use csv::ReaderBuilder;

use super::common::{build_row, clean_header, strip_bom};
use crate::errors::ImportError;
use crate::model::{CellValue, ImportRow};
use crate::registry::TabularParser;

const PARSER_NAME: &str = "delimited";

#[derive(Debug, Clone, Copy)]
pub struct DelimitedParser {
    delimiter: u8,
}

impl DelimitedParser {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }
}

impl Default for DelimitedParser {
    fn default() -> Self {
        Self::new(b',')
    }
}

impl TabularParser for DelimitedParser {
    fn name(&self) -> &'static str {
        PARSER_NAME
    }

    fn parse(&self, bytes: &[u8]) -> Result<Vec<ImportRow>, ImportError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(strip_bom(bytes));

        let mut records = reader.records();
        let headers: Vec<String> = match records.next() {
            Some(record) => record
                .map_err(|err| ImportError::parse(PARSER_NAME, format!("header row: {err}")))?
                .iter()
                .map(clean_header)
                .collect(),
            None => return Ok(Vec::new()),
        };

        let mut rows = Vec::new();
        for (index, record) in records.enumerate() {
            let record = record.map_err(|err| {
                ImportError::parse(PARSER_NAME, format!("data row {}: {err}", index + 1))
            })?;
            let row = build_row(&headers, record.iter().map(CellValue::from));
            if !row.is_blank() {
                rows.push(row);
            }
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_headers_and_skips_blank_rows() {
        let input = b" Parties ,Forum\nAcme,High Court\n,\n\nBeta,Tribunal\n";
        let rows = DelimitedParser::default().parse(input).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Parties"), Some(&CellValue::from("Acme")));
        assert_eq!(rows[1].get("Forum"), Some(&CellValue::from("Tribunal")));
    }

    #[test]
    fn honours_configured_delimiter() {
        let input = b"Parties;Forum\n\"Acme; Sons\";NCLT\n";
        let rows = DelimitedParser::new(b';').parse(input).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Parties"), Some(&CellValue::from("Acme; Sons")));
    }

    #[test]
    fn empty_input_has_no_rows() {
        assert!(DelimitedParser::default().parse(b"").unwrap().is_empty());
        assert!(DelimitedParser::default().parse(b"Parties,Forum\n").unwrap().is_empty());
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        let err = DelimitedParser::default()
            .parse(b"Parties,Forum\n\xff\xfe,x\n")
            .unwrap_err();
        assert!(matches!(err, ImportError::Parse { parser: "delimited", .. }));
    }
}
