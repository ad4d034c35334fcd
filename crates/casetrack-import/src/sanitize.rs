use crate::model::{CellValue, ImportRow};

const FORMULA_TRIGGERS: [char; 4] = ['=', '+', '-', '@'];

pub fn sanitize_cell(value: CellValue) -> CellValue {
    match value {
        CellValue::Text(text) => CellValue::Text(sanitize_text(&text).to_string()),
        other => other,
    }
}

// Strips until no trigger leads, so sanitizing twice changes nothing.
pub fn sanitize_text(text: &str) -> &str {
    let mut current = text.trim();
    loop {
        let Some(first) = current.chars().next() else {
            return current;
        };
        if !FORMULA_TRIGGERS.contains(&first) || is_signed_number(current) {
            return current;
        }
        current = current[first.len_utf8()..].trim();
    }
}

pub fn sanitize_row(row: &mut ImportRow) {
    for cell in row.cells_mut() {
        let value = std::mem::take(cell);
        *cell = sanitize_cell(value);
    }
}

// `-5` is data, not a formula.
fn is_signed_number(text: &str) -> bool {
    let Some(rest) = text.strip_prefix(['-', '+']) else {
        return false;
    };
    let mut digits = 0;
    let mut points = 0;
    for ch in rest.chars() {
        match ch {
            '0'..='9' => digits += 1,
            '.' => points += 1,
            _ => return false,
        }
    }
    digits > 0 && points <= 1
}
