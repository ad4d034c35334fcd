use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::model::CellValue;

pub const MAX_AMOUNT: f64 = 999_999_999_999.0;

pub const PARTIES_MAX_CHARS: usize = 500;
pub const FORUM_MAX_CHARS: usize = 200;
pub const PARTICULARS_MAX_CHARS: usize = 1000;
pub const LONG_TEXT_MAX_CHARS: usize = 2000;

// Day zero, shifted one day by the 1900 leap-year bug.
const SPREADSHEET_EPOCH: (i32, u32, u32) = (1899, 12, 30);
const SPREADSHEET_MAX_SERIAL: f64 = 2_958_465.0;

static FALLBACK_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%d.%m.%Y",
    "%d %b %Y",
    "%d-%b-%Y",
    "%d %B %Y",
    "%d-%B-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
];

static FALLBACK_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Reads a calendar date, preferring the day-month-year convention used by
/// the case registers (`05-03-2024` is 5 March 2024).
pub fn coerce_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Date(date) => Some(*date),
        CellValue::Number(serial) => date_from_serial(*serial),
        CellValue::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            parse_day_month_year(trimmed).or_else(|| parse_fallback_date(trimmed))
        }
    }
}

fn parse_day_month_year(text: &str) -> Option<NaiveDate> {
    let segments: Vec<&str> = text.split(['-', '/']).collect();
    let [day, month, year] = segments.as_slice() else {
        return None;
    };
    if ![day, month, year]
        .iter()
        .all(|segment| !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    let day: u32 = day.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let mut year: i32 = year.parse().ok()?;
    if year < 100 {
        year += 2000;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_fallback_date(text: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.date_naive());
    }
    for fmt in FALLBACK_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }
    FALLBACK_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > SPREADSHEET_MAX_SERIAL {
        return None;
    }
    let (year, month, day) = SPREADSHEET_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(year, month, day)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// Reads a non-negative monetary amount. Currency labels and grouping
/// separators in text are ignored (`Rs. 12,34,567.50` is `1234567.5`).
pub fn coerce_amount(value: &CellValue) -> Option<f64> {
    let amount = match value {
        CellValue::Number(number) => *number,
        CellValue::Text(text) => parse_amount_text(text)?,
        CellValue::Date(_) => return None,
    };

    if !amount.is_finite() {
        return None;
    }
    if amount < 0.0 {
        warn!(amount, "ignoring negative amount involved");
        return None;
    }
    if amount > MAX_AMOUNT {
        warn!(amount, max = MAX_AMOUNT, "ignoring amount involved above ceiling");
        return None;
    }
    Some(amount)
}

fn parse_amount_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let negative = trimmed.starts_with('-');

    let chars: Vec<char> = trimmed.chars().collect();
    let first_digit = chars.iter().position(char::is_ascii_digit)?;
    // keep a decimal point directly before the first digit (".5") unless it
    // closes an abbreviation such as "Rs."
    let start = match first_digit.checked_sub(1) {
        Some(prev)
            if chars[prev] == '.'
                && prev
                    .checked_sub(1)
                    .map_or(true, |before| !chars[before].is_alphabetic()) =>
        {
            prev
        }
        _ => first_digit,
    };

    let mut cleaned = String::with_capacity(chars.len() - start);
    let mut seen_point = false;
    for &ch in &chars[start..] {
        match ch {
            '0'..='9' => cleaned.push(ch),
            '.' if seen_point => break,
            '.' => {
                seen_point = true;
                cleaned.push(ch);
            }
            _ => {}
        }
    }

    let parsed: f64 = cleaned.parse().ok()?;
    Some(if negative { -parsed } else { parsed })
}

pub fn coerce_serial(value: &CellValue) -> Option<i32> {
    match value {
        CellValue::Number(number) => {
            if number.is_finite() && *number >= 1.0 && *number <= f64::from(i32::MAX) {
                Some(number.trunc() as i32)
            } else {
                None
            }
        }
        CellValue::Text(text) => {
            let digits: String = text
                .trim()
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            digits.parse::<i32>().ok().filter(|serial| *serial > 0)
        }
        CellValue::Date(_) => None,
    }
}

pub fn coerce_text(value: &CellValue, max_chars: usize) -> Option<String> {
    let text = value.to_string();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(max_chars).collect::<String>().trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> CellValue {
        CellValue::from(value)
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_month_year_is_preferred() {
        assert_eq!(coerce_date(&text("05-03-2024")), Some(ymd(2024, 3, 5)));
        assert_eq!(coerce_date(&text("05/03/2024")), Some(ymd(2024, 3, 5)));
        assert_eq!(coerce_date(&text("31/12/23")), Some(ymd(2023, 12, 31)));
        assert_eq!(
            coerce_date(&text("05-03-2024")).map(|d| d.to_string()),
            Some("2024-03-05".to_string())
        );
    }

    #[test]
    fn falls_back_to_iso_and_textual_formats() {
        assert_eq!(coerce_date(&text("2024-03-05")), Some(ymd(2024, 3, 5)));
        assert_eq!(coerce_date(&text("2024-03-05T10:30:00Z")), Some(ymd(2024, 3, 5)));
        assert_eq!(coerce_date(&text("5 Mar 2024")), Some(ymd(2024, 3, 5)));
        assert_eq!(coerce_date(&text("05-Mar-2024")), Some(ymd(2024, 3, 5)));
        assert_eq!(coerce_date(&text("March 5, 2024")), Some(ymd(2024, 3, 5)));
    }

    #[test]
    fn day_month_year_with_time_keeps_the_date() {
        assert_eq!(coerce_date(&text("05-03-2024 10:30")), Some(ymd(2024, 3, 5)));
        assert_eq!(coerce_date(&text("05-03-2024 10:30:15")), Some(ymd(2024, 3, 5)));
        assert_eq!(coerce_date(&text("05/03/2024 09:00")), Some(ymd(2024, 3, 5)));
        assert_eq!(coerce_date(&text("05/03/2024 09:00:00")), Some(ymd(2024, 3, 5)));
        assert_eq!(coerce_date(&text("32/03/2024 09:00")), None);
    }

    #[test]
    fn spreadsheet_serials_and_date_cells() {
        assert_eq!(coerce_date(&CellValue::Number(45356.0)), Some(ymd(2024, 3, 5)));
        assert_eq!(coerce_date(&CellValue::Date(ymd(2020, 1, 2))), Some(ymd(2020, 1, 2)));
        assert_eq!(coerce_date(&CellValue::Number(-1.0)), None);
    }

    #[test]
    fn unparseable_dates_are_none() {
        for raw in ["", "soon", "32-01-2024", "05-13-2024x", "aa-bb-cccc", "TBD"] {
            assert_eq!(coerce_date(&text(raw)), None, "{raw:?}");
        }
    }

    #[test]
    fn amounts_strip_currency_and_grouping() {
        assert_eq!(coerce_amount(&text("Rs. 12,34,567.50")), Some(1234567.5));
        assert_eq!(coerce_amount(&text("Rs. 10,000")), Some(10000.0));
        assert_eq!(coerce_amount(&text("₹ 2,500")), Some(2500.0));
        assert_eq!(coerce_amount(&text(".5")), Some(0.5));
        assert_eq!(coerce_amount(&CellValue::Number(42.25)), Some(42.25));
    }

    #[test]
    fn negative_and_oversized_amounts_are_rejected() {
        assert_eq!(coerce_amount(&text("-5")), None);
        assert_eq!(coerce_amount(&text("9999999999999")), None);
        assert_eq!(coerce_amount(&CellValue::Number(-5.0)), None);
        assert_eq!(coerce_amount(&CellValue::Number(f64::INFINITY)), None);
        assert_eq!(coerce_amount(&text("999999999999")), Some(MAX_AMOUNT));
        assert_eq!(coerce_amount(&text("n/a")), None);
    }

    #[test]
    fn serial_numbers() {
        assert_eq!(coerce_serial(&text("12")), Some(12));
        assert_eq!(coerce_serial(&text("12a")), Some(12));
        assert_eq!(coerce_serial(&CellValue::Number(3.0)), Some(3));
        assert_eq!(coerce_serial(&text("0")), None);
        assert_eq!(coerce_serial(&text("x")), None);
    }

    #[test]
    fn text_is_trimmed_and_capped_by_characters() {
        assert_eq!(coerce_text(&text("  Acme  "), 10), Some("Acme".to_string()));
        assert_eq!(coerce_text(&text("   "), 10), None);
        let long = "é".repeat(600);
        assert_eq!(
            coerce_text(&text(&long), PARTIES_MAX_CHARS).map(|s| s.chars().count()),
            Some(500)
        );
    }
}
