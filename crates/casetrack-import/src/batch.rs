use tracing::warn;

use crate::coerce::{
    coerce_amount, coerce_date, coerce_serial, coerce_text, FORUM_MAX_CHARS, LONG_TEXT_MAX_CHARS,
    PARTICULARS_MAX_CHARS, PARTIES_MAX_CHARS,
};
use crate::errors::ImportError;
use crate::model::{CaseRecord, CaseStatus, ImportBatch, ImportRow};
use crate::sanitize::sanitize_row;
use crate::schema::CaseField;

pub const MAX_IMPORT_ROWS: usize = 1000;

/// Turns parsed rows into case records, dropping rows without parties or
/// forum. The whole file is rejected above [`MAX_IMPORT_ROWS`] or when no
/// row survives.
pub fn build_batch(rows: Vec<ImportRow>) -> Result<ImportBatch, ImportError> {
    if rows.len() > MAX_IMPORT_ROWS {
        return Err(ImportError::TooManyRows {
            count: rows.len(),
            limit: MAX_IMPORT_ROWS,
        });
    }

    let mut batch = ImportBatch::default();
    for (index, mut row) in rows.into_iter().enumerate() {
        sanitize_row(&mut row);
        let record = build_record(&row, index + 1);
        if record.is_valid() {
            batch.records.push(record);
        } else {
            warn!(row = index + 1, "skipping row without parties or forum");
            batch.skipped += 1;
        }
    }

    if batch.records.is_empty() {
        return Err(ImportError::NoValidRows {
            skipped: batch.skipped,
        });
    }

    Ok(batch)
}

pub fn build_record(row: &ImportRow, position: usize) -> CaseRecord {
    let text = |field: CaseField, max_chars: usize| {
        field
            .lookup(row)
            .and_then(|value| coerce_text(value, max_chars))
    };
    let date = |field: CaseField| field.lookup(row).and_then(coerce_date);

    let default_serial = i32::try_from(position).unwrap_or(i32::MAX);

    CaseRecord {
        serial_number: CaseField::SerialNumber
            .lookup(row)
            .and_then(coerce_serial)
            .unwrap_or(default_serial),
        parties: text(CaseField::Parties, PARTIES_MAX_CHARS).unwrap_or_default(),
        forum: text(CaseField::Forum, FORUM_MAX_CHARS).unwrap_or_default(),
        particulars: text(CaseField::Particulars, PARTICULARS_MAX_CHARS),
        start_date: date(CaseField::StartDate),
        last_hearing_date: date(CaseField::LastHearingDate),
        next_hearing_date: date(CaseField::NextHearingDate),
        amount_involved: CaseField::AmountInvolved.lookup(row).and_then(coerce_amount),
        treatment_resolution: text(CaseField::TreatmentResolution, LONG_TEXT_MAX_CHARS),
        remarks: text(CaseField::Remarks, LONG_TEXT_MAX_CHARS),
        status: CaseStatus::Active,
    }
}
