use crate::model::{CellValue, ImportRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseField {
    SerialNumber,
    Parties,
    Forum,
    Particulars,
    StartDate,
    LastHearingDate,
    NextHearingDate,
    AmountInvolved,
    TreatmentResolution,
    Remarks,
}

impl CaseField {
    pub const ALL: [CaseField; 10] = [
        CaseField::SerialNumber,
        CaseField::Parties,
        CaseField::Forum,
        CaseField::Particulars,
        CaseField::StartDate,
        CaseField::LastHearingDate,
        CaseField::NextHearingDate,
        CaseField::AmountInvolved,
        CaseField::TreatmentResolution,
        CaseField::Remarks,
    ];

    pub fn canonical_name(&self) -> &'static str {
        match self {
            CaseField::SerialNumber => "sr_no",
            CaseField::Parties => "parties",
            CaseField::Forum => "forum",
            CaseField::Particulars => "particular",
            CaseField::StartDate => "start_date",
            CaseField::LastHearingDate => "last_hearing_date",
            CaseField::NextHearingDate => "next_hearing_date",
            CaseField::AmountInvolved => "amount_involved",
            CaseField::TreatmentResolution => "treatment_resolution",
            CaseField::Remarks => "remarks",
        }
    }

    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            CaseField::SerialNumber => &[
                "Sr. No.",
                "Sr No",
                "SrNo",
                "Sr.No.",
                "Serial No",
                "Serial Number",
            ],
            CaseField::Parties => &["Parties", "Party", "Party Name"],
            CaseField::Forum => &["Forum", "Court", "Court/Forum"],
            CaseField::Particulars => &["Particulars", "Particular", "Description"],
            CaseField::StartDate => &["Start Date", "StartDate", "start_date", "Date of Filing"],
            CaseField::LastHearingDate => &[
                "Last Hearing Date",
                "LastHearingDate",
                "last_hearing_date",
                "Last Date",
            ],
            CaseField::NextHearingDate => &[
                "Next Hearing Date",
                "NextHearingDate",
                "next_hearing_date",
                "Next Date",
            ],
            CaseField::AmountInvolved => &[
                "Amount involved",
                "Amount Involved",
                "AmountInvolved",
                "amount_involved",
                "Amount",
            ],
            CaseField::TreatmentResolution => &[
                "Treatment/Resolution",
                "Treatment / Resolution",
                "TreatmentResolution",
                "treatment_resolution",
                "Resolution",
            ],
            CaseField::Remarks => &["Remarks", "Remark", "Comments"],
        }
    }

    pub fn lookup<'r>(&self, row: &'r ImportRow) -> Option<&'r CellValue> {
        lookup_field(row, self.aliases())
    }
}

/// Lowercases, trims and collapses runs of whitespace so that `" Sr  No "`
/// and `"sr no"` compare equal.
pub fn normalize_header(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn lookup_field<'r>(row: &'r ImportRow, aliases: &[&str]) -> Option<&'r CellValue> {
    aliases.iter().find_map(|alias| {
        let wanted = normalize_header(alias);
        row.cells()
            .iter()
            .filter(|(header, _)| normalize_header(header) == wanted)
            .map(|(_, value)| value)
            .find(|value| !value.is_blank())
    })
}
