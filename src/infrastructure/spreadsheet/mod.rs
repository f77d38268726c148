// ============================================================
// SPREADSHEET PARSER
// ============================================================
// Decode an uploaded workbook or delimited text file into sheets

mod delimited;
mod workbook;

pub use delimited::DelimitedParser;
pub use workbook::parse_workbook;

use crate::domain::error::Result;
use crate::domain::sheet::{FileKind, SheetTable};

/// Result of decoding one sheet. A failed sheet does not fail the file.
#[derive(Debug, Clone)]
pub enum SheetOutcome {
    Parsed(SheetTable),
    Failed { name: String, error: String },
}

impl SheetOutcome {
    pub fn name(&self) -> &str {
        match self {
            SheetOutcome::Parsed(table) => &table.name,
            SheetOutcome::Failed { name, .. } => name,
        }
    }

    pub(crate) fn from_raw(name: String, raw: Vec<Vec<crate::domain::sheet::Cell>>) -> Self {
        let row_count = raw.len();
        match SheetTable::from_rows(name.clone(), raw) {
            Some(table) => SheetOutcome::Parsed(table),
            None => SheetOutcome::Failed {
                error: format!(
                    "Sheet '{}' has {} row(s); a header row and at least one data row are required",
                    name, row_count
                ),
                name,
            },
        }
    }
}

/// Decode `bytes` as the given kind. Errors only when the buffer is not a
/// readable spreadsheet at all; per-sheet problems come back as
/// `SheetOutcome::Failed`.
pub fn parse_upload(bytes: &[u8], kind: FileKind) -> Result<Vec<SheetOutcome>> {
    match kind {
        FileKind::Workbook => parse_workbook(bytes),
        FileKind::Delimited => DelimitedParser::new().parse_bytes(bytes),
    }
}
