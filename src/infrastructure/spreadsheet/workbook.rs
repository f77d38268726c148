use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use tracing::{debug, warn};

use super::SheetOutcome;
use crate::domain::error::{AppError, Result};
use crate::domain::sheet::Cell;

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::String(value) => Cell::from(value.as_str()),
        Data::Int(value) => Cell::Number(*value as f64),
        Data::Float(value) => Cell::Number(*value),
        Data::Bool(value) => Cell::Bool(*value),
        Data::Empty | Data::Error(_) => Cell::Empty,
        other => Cell::Text(other.to_string()),
    }
}

/// Read every sheet of an xlsx/xlsm/xlsb/xls/ods workbook, in file order.
pub fn parse_workbook(bytes: &[u8]) -> Result<Vec<SheetOutcome>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| AppError::ParseError(format!("Failed to open workbook: {}", e)))?;

    let sheet_names = workbook.sheet_names();
    if sheet_names.is_empty() {
        return Err(AppError::ParseError("Workbook contains no sheets".to_string()));
    }

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for name in sheet_names {
        let outcome = match workbook.worksheet_range(&name) {
            Ok(range) => {
                let raw: Vec<Vec<Cell>> = range
                    .rows()
                    .map(|row| row.iter().map(to_cell).collect())
                    .collect();
                debug!(sheet = %name, rows = raw.len(), "Decoded worksheet");
                SheetOutcome::from_raw(name, raw)
            }
            Err(e) => {
                warn!(sheet = %name, error = %e, "Failed to read worksheet");
                SheetOutcome::Failed {
                    error: format!("Failed to read sheet '{}': {}", name, e),
                    name,
                }
            }
        };
        sheets.push(outcome);
    }

    Ok(sheets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn build_workbook() -> Vec<u8> {
        let mut workbook = Workbook::new();

        let english = workbook.add_worksheet();
        english.set_name("English").unwrap();
        english.write_string(0, 0, "Learning Area").unwrap();
        english.write_string(0, 1, "Level").unwrap();
        english.write_string(1, 0, "English").unwrap();
        english.write_number(1, 1, 7.0).unwrap();

        let notes = workbook.add_worksheet();
        notes.set_name("Notes").unwrap();
        notes.write_string(0, 0, "Only a header").unwrap();

        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_every_sheet_in_file_order() {
        let sheets = parse_workbook(&build_workbook()).unwrap();
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0].name(), "English");
        assert_eq!(sheets[1].name(), "Notes");

        match &sheets[0] {
            SheetOutcome::Parsed(table) => {
                assert_eq!(table.header[0].to_text(), "Learning Area");
                assert_eq!(table.rows.len(), 1);
                assert_eq!(table.rows[0][1].to_text(), "7");
            }
            other => panic!("expected parsed sheet, got {:?}", other),
        }
    }

    #[test]
    fn test_header_only_sheet_fails_alone() {
        let sheets = parse_workbook(&build_workbook()).unwrap();
        assert!(matches!(&sheets[1], SheetOutcome::Failed { name, .. } if name == "Notes"));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let err = parse_workbook(b"PK\x03\x04 definitely not a zip").unwrap_err();
        assert!(matches!(err, AppError::ParseError(_)));
    }
}
