// ============================================================
// SHEET TYPES
// ============================================================
// Decoded spreadsheet content, one table per sheet

use serde::{Deserialize, Serialize};

/// A single decoded cell. Only stringification is applied downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl Cell {
    /// Stringified cell value. Integral numbers render without a fraction,
    /// so a level column holding `7` reads as `"7"` rather than `"7.0"`.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Text(value) => value.clone(),
            Cell::Number(value) => {
                if value.fract() == 0.0 && value.abs() < 1e15 {
                    format!("{}", *value as i64)
                } else {
                    value.to_string()
                }
            }
            Cell::Bool(value) => value.to_string(),
            Cell::Empty => String::new(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.to_text().trim().is_empty()
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }
}

impl From<serde_json::Value> for Cell {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Cell::from(s.as_str()),
            serde_json::Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Empty),
            serde_json::Value::Bool(b) => Cell::Bool(b),
            serde_json::Value::Null => Cell::Empty,
            other => Cell::Text(other.to_string()),
        }
    }
}

/// Uploaded file family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Workbook,
    Delimited,
}

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];
const DELIMITED_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];

impl FileKind {
    /// Declared kind from the file name, then the content type, then the
    /// leading bytes (zip container or OLE compound document).
    pub fn sniff(file_name: Option<&str>, content_type: Option<&str>, bytes: &[u8]) -> Self {
        if let Some(ext) = file_name
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase())
        {
            if WORKBOOK_EXTENSIONS.contains(&ext.as_str()) {
                return FileKind::Workbook;
            }
            if DELIMITED_EXTENSIONS.contains(&ext.as_str()) {
                return FileKind::Delimited;
            }
        }

        if let Some(content_type) = content_type {
            let content_type = content_type.to_ascii_lowercase();
            if content_type.contains("spreadsheet")
                || content_type.contains("ms-excel")
                || content_type.contains("opendocument")
            {
                return FileKind::Workbook;
            }
            if content_type.starts_with("text/") {
                return FileKind::Delimited;
            }
        }

        if bytes.starts_with(b"PK\x03\x04") || bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0]) {
            FileKind::Workbook
        } else {
            FileKind::Delimited
        }
    }
}

/// One sheet: the verbatim header row plus its non-blank data rows.
#[derive(Debug, Clone)]
pub struct SheetTable {
    pub name: String,
    pub header: Vec<Cell>,
    pub rows: Vec<Vec<Cell>>,
    pub blank_rows: usize,
}

impl SheetTable {
    /// Build from raw rows where row 0 is the header. Fully blank data rows
    /// are counted and dropped.
    pub fn from_rows(name: impl Into<String>, mut raw: Vec<Vec<Cell>>) -> Option<Self> {
        if raw.len() < 2 {
            return None;
        }
        let header = raw.remove(0);
        let total = raw.len();
        let rows: Vec<Vec<Cell>> = raw
            .into_iter()
            .filter(|row| row.iter().any(|cell| !cell.is_blank()))
            .collect();
        let blank_rows = total - rows.len();

        Some(Self {
            name: name.into(),
            header,
            rows,
            blank_rows,
        })
    }

    pub fn total_data_rows(&self) -> usize {
        self.rows.len() + self.blank_rows
    }
}
