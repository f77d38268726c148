// ============================================================
// DELIMITED TEXT PARSER
// ============================================================
// CSV/TSV uploads with encoding and delimiter detection

use csv::ReaderBuilder;
use encoding_rs::{UTF_8, WINDOWS_1252};
use tracing::debug;

use super::SheetOutcome;
use crate::domain::error::{AppError, Result};
use crate::domain::sheet::Cell;

/// Name given to the single implicit sheet of a delimited file
pub const IMPLICIT_SHEET_NAME: &str = "Sheet1";

/// Delimited text parser; the delimiter is detected per file
#[derive(Debug, Default)]
pub struct DelimitedParser;

impl DelimitedParser {
    pub fn new() -> Self {
        Self
    }

    /// Decode the upload and read it as one sheet
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Vec<SheetOutcome>> {
        let content = Self::decode_text(bytes)?;
        Ok(vec![self.parse_content(&content)])
    }

    /// Parse already-decoded text. Header line is kept verbatim.
    pub fn parse_content(&self, content: &str) -> SheetOutcome {
        let delimiter = Self::detect_delimiter(content);

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut raw: Vec<Vec<Cell>> = Vec::new();
        for (index, result) in reader.records().enumerate() {
            match result {
                Ok(record) => raw.push(record.iter().map(Cell::from).collect()),
                Err(e) => {
                    return SheetOutcome::Failed {
                        name: IMPLICIT_SHEET_NAME.to_string(),
                        error: format!("Failed to parse row {}: {}", index + 1, e),
                    }
                }
            }
        }

        debug!(rows = raw.len(), delimiter = %(delimiter as char), "Decoded delimited text");
        SheetOutcome::from_raw(IMPLICIT_SHEET_NAME.to_string(), raw)
    }

    /// BOM-aware UTF-8 decoding with a Windows-1252 fallback, which covers
    /// spreadsheets exported from Excel on Windows.
    pub fn decode_text(bytes: &[u8]) -> Result<String> {
        let (text, _, malformed) = UTF_8.decode(bytes);
        let text = if malformed {
            let (fallback, _, _) = WINDOWS_1252.decode(bytes);
            fallback.into_owned()
        } else {
            text.into_owned()
        };

        if text.contains('\0') {
            return Err(AppError::ParseError(
                "File is neither a workbook nor delimited text".to_string(),
            ));
        }
        Ok(text)
    }

    /// Detect delimiter from content (comma, semicolon, tab, pipe)
    pub fn detect_delimiter(content: &str) -> u8 {
        let candidates = [b',', b';', b'\t', b'|'];
        let sample_lines: Vec<&str> = content.lines().take(10).collect();

        let mut best_delimiter = b',';
        let mut best_score = 0.0f32;

        if sample_lines.is_empty() {
            return best_delimiter;
        }

        for &delimiter in &candidates {
            let field_counts: Vec<usize> = sample_lines
                .iter()
                .map(|line| line.bytes().filter(|&b| b == delimiter).count())
                .collect();

            // Score by frequency, penalised by inconsistency between lines
            let avg = field_counts.iter().sum::<usize>() as f32 / field_counts.len() as f32;
            let variance = field_counts
                .iter()
                .map(|&x| (x as f32 - avg).powi(2))
                .sum::<f32>()
                / field_counts.len() as f32;
            let score = avg / (1.0 + variance.sqrt());

            if score > best_score {
                best_score = score;
                best_delimiter = delimiter;
            }
        }

        best_delimiter
    }
}
