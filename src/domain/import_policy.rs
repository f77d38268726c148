// ============================================================
// IMPORT POLICY
// ============================================================
// Per-endpoint variation of the ingestion pipeline

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetScope {
    AllSheets,
    FirstSheetOnly,
}

/// How one ingestion request treats sheets, rows and the inserted batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportPolicy {
    pub sheet_scope: SheetScope,

    /// Maximum data rows taken from each sheet (`None` = all rows)
    pub row_limit: Option<usize>,

    /// Abort the whole request when a sheet fails to parse
    pub sheet_failures_fatal: bool,

    /// Delete the inserted rows again once the insert succeeded
    pub cleanup: bool,
}

impl Default for ImportPolicy {
    fn default() -> Self {
        Self::full()
    }
}

impl ImportPolicy {
    /// Every row of every sheet, kept in the store.
    pub fn full() -> Self {
        Self {
            sheet_scope: SheetScope::AllSheets,
            row_limit: None,
            sheet_failures_fatal: false,
            cleanup: false,
        }
    }

    /// First `rows` data rows of every sheet, kept in the store.
    pub fn sample(rows: usize) -> Self {
        Self {
            row_limit: Some(rows),
            ..Self::full()
        }
    }

    /// First `rows` data rows of the first sheet, inserted then deleted again.
    pub fn diagnostic(rows: usize) -> Self {
        Self {
            sheet_scope: SheetScope::FirstSheetOnly,
            row_limit: Some(rows),
            sheet_failures_fatal: true,
            cleanup: true,
        }
    }

    pub fn is_diagnostic(&self) -> bool {
        self.cleanup
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.row_limit == Some(0) {
            return Err("row_limit must be > 0".to_string());
        }
        Ok(())
    }
}
