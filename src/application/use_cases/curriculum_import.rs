// ============================================================
// CURRICULUM IMPORT USE CASE
// ============================================================
// parse -> normalize -> batch insert -> (optional) cleanup

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::curriculum::{CurriculumOutcome, RecordId};
use crate::domain::error::{AppError, Result};
use crate::domain::import_policy::{ImportPolicy, SheetScope};
use crate::domain::sheet::{Cell, FileKind, SheetTable};
use crate::infrastructure::spreadsheet::{parse_upload, SheetOutcome};
use crate::infrastructure::store::CurriculumStore;

use super::record_normalizer::RecordNormalizer;

/// Raw upload as received from the client
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SheetReport {
    pub name: String,
    /// Data rows in the sheet, blank ones included
    pub data_rows: usize,
    pub blank_rows: usize,
    /// Non-blank rows run through the normalizer (after the row limit)
    pub processed_rows: usize,
    pub accepted: usize,
    pub dropped: usize,
    pub mapped_headers: Vec<String>,
    pub unmapped_headers: Vec<String>,
    pub error: Option<String>,
}

impl SheetReport {
    fn failed(name: String, error: String) -> Self {
        Self {
            name,
            data_rows: 0,
            blank_rows: 0,
            processed_rows: 0,
            accepted: 0,
            dropped: 0,
            mapped_headers: Vec::new(),
            unmapped_headers: Vec::new(),
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub success: bool,
    pub import_id: Uuid,
    pub file_name: Option<String>,
    pub file_kind: Option<FileKind>,
    pub policy: ImportPolicy,
    pub sheets: Vec<SheetReport>,
    pub records_accepted: usize,
    pub records_inserted: usize,
    pub cleaned_up: bool,
    pub records_deleted: usize,
    pub cleanup_error: Option<String>,
    pub sample: Option<CurriculumOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Normalized records plus per-sheet accounting, before anything is stored
#[derive(Debug, Default)]
pub struct PreparedImport {
    pub sheets: Vec<SheetReport>,
    pub records: Vec<CurriculumOutcome>,
}

/// Sheet used by the connectivity test when the caller sends no rows
pub fn builtin_test_sheet() -> SheetTable {
    SheetTable {
        name: "builtin-test".to_string(),
        header: ["Learning Area", "Subject", "Level", "Strand", "Content Description"]
            .iter()
            .map(|h| Cell::from(*h))
            .collect(),
        rows: vec![[
            "English",
            "English",
            "Foundation",
            "Language",
            "Understand that English is one of many languages spoken in Australia",
        ]
        .iter()
        .map(|v| Cell::from(*v))
        .collect()],
        blank_rows: 0,
    }
}

/// Normalize the sheets selected by `policy`. Pure: touches no store.
pub fn prepare_import(sheets: Vec<SheetOutcome>, policy: &ImportPolicy) -> Result<PreparedImport> {
    let selected: Vec<SheetOutcome> = match policy.sheet_scope {
        SheetScope::AllSheets => sheets,
        SheetScope::FirstSheetOnly => sheets.into_iter().take(1).collect(),
    };
    if selected.is_empty() {
        return Err(AppError::ParseError("No sheets found in upload".to_string()));
    }

    let row_limit = policy.row_limit.unwrap_or(usize::MAX);
    let mut prepared = PreparedImport::default();

    for sheet in selected {
        let table = match sheet {
            SheetOutcome::Parsed(table) => table,
            SheetOutcome::Failed { name, error } => {
                if policy.sheet_failures_fatal {
                    return Err(AppError::ParseError(error));
                }
                warn!(sheet = %name, error = %error, "Skipping sheet");
                prepared.sheets.push(SheetReport::failed(name, error));
                continue;
            }
        };

        let normalizer = RecordNormalizer::new(&table.header);
        let index = normalizer.header_index();
        if index.is_empty() {
            warn!(sheet = %table.name, "No recognized headers in sheet");
        }

        let mut report = SheetReport {
            name: table.name.clone(),
            data_rows: table.total_data_rows(),
            blank_rows: table.blank_rows,
            processed_rows: 0,
            accepted: 0,
            dropped: 0,
            mapped_headers: index.mapped.clone(),
            unmapped_headers: index.unmapped.clone(),
            error: None,
        };

        for row in table.rows.iter().take(row_limit) {
            report.processed_rows += 1;
            match normalizer.normalize(row) {
                Some(outcome) => {
                    report.accepted += 1;
                    prepared.records.push(outcome);
                }
                None => report.dropped += 1,
            }
        }

        debug!(
            sheet = %report.name,
            processed = report.processed_rows,
            accepted = report.accepted,
            dropped = report.dropped,
            blank = report.blank_rows,
            "Normalized sheet"
        );
        prepared.sheets.push(report);
    }

    if prepared.records.is_empty() {
        let failures: Vec<String> = prepared
            .sheets
            .iter()
            .filter_map(|s| s.error.as_ref().map(|e| format!("{}: {}", s.name, e)))
            .collect();
        let mut message = "No curriculum records found in upload".to_string();
        if !failures.is_empty() {
            message.push_str(&format!(" ({})", failures.join("; ")));
        }
        return Err(AppError::ValidationError(message));
    }

    Ok(prepared)
}

pub struct CurriculumImportUseCase {
    store: Arc<dyn CurriculumStore>,
}

impl CurriculumImportUseCase {
    pub fn new(store: Arc<dyn CurriculumStore>) -> Self {
        Self { store }
    }

    /// Import an uploaded workbook or delimited file.
    pub async fn import_file(
        &self,
        upload: UploadedFile,
        policy: &ImportPolicy,
    ) -> Result<ImportSummary> {
        policy.validate().map_err(AppError::ValidationError)?;

        let import_id = Uuid::new_v4();
        let started_at = Utc::now();
        let kind = FileKind::sniff(
            upload.file_name.as_deref(),
            upload.content_type.as_deref(),
            &upload.bytes,
        );

        info!(
            import_id = %import_id,
            file = upload.file_name.as_deref().unwrap_or("-"),
            kind = ?kind,
            bytes = upload.bytes.len(),
            diagnostic = policy.is_diagnostic(),
            "Starting curriculum import"
        );

        let sheets = parse_upload(&upload.bytes, kind).map_err(|e| {
            error!(import_id = %import_id, error = %e, "Upload could not be parsed");
            e
        })?;
        debug!(
            import_id = %import_id,
            sheets = ?sheets.iter().map(SheetOutcome::name).collect::<Vec<_>>(),
            "Decoded upload"
        );
        let prepared = prepare_import(sheets, policy)?;

        let mut summary = self.persist(import_id, started_at, prepared, policy).await?;
        summary.file_name = upload.file_name;
        summary.file_kind = Some(kind);
        Ok(summary)
    }

    /// Import rows supplied directly (header row plus data rows).
    pub async fn import_rows(
        &self,
        table: SheetTable,
        policy: &ImportPolicy,
    ) -> Result<ImportSummary> {
        policy.validate().map_err(AppError::ValidationError)?;

        let import_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(
            import_id = %import_id,
            sheet = %table.name,
            rows = table.rows.len(),
            diagnostic = policy.is_diagnostic(),
            "Starting row import"
        );

        let prepared = prepare_import(vec![SheetOutcome::Parsed(table)], policy)?;
        self.persist(import_id, started_at, prepared, policy).await
    }

    async fn persist(
        &self,
        import_id: Uuid,
        started_at: DateTime<Utc>,
        prepared: PreparedImport,
        policy: &ImportPolicy,
    ) -> Result<ImportSummary> {
        let PreparedImport { sheets, records } = prepared;

        let inserted = self.store.insert_batch(&records).await.map_err(|e| {
            error!(
                import_id = %import_id,
                records = records.len(),
                code = e.code().unwrap_or("-"),
                error = %e,
                "Batch insert failed"
            );
            e
        })?;
        info!(
            import_id = %import_id,
            target = self.store.target(),
            accepted = records.len(),
            inserted = inserted.len(),
            "Inserted curriculum outcomes"
        );

        let mut cleaned_up = false;
        let mut records_deleted = 0;
        let mut cleanup_error = None;
        if policy.cleanup {
            let ids: Vec<RecordId> = inserted.iter().map(|row| row.id.clone()).collect();
            match self.store.delete_by_ids(&ids).await {
                Ok(deleted) => {
                    cleaned_up = true;
                    records_deleted = deleted;
                    info!(import_id = %import_id, deleted, "Removed diagnostic rows");
                }
                Err(e) => {
                    error!(import_id = %import_id, error = %e, "Cleanup of diagnostic rows failed");
                    cleanup_error = Some(e.to_string());
                }
            }
        }

        let sample = inserted
            .first()
            .map(|row| row.outcome.clone())
            .or_else(|| records.first().cloned());

        Ok(ImportSummary {
            success: true,
            import_id,
            file_name: None,
            file_kind: None,
            policy: policy.clone(),
            sheets,
            records_accepted: records.len(),
            records_inserted: inserted.len(),
            cleaned_up,
            records_deleted,
            cleanup_error,
            sample,
            started_at,
            finished_at: Utc::now(),
        })
    }
}
