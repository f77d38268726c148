use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{CurriculumStore, OutcomeFacet, OutcomeFilter};
use crate::domain::curriculum::{CurriculumOutcome, RecordId, StoredOutcome};
use crate::domain::error::{AppError, Result};

/// In-process store for tests. Failures can be injected per operation.
#[derive(Default)]
pub struct InMemoryStore {
    rows: Mutex<Vec<StoredOutcome>>,
    next_id: Mutex<i64>,
    insert_failure: Mutex<Option<(String, String)>>,
    delete_failure: Mutex<Option<(String, String)>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(records: Vec<CurriculumOutcome>) -> Self {
        let store = Self::new();
        {
            let mut rows = store.rows.lock().unwrap();
            let mut next_id = store.next_id.lock().unwrap();
            for outcome in records {
                *next_id += 1;
                rows.push(StoredOutcome {
                    id: RecordId::Int(*next_id),
                    outcome,
                });
            }
        }
        store
    }

    pub fn fail_inserts(&self, message: &str, code: &str) {
        *self.insert_failure.lock().unwrap() = Some((message.to_string(), code.to_string()));
    }

    pub fn fail_deletes(&self, message: &str, code: &str) {
        *self.delete_failure.lock().unwrap() = Some((message.to_string(), code.to_string()));
    }

    pub fn rows(&self) -> Vec<StoredOutcome> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl CurriculumStore for InMemoryStore {
    async fn insert_batch(&self, records: &[CurriculumOutcome]) -> Result<Vec<StoredOutcome>> {
        if let Some((message, code)) = self.insert_failure.lock().unwrap().clone() {
            return Err(AppError::persistence(message, Some(code)));
        }

        let mut rows = self.rows.lock().unwrap();
        let mut next_id = self.next_id.lock().unwrap();
        let inserted: Vec<StoredOutcome> = records
            .iter()
            .map(|outcome| {
                *next_id += 1;
                StoredOutcome {
                    id: RecordId::Int(*next_id),
                    outcome: outcome.clone(),
                }
            })
            .collect();
        rows.extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn delete_by_ids(&self, ids: &[RecordId]) -> Result<usize> {
        if let Some((message, code)) = self.delete_failure.lock().unwrap().clone() {
            return Err(AppError::persistence(message, Some(code)));
        }

        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| !ids.contains(&row.id));
        Ok(before - rows.len())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.rows.lock().unwrap().len() as u64)
    }

    async fn facets(&self) -> Result<Vec<OutcomeFacet>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .map(|row| OutcomeFacet {
                learning_area: Some(row.outcome.learning_area.clone()).filter(|v| !v.is_empty()),
                level: Some(row.outcome.level.clone()).filter(|v| !v.is_empty()),
            })
            .collect())
    }

    async fn search(&self, filter: &OutcomeFilter) -> Result<Vec<StoredOutcome>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| {
                filter
                    .learning_area
                    .as_ref()
                    .map_or(true, |v| &row.outcome.learning_area == v)
                    && filter.level.as_ref().map_or(true, |v| &row.outcome.level == v)
            })
            .take(filter.limit)
            .cloned()
            .collect())
    }

    async fn first_row(&self) -> Result<Option<Map<String, Value>>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.first().and_then(|row| match serde_json::to_value(row) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        }))
    }

    fn target(&self) -> &str {
        "memory"
    }
}
