// ============================================================
// CURRICULUM STORE
// ============================================================
// Storage collaborator for curriculum outcomes

#[cfg(test)]
pub mod memory;
pub mod postgrest;

pub use postgrest::PostgrestStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::curriculum::{CurriculumOutcome, RecordId, StoredOutcome};
use crate::domain::error::Result;

/// Equality filters for outcome search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutcomeFilter {
    pub learning_area: Option<String>,
    pub level: Option<String>,
    pub limit: usize,
}

/// The two grouping columns of one stored outcome
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeFacet {
    #[serde(default)]
    pub learning_area: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
}

#[async_trait]
pub trait CurriculumStore: Send + Sync {
    /// Insert the whole batch in one call. All rows land or none do.
    async fn insert_batch(&self, records: &[CurriculumOutcome]) -> Result<Vec<StoredOutcome>>;

    /// Delete by backend id, returning how many rows went away.
    async fn delete_by_ids(&self, ids: &[RecordId]) -> Result<usize>;

    async fn count(&self) -> Result<u64>;

    /// `learning_area`/`level` of every stored outcome.
    async fn facets(&self) -> Result<Vec<OutcomeFacet>>;

    async fn search(&self, filter: &OutcomeFilter) -> Result<Vec<StoredOutcome>>;

    /// First row as raw JSON, used to check connectivity and columns.
    async fn first_row(&self) -> Result<Option<Map<String, Value>>>;

    /// Human-readable target, e.g. the table name.
    fn target(&self) -> &str;
}
