use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::domain::curriculum::{CurriculumField, RecordId, StoredOutcome};
use crate::domain::error::Result;
use crate::domain::labels::{learning_area_label, year_level_label};
use crate::infrastructure::store::{CurriculumStore, OutcomeFilter};

const UNSPECIFIED: &str = "Unspecified";

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionReport {
    pub success: bool,
    pub target: String,
    pub record_count: u64,
    /// Columns of the first stored row; empty when the table has no rows
    pub columns: Vec<String>,
    /// Expected columns absent from the first stored row
    pub missing_columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurriculumStats {
    pub success: bool,
    pub total: u64,
    pub by_learning_area: BTreeMap<String, u64>,
    pub by_level: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub learning_area_id: Option<String>,
    pub year_level: Option<String>,
    pub limit: usize,
}

/// Search hit as shown in the planner UI
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOutcome {
    pub id: RecordId,
    pub code: Option<String>,
    pub label: String,
    pub learning_area: String,
    pub subject: String,
    pub year_level: String,
    pub strand: Option<String>,
    pub sub_strand: Option<String>,
    pub description: String,
    pub elaborations: Vec<String>,
    pub achievement_standard: Option<String>,
    pub topics: Vec<String>,
}

impl From<&StoredOutcome> for DisplayOutcome {
    fn from(stored: &StoredOutcome) -> Self {
        let outcome = &stored.outcome;
        let learning_area = learning_area_label(&outcome.learning_area);
        let year_level = year_level_label(&outcome.level);

        let label = [
            Some(learning_area.as_str()),
            Some(year_level.as_str()),
            outcome.strand.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" · ");

        let elaborations = outcome
            .elaboration
            .as_deref()
            .map(|text| {
                text.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id: stored.id.clone(),
            code: outcome.content_descriptor_code.clone(),
            label,
            learning_area,
            subject: outcome.subject.clone(),
            year_level,
            strand: outcome.strand.clone(),
            sub_strand: outcome.sub_strand.clone(),
            description: outcome.content_description.clone(),
            elaborations,
            achievement_standard: outcome.achievement_standard.clone(),
            topics: outcome.topics.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub success: bool,
    pub learning_area: Option<String>,
    pub level: Option<String>,
    pub count: usize,
    /// Legacy flat shape: id plus the populated canonical columns of each
    /// hit. Backend-only columns such as `created_at` are not carried.
    pub outcomes: Vec<StoredOutcome>,
    /// Display-labeled shape
    pub items: Vec<DisplayOutcome>,
}

pub struct CurriculumQueryUseCase {
    store: Arc<dyn CurriculumStore>,
}

impl CurriculumQueryUseCase {
    pub fn new(store: Arc<dyn CurriculumStore>) -> Self {
        Self { store }
    }

    /// Round-trip to the backend and compare the stored columns against the
    /// canonical ones.
    pub async fn validate_connection(&self) -> Result<ConnectionReport> {
        let record_count = self.store.count().await?;
        let first_row = self.store.first_row().await?;

        let (columns, missing_columns) = match first_row {
            Some(row) => {
                let mut columns: Vec<String> = row.keys().cloned().collect();
                columns.sort();
                let missing = std::iter::once("id")
                    .chain(CurriculumField::ALL.iter().map(|f| f.column()))
                    .filter(|column| !row.contains_key(*column))
                    .map(str::to_string)
                    .collect();
                (columns, missing)
            }
            None => (Vec::new(), Vec::new()),
        };

        info!(
            target = self.store.target(),
            records = record_count,
            missing = missing_columns.len(),
            "Validated backend connection"
        );

        Ok(ConnectionReport {
            success: true,
            target: self.store.target().to_string(),
            record_count,
            columns,
            missing_columns,
        })
    }

    pub async fn stats(&self) -> Result<CurriculumStats> {
        let total = self.store.count().await?;
        let facets = self.store.facets().await?;

        let mut by_learning_area: BTreeMap<String, u64> = BTreeMap::new();
        let mut by_level: BTreeMap<String, u64> = BTreeMap::new();
        for facet in facets {
            let learning_area = facet
                .learning_area
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| UNSPECIFIED.to_string());
            let level = facet
                .level
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| UNSPECIFIED.to_string());
            *by_learning_area.entry(learning_area).or_insert(0) += 1;
            *by_level.entry(level).or_insert(0) += 1;
        }

        Ok(CurriculumStats {
            success: true,
            total,
            by_learning_area,
            by_level,
        })
    }

    /// Equality search on learning area and level. Identifiers such as
    /// `hass` or `year-7` are resolved to their stored labels first.
    pub async fn search(&self, params: SearchParams) -> Result<SearchResult> {
        let filter = OutcomeFilter {
            learning_area: params
                .learning_area_id
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(learning_area_label),
            level: params
                .year_level
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(year_level_label),
            limit: params.limit,
        };

        let outcomes = self.store.search(&filter).await?;
        let items = outcomes.iter().map(DisplayOutcome::from).collect();

        Ok(SearchResult {
            success: true,
            learning_area: filter.learning_area,
            level: filter.level,
            count: outcomes.len(),
            outcomes,
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::curriculum::CurriculumOutcome;
    use crate::infrastructure::store::memory::InMemoryStore;

    fn outcome(learning_area: &str, level: &str) -> CurriculumOutcome {
        CurriculumOutcome {
            learning_area: learning_area.to_string(),
            subject: learning_area.to_string(),
            level: level.to_string(),
            content_description: format!("{} at {}", learning_area, level),
            ..Default::default()
        }
    }

    fn query(rows: Vec<CurriculumOutcome>) -> CurriculumQueryUseCase {
        CurriculumQueryUseCase::new(Arc::new(InMemoryStore::with_rows(rows)))
    }

    #[tokio::test]
    async fn test_stats_breakdown() {
        let stats = query(vec![
            outcome("English", "Foundation"),
            outcome("English", "Year 1"),
            outcome("Science", "Year 1"),
            outcome("", ""),
        ])
        .stats()
        .await
        .unwrap();

        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_learning_area["English"], 2);
        assert_eq!(stats.by_learning_area["Science"], 1);
        assert_eq!(stats.by_learning_area[UNSPECIFIED], 1);
        assert_eq!(stats.by_level["Year 1"], 2);
    }

    #[tokio::test]
    async fn test_search_resolves_identifiers() {
        let result = query(vec![
            outcome("English", "Year 7"),
            outcome("English", "Year 8"),
            outcome("Science", "Year 7"),
        ])
        .search(SearchParams {
            learning_area_id: Some("english".to_string()),
            year_level: Some("year-7".to_string()),
            limit: 50,
        })
        .await
        .unwrap();

        assert_eq!(result.count, 1);
        assert_eq!(result.learning_area.as_deref(), Some("English"));
        assert_eq!(result.level.as_deref(), Some("Year 7"));
        assert_eq!(result.items[0].label, "English · Year 7");
        assert_eq!(result.outcomes[0].outcome.level, "Year 7");
    }

    #[tokio::test]
    async fn test_search_without_filters_honours_limit() {
        let result = query(vec![
            outcome("English", "Year 7"),
            outcome("English", "Year 8"),
            outcome("Science", "Year 7"),
        ])
        .search(SearchParams {
            limit: 2,
            ..Default::default()
        })
        .await
        .unwrap();
        assert_eq!(result.count, 2);
        assert!(result.learning_area.is_none());
    }

    #[tokio::test]
    async fn test_validate_reports_missing_columns() {
        let report = query(vec![outcome("English", "Year 7")])
            .validate_connection()
            .await
            .unwrap();
        assert_eq!(report.record_count, 1);
        assert!(report.columns.contains(&"learning_area".to_string()));
        // Optional columns are not serialized for this row, so they show up as missing
        assert!(report.missing_columns.contains(&"pathway".to_string()));
        assert!(!report.missing_columns.contains(&"id".to_string()));
    }

    #[tokio::test]
    async fn test_validate_empty_table() {
        let report = query(Vec::new()).validate_connection().await.unwrap();
        assert_eq!(report.record_count, 0);
        assert!(report.columns.is_empty() && report.missing_columns.is_empty());
    }

    #[test]
    fn test_display_outcome_splits_elaborations() {
        let stored = StoredOutcome {
            id: RecordId::Int(9),
            outcome: CurriculumOutcome {
                learning_area: "hass".to_string(),
                level: "7".to_string(),
                strand: Some("History".to_string()),
                elaboration: Some("first idea\n\n  second idea ".to_string()),
                ..Default::default()
            },
        };
        let display = DisplayOutcome::from(&stored);
        assert_eq!(display.learning_area, "Humanities and Social Sciences");
        assert_eq!(display.year_level, "Year 7");
        assert_eq!(display.elaborations, vec!["first idea", "second idea"]);
        assert_eq!(display.label, "Humanities and Social Sciences · Year 7 · History");
    }
}
