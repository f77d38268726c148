// ============================================================
// RECORD NORMALIZER
// ============================================================
// One raw spreadsheet row -> zero or one curriculum outcome

use crate::domain::curriculum::{CurriculumField, CurriculumOutcome};
use crate::domain::sheet::Cell;

use super::field_mapping::HeaderIndex;
use super::keyword_extractor::{extract_keywords, keyword_text, merge_topics, MAX_TOPICS};

/// Normalizer bound to one sheet's header row.
pub struct RecordNormalizer {
    index: HeaderIndex,
}

impl RecordNormalizer {
    pub fn new(header: &[Cell]) -> Self {
        Self {
            index: HeaderIndex::new(header),
        }
    }

    pub fn header_index(&self) -> &HeaderIndex {
        &self.index
    }

    /// Map a row. Returns `None` when no recognized column carried a value;
    /// anything else is kept, however sparse.
    pub fn normalize(&self, row: &[Cell]) -> Option<CurriculumOutcome> {
        let mut outcome = CurriculumOutcome::default();

        for (column, field) in &self.index.columns {
            let Some(value) = cell_value(row.get(*column)) else {
                continue;
            };

            if *field == CurriculumField::Topics {
                outcome.topics = value
                    .split(';')
                    .map(str::trim)
                    .filter(|topic| !topic.is_empty())
                    .map(str::to_string)
                    .collect();
            } else {
                outcome.set(*field, value);
            }
        }

        // Author topics alone are enough to keep the row
        if outcome.is_empty() {
            return None;
        }

        if outcome.subject.is_empty() && !outcome.learning_area.is_empty() {
            outcome.subject = outcome.learning_area.clone();
        }

        let keywords = extract_keywords(&keyword_text(&outcome), MAX_TOPICS);
        let author_topics = std::mem::take(&mut outcome.topics);
        outcome.topics = merge_topics(author_topics, keywords);
        Some(outcome)
    }
}

/// Trimmed cell text, or `None` for missing, blank, `"undefined"` and `"null"` cells.
fn cell_value(cell: Option<&Cell>) -> Option<String> {
    let text = cell?.to_text();
    let trimmed = text.trim();
    match trimmed {
        "" | "undefined" | "null" => None,
        value => Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<Cell> {
        values.iter().map(|v| Cell::from(*v)).collect()
    }

    #[test]
    fn test_end_to_end_english_row() {
        let normalizer = RecordNormalizer::new(&cells(&[
            "Learning Area",
            "Subject",
            "Level",
            "Content Description",
        ]));
        let outcome = normalizer
            .normalize(&cells(&[
                "English",
                "English",
                "Foundation",
                "Understand that English is one of many languages spoken in Australia",
            ]))
            .expect("row kept");

        assert_eq!(outcome.learning_area, "English");
        assert_eq!(outcome.subject, "English");
        assert_eq!(outcome.level, "Foundation");
        assert_eq!(
            outcome.content_description,
            "Understand that English is one of many languages spoken in Australia"
        );
        for expected in ["english", "languages", "spoken", "australia", "understand"] {
            assert!(outcome.topics.contains(&expected.to_string()), "missing {expected}");
        }
        assert!(!outcome.topics.contains(&"that".to_string()));
        assert!(outcome.topics.len() <= MAX_TOPICS);
    }

    #[test]
    fn test_header_case_and_whitespace_insensitive() {
        for header in [" Learning Area ", "LEARNING AREA", "learning area"] {
            let normalizer = RecordNormalizer::new(&cells(&[header]));
            let outcome = normalizer.normalize(&cells(&["Science"])).unwrap();
            assert_eq!(outcome.learning_area, "Science");
        }
    }

    #[test]
    fn test_subject_defaults_to_learning_area() {
        let normalizer = RecordNormalizer::new(&cells(&["Learning Area", "Level"]));
        let outcome = normalizer.normalize(&cells(&["Science", "Year 4"])).unwrap();
        assert_eq!(outcome.subject, "Science");
    }

    #[test]
    fn test_pathway_only_row_is_kept() {
        let normalizer = RecordNormalizer::new(&cells(&["Learning Area", "Pathway", "Level"]));
        let outcome = normalizer.normalize(&cells(&["", "Sequence 1", ""])).unwrap();
        assert_eq!(outcome.pathway.as_deref(), Some("Sequence 1"));
        assert!(outcome.learning_area.is_empty());
        assert!(outcome.topics.is_empty());
    }

    #[test]
    fn test_row_without_mapped_content_is_dropped() {
        let normalizer = RecordNormalizer::new(&cells(&["Learning Area", "Planning Notes"]));
        assert!(normalizer.normalize(&cells(&["  ", "remember the excursion"])).is_none());
        assert!(normalizer.normalize(&cells(&["undefined"])).is_none());
        assert!(normalizer.normalize(&cells(&["null", "x"])).is_none());
        assert!(normalizer.normalize(&[]).is_none());
    }

    #[test]
    fn test_values_are_trimmed() {
        let normalizer = RecordNormalizer::new(&cells(&["Strand"]));
        let outcome = normalizer.normalize(&cells(&["  Number  "])).unwrap();
        assert_eq!(outcome.strand.as_deref(), Some("Number"));
    }

    #[test]
    fn test_numeric_cells_are_stringified() {
        let normalizer = RecordNormalizer::new(&cells(&["Level"]));
        let outcome = normalizer.normalize(&[Cell::Number(7.0)]).unwrap();
        assert_eq!(outcome.level, "7");
    }

    #[test]
    fn test_author_topics_lead_and_total_is_capped() {
        let normalizer = RecordNormalizer::new(&cells(&["Topics", "Description"]));
        let description = (1..=30)
            .map(|i| format!("keyword{:02}", i))
            .collect::<Vec<_>>()
            .join(" ");
        let outcome = normalizer
            .normalize(&cells(&[" Poetry ; ;Drama", &description]))
            .unwrap();

        assert_eq!(outcome.topics.len(), 10);
        assert_eq!(outcome.topics[0], "Poetry");
        assert_eq!(outcome.topics[1], "Drama");
        assert_eq!(outcome.topics[2], "keyword01");
        assert_eq!(outcome.topics[9], "keyword08");
    }

    #[test]
    fn test_stop_words_and_short_tokens_never_become_topics() {
        let normalizer = RecordNormalizer::new(&cells(&["Content Description"]));
        let outcome = normalizer
            .normalize(&cells(&["Draw the cat with curriculum crayons"]))
            .unwrap();
        assert!(outcome.topics.contains(&"curriculum".to_string()));
        assert!(!outcome.topics.contains(&"with".to_string()));
        assert!(!outcome.topics.contains(&"cat".to_string()));
    }

    #[test]
    fn test_separator_only_topics_cell_is_not_content() {
        let normalizer = RecordNormalizer::new(&cells(&["Topics", "Level"]));
        assert!(normalizer.normalize(&cells(&[" ; ;", ""])).is_none());
    }

    #[test]
    fn test_topics_cell_alone_counts_as_content() {
        let normalizer = RecordNormalizer::new(&cells(&["Topics"]));
        let outcome = normalizer.normalize(&cells(&["Fractions"])).unwrap();
        assert_eq!(outcome.topics, vec!["Fractions"]);
    }
}
