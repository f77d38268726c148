// ============================================================
// FIELD MAPPING
// ============================================================
// Spreadsheet header text -> canonical curriculum field

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::domain::curriculum::CurriculumField;
use crate::domain::sheet::Cell;

/// Header spellings seen in curriculum exports, in normalized form.
/// Canonical column names are added on top of these.
const HEADER_ALIASES: &[(&str, CurriculumField)] = &[
    ("learning area", CurriculumField::LearningArea),
    ("subject", CurriculumField::Subject),
    ("subject name", CurriculumField::Subject),
    ("level", CurriculumField::Level),
    ("year level", CurriculumField::Level),
    ("year", CurriculumField::Level),
    ("content description", CurriculumField::ContentDescription),
    ("content descriptions", CurriculumField::ContentDescription),
    ("strand", CurriculumField::Strand),
    ("sub-strand", CurriculumField::SubStrand),
    ("sub strand", CurriculumField::SubStrand),
    ("substrand", CurriculumField::SubStrand),
    ("elaboration", CurriculumField::Elaboration),
    ("elaborations", CurriculumField::Elaboration),
    ("content elaboration", CurriculumField::Elaboration),
    ("content elaborations", CurriculumField::Elaboration),
    ("achievement standard", CurriculumField::AchievementStandard),
    ("content descriptor code", CurriculumField::ContentDescriptorCode),
    ("content description code", CurriculumField::ContentDescriptorCode),
    ("code", CurriculumField::ContentDescriptorCode),
    ("cross-curriculum priority", CurriculumField::CrossCurriculumPriority),
    ("cross-curriculum priorities", CurriculumField::CrossCurriculumPriority),
    ("cross curriculum priority", CurriculumField::CrossCurriculumPriority),
    ("cross curriculum priorities", CurriculumField::CrossCurriculumPriority),
    ("general capability", CurriculumField::GeneralCapability),
    ("general capabilities", CurriculumField::GeneralCapability),
    ("pathway", CurriculumField::Pathway),
    ("sequence", CurriculumField::Sequence),
    ("level description", CurriculumField::LevelDescription),
    ("description", CurriculumField::Description),
    ("organising ideas title", CurriculumField::OrganisingIdeasTitle),
    ("organising idea indicator", CurriculumField::OrganisingIdeaIndicator),
    ("element", CurriculumField::Element),
    ("sub-element", CurriculumField::SubElement),
    ("sub element", CurriculumField::SubElement),
    ("indicator", CurriculumField::Indicator),
    ("topics", CurriculumField::Topics),
];

static FIELD_MAP: Lazy<HashMap<&'static str, CurriculumField>> = Lazy::new(|| {
    let mut map: HashMap<&'static str, CurriculumField> = CurriculumField::ALL
        .iter()
        .map(|field| (field.column(), *field))
        .collect();
    map.extend(HEADER_ALIASES.iter().copied());
    map
});

pub fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Canonical field for a header cell, if the header is recognized.
pub fn lookup_field(raw_header: &str) -> Option<CurriculumField> {
    FIELD_MAP.get(normalize_header(raw_header).as_str()).copied()
}

/// Header row resolved once per sheet.
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    /// (column index, field) for every recognized header, left to right
    pub columns: Vec<(usize, CurriculumField)>,
    pub mapped: Vec<String>,
    pub unmapped: Vec<String>,
}

impl HeaderIndex {
    pub fn new(header: &[Cell]) -> Self {
        let mut index = HeaderIndex::default();
        for (column, cell) in header.iter().enumerate() {
            let normalized = normalize_header(&cell.to_text());
            if normalized.is_empty() {
                continue;
            }
            match lookup_field(&normalized) {
                Some(field) => {
                    index.columns.push((column, field));
                    index.mapped.push(normalized);
                }
                None => index.unmapped.push(normalized),
            }
        }
        index
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
