use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Canonical curriculum-outcome columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurriculumField {
    LearningArea,
    Subject,
    Level,
    ContentDescription,
    Strand,
    SubStrand,
    Elaboration,
    AchievementStandard,
    ContentDescriptorCode,
    CrossCurriculumPriority,
    GeneralCapability,
    Pathway,
    Sequence,
    LevelDescription,
    Description,
    OrganisingIdeasTitle,
    OrganisingIdeaIndicator,
    Element,
    SubElement,
    Indicator,
    Topics,
}

impl CurriculumField {
    pub const ALL: [CurriculumField; 21] = [
        CurriculumField::LearningArea,
        CurriculumField::Subject,
        CurriculumField::Level,
        CurriculumField::ContentDescription,
        CurriculumField::Strand,
        CurriculumField::SubStrand,
        CurriculumField::Elaboration,
        CurriculumField::AchievementStandard,
        CurriculumField::ContentDescriptorCode,
        CurriculumField::CrossCurriculumPriority,
        CurriculumField::GeneralCapability,
        CurriculumField::Pathway,
        CurriculumField::Sequence,
        CurriculumField::LevelDescription,
        CurriculumField::Description,
        CurriculumField::OrganisingIdeasTitle,
        CurriculumField::OrganisingIdeaIndicator,
        CurriculumField::Element,
        CurriculumField::SubElement,
        CurriculumField::Indicator,
        CurriculumField::Topics,
    ];

    /// Column name in the backing table.
    pub fn column(&self) -> &'static str {
        match self {
            CurriculumField::LearningArea => "learning_area",
            CurriculumField::Subject => "subject",
            CurriculumField::Level => "level",
            CurriculumField::ContentDescription => "content_description",
            CurriculumField::Strand => "strand",
            CurriculumField::SubStrand => "sub_strand",
            CurriculumField::Elaboration => "elaboration",
            CurriculumField::AchievementStandard => "achievement_standard",
            CurriculumField::ContentDescriptorCode => "content_descriptor_code",
            CurriculumField::CrossCurriculumPriority => "cross_curriculum_priority",
            CurriculumField::GeneralCapability => "general_capability",
            CurriculumField::Pathway => "pathway",
            CurriculumField::Sequence => "sequence",
            CurriculumField::LevelDescription => "level_description",
            CurriculumField::Description => "description",
            CurriculumField::OrganisingIdeasTitle => "organising_ideas_title",
            CurriculumField::OrganisingIdeaIndicator => "organising_idea_indicator",
            CurriculumField::Element => "element",
            CurriculumField::SubElement => "sub_element",
            CurriculumField::Indicator => "indicator",
            CurriculumField::Topics => "topics",
        }
    }
}

impl fmt::Display for CurriculumField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A curriculum outcome as persisted. The four conventional columns are
/// plain strings and are left off the wire when empty, so a partially
/// populated row inserts exactly the columns it carried.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurriculumOutcome {
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub learning_area: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub subject: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub level: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub content_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_strand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elaboration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub achievement_standard: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_descriptor_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_curriculum_priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general_capability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pathway: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organising_ideas_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organising_idea_indicator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_element: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicator: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub topics: Vec<String>,
}

impl CurriculumOutcome {
    fn slot(&mut self, field: CurriculumField) -> Option<&mut Option<String>> {
        let slot = match field {
            CurriculumField::Strand => &mut self.strand,
            CurriculumField::SubStrand => &mut self.sub_strand,
            CurriculumField::Elaboration => &mut self.elaboration,
            CurriculumField::AchievementStandard => &mut self.achievement_standard,
            CurriculumField::ContentDescriptorCode => &mut self.content_descriptor_code,
            CurriculumField::CrossCurriculumPriority => &mut self.cross_curriculum_priority,
            CurriculumField::GeneralCapability => &mut self.general_capability,
            CurriculumField::Pathway => &mut self.pathway,
            CurriculumField::Sequence => &mut self.sequence,
            CurriculumField::LevelDescription => &mut self.level_description,
            CurriculumField::Description => &mut self.description,
            CurriculumField::OrganisingIdeasTitle => &mut self.organising_ideas_title,
            CurriculumField::OrganisingIdeaIndicator => &mut self.organising_idea_indicator,
            CurriculumField::Element => &mut self.element,
            CurriculumField::SubElement => &mut self.sub_element,
            CurriculumField::Indicator => &mut self.indicator,
            _ => return None,
        };
        Some(slot)
    }

    /// Assign a text field. `Topics` is not a text field and is ignored here.
    pub fn set(&mut self, field: CurriculumField, value: String) {
        match field {
            CurriculumField::LearningArea => self.learning_area = value,
            CurriculumField::Subject => self.subject = value,
            CurriculumField::Level => self.level = value,
            CurriculumField::ContentDescription => self.content_description = value,
            CurriculumField::Topics => {}
            other => {
                if let Some(slot) = self.slot(other) {
                    *slot = Some(value);
                }
            }
        }
    }

    pub fn get(&self, field: CurriculumField) -> Option<&str> {
        let value = match field {
            CurriculumField::LearningArea => Some(self.learning_area.as_str()),
            CurriculumField::Subject => Some(self.subject.as_str()),
            CurriculumField::Level => Some(self.level.as_str()),
            CurriculumField::ContentDescription => Some(self.content_description.as_str()),
            CurriculumField::Strand => self.strand.as_deref(),
            CurriculumField::SubStrand => self.sub_strand.as_deref(),
            CurriculumField::Elaboration => self.elaboration.as_deref(),
            CurriculumField::AchievementStandard => self.achievement_standard.as_deref(),
            CurriculumField::ContentDescriptorCode => self.content_descriptor_code.as_deref(),
            CurriculumField::CrossCurriculumPriority => self.cross_curriculum_priority.as_deref(),
            CurriculumField::GeneralCapability => self.general_capability.as_deref(),
            CurriculumField::Pathway => self.pathway.as_deref(),
            CurriculumField::Sequence => self.sequence.as_deref(),
            CurriculumField::LevelDescription => self.level_description.as_deref(),
            CurriculumField::Description => self.description.as_deref(),
            CurriculumField::OrganisingIdeasTitle => self.organising_ideas_title.as_deref(),
            CurriculumField::OrganisingIdeaIndicator => self.organising_idea_indicator.as_deref(),
            CurriculumField::Element => self.element.as_deref(),
            CurriculumField::SubElement => self.sub_element.as_deref(),
            CurriculumField::Indicator => self.indicator.as_deref(),
            CurriculumField::Topics => None,
        };
        value.filter(|v| !v.is_empty())
    }

    /// Number of populated fields, topics included.
    pub fn populated_fields(&self) -> usize {
        CurriculumField::ALL
            .iter()
            .filter(|field| match field {
                CurriculumField::Topics => !self.topics.is_empty(),
                other => self.get(**other).is_some(),
            })
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.populated_fields() == 0
    }
}

/// Backend-generated key; integer or text depending on the table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{}", id),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredOutcome {
    pub id: RecordId,
    #[serde(flatten)]
    pub outcome: CurriculumOutcome,
}
