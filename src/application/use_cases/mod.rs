pub mod curriculum_import;
pub mod curriculum_query;
pub mod field_mapping;
pub mod keyword_extractor;
pub mod record_normalizer;
