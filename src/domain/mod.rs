pub mod curriculum;
pub mod error;
pub mod import_policy;
pub mod labels;
pub mod sheet;
