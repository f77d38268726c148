pub mod use_cases;

pub use use_cases::curriculum_import::CurriculumImportUseCase;
pub use use_cases::curriculum_query::CurriculumQueryUseCase;
