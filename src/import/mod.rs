//! Pipeline de importación: planilla -> slots -> entidades -> aulas.

pub mod resolver;
pub mod upsert;
pub mod orchestrator;

pub use orchestrator::{import_parsed, run_import, run_import_rows, SlotFailure};
pub use resolver::{course_name_for_prefix, resolve_entities, ResolvedEntities, ResolvedUc};
pub use upsert::{upsert_lesson, UpsertOutcome, IMPORT_CREATED_DESCRIPTION, IMPORT_UPDATED_DESCRIPTION};
