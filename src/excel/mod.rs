//! Módulo `excel`: lectura de la planilla de agenda.
//!
//! Submódulos:
//! - `io`: helpers de lectura de celdas/hojas con calamine
//! - `normalize`: forma canónica de nombres de turma
//! - `agenda`: parser de la planilla en slots de aula

/// Helpers de IO y utilidades para parsing de Excel
pub mod io;

/// Normalización de nombres de turma: `normalize_turma`
pub mod normalize;

/// Parser de la agenda: `parse_agenda_file`, `parse_agenda_rows`
pub mod agenda;

pub use agenda::{parse_agenda_file, parse_agenda_rows, ParseContext, ParsedAgenda, SlotError, SlotResult, ValidSlot};
pub use io::{check_extension, read_sheet, ACCEPTED_EXTENSIONS};
pub use normalize::{course_prefix, normalize_turma};
