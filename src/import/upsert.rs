use rusqlite::{params, Connection};
use tracing::debug;

use crate::db::lessons::find_lesson_by_slot;
use crate::error::AppError;
use crate::excel::ValidSlot;
use crate::import::resolver::ResolvedEntities;
use crate::models::UpsertAction;

pub const IMPORT_CREATED_DESCRIPTION: &str = "Importado via planilha";
pub const IMPORT_UPDATED_DESCRIPTION: &str = "Atualizado via importação";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub lesson_id: i64,
    pub action: UpsertAction,
}

/// Inserta o actualiza la aula del slot `(date, period, turma)`.
///
/// Si ya hay una aula en ese slot se sobrescriben curso, UC, laboratorio y
/// descripción (y la turma queda en su forma normalizada); si no, se inserta.
/// Corre dentro de la misma transacción que `resolve_entities`.
pub fn upsert_lesson(conn: &Connection, slot: &ValidSlot, resolved: &ResolvedEntities) -> Result<UpsertOutcome, AppError> {
    match find_lesson_by_slot(conn, &slot.date, slot.period, &resolved.turma)? {
        Some(existing) => {
            conn.execute(
                "UPDATE lessons SET course_id = ?1, turma = ?2, uc_id = ?3, uc_name = ?4, lab = ?5, description = ?6
                 WHERE id = ?7",
                params![
                    resolved.course_id,
                    resolved.turma,
                    resolved.uc.id,
                    resolved.uc.name,
                    slot.lab,
                    IMPORT_UPDATED_DESCRIPTION,
                    existing.id,
                ],
            )?;
            debug!(lesson_id = existing.id, date = %slot.date, period = %slot.period, turma = %resolved.turma, "aula actualizada");
            Ok(UpsertOutcome { lesson_id: existing.id, action: UpsertAction::Updated })
        }
        None => {
            conn.execute(
                "INSERT INTO lessons (course_id, turma, uc_id, uc_name, period, lab, date, description)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    resolved.course_id,
                    resolved.turma,
                    resolved.uc.id,
                    resolved.uc.name,
                    slot.period.as_str(),
                    slot.lab,
                    slot.date,
                    IMPORT_CREATED_DESCRIPTION,
                ],
            )?;
            let id = conn.last_insert_rowid();
            debug!(lesson_id = id, date = %slot.date, period = %slot.period, turma = %resolved.turma, "aula creada");
            Ok(UpsertOutcome { lesson_id: id, action: UpsertAction::Created })
        }
    }
}
