use rusqlite::TransactionBehavior;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::db::DbPool;
use crate::error::AppError;
use crate::excel::{parse_agenda_file, parse_agenda_rows, ParseContext, ParsedAgenda, SlotResult, ValidSlot};
use crate::import::resolver::resolve_entities;
use crate::import::upsert::{upsert_lesson, UpsertOutcome};
use crate::models::{ImportIssue, ImportReport, ImportedLesson, UpsertAction};

/// Etapa en la que falló un slot válido.
#[derive(Debug)]
pub enum SlotFailure {
    /// No se pudo obtener conexión o abrir/confirmar la transacción.
    Connection(AppError),
    Resolution(AppError),
    Upsert(AppError),
}

impl fmt::Display for SlotFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotFailure::Connection(e) => write!(f, "database unavailable: {}", e),
            SlotFailure::Resolution(e) => write!(f, "could not resolve course/class/uc: {}", e),
            SlotFailure::Upsert(e) => write!(f, "could not save lesson: {}", e),
        }
    }
}

/// Importa una planilla completa.
///
/// Sólo devuelve `Err` si el archivo no se puede leer; los errores por fila
/// o por slot quedan en `ImportReport::details`.
pub fn run_import<P: AsRef<Path>>(pool: &DbPool, path: P, ctx: &ParseContext) -> Result<ImportReport, AppError> {
    let parsed = parse_agenda_file(path, ctx)?;
    Ok(import_parsed(pool, parsed))
}

/// Igual que `run_import` para una hoja ya leída.
pub fn run_import_rows(pool: &DbPool, rows: &[Vec<String>], ctx: &ParseContext) -> ImportReport {
    import_parsed(pool, parse_agenda_rows(rows, ctx))
}

/// Procesa todos los slots en orden, una transacción por slot.
pub fn import_parsed(pool: &DbPool, parsed: ParsedAgenda) -> ImportReport {
    let mut report = ImportReport::default();
    report.stats.total_lines = parsed.total_rows;

    for slot in parsed.slots {
        report.stats.processed += 1;
        match slot {
            SlotResult::Error(e) => {
                debug!(row = e.row, col = ?e.col, error = %e.message, "slot inválido");
                report.stats.errors += 1;
                report.details.push(ImportIssue { row: e.row, col: e.col, raw: e.raw, error: e.message });
            }
            SlotResult::Valid(valid) => match import_slot(pool, &valid) {
                Ok(outcome) => {
                    match outcome.action {
                        UpsertAction::Created => report.stats.created += 1,
                        UpsertAction::Updated => report.stats.updated += 1,
                    }
                    report.lessons.push(ImportedLesson {
                        id: outcome.lesson_id,
                        date: valid.date,
                        period: valid.period,
                        turma: valid.turma,
                        uc: valid.uc,
                        lab: valid.lab,
                        status: outcome.action.as_str().to_string(),
                    });
                }
                Err(failure) => {
                    warn!(row = valid.row, col = valid.col, error = %failure, "slot no importado");
                    report.stats.errors += 1;
                    report.details.push(ImportIssue {
                        row: valid.row,
                        col: Some(valid.col),
                        raw: format!("{} - {} - {}", valid.turma, valid.uc, valid.lab),
                        error: failure.to_string(),
                    });
                }
            },
        }
    }

    report.message = format!(
        "Importação concluída: {} criadas, {} atualizadas, {} erros",
        report.stats.created, report.stats.updated, report.stats.errors
    );
    info!(
        total_lines = report.stats.total_lines,
        processed = report.stats.processed,
        created = report.stats.created,
        updated = report.stats.updated,
        errors = report.stats.errors,
        "importación terminada"
    );
    report
}

/// begin -> resolver -> buscar duplicado -> insertar/actualizar -> commit.
/// Cualquier error antes del commit hace rollback al soltar la transacción.
fn import_slot(pool: &DbPool, slot: &ValidSlot) -> Result<UpsertOutcome, SlotFailure> {
    let mut conn = pool.get().map_err(SlotFailure::Connection)?;
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| SlotFailure::Connection(e.into()))?;

    let resolved = resolve_entities(&tx, &slot.course_prefix, &slot.turma, &slot.uc).map_err(SlotFailure::Resolution)?;
    let outcome = upsert_lesson(&tx, slot, &resolved).map_err(SlotFailure::Upsert)?;

    tx.commit().map_err(|e| SlotFailure::Connection(e.into()))?;
    Ok(outcome)
}
