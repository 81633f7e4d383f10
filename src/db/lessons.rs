use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::{map_constraint, validate_iso_date};
use crate::db::catalog::{get_course, get_uc};
use crate::error::AppError;
use crate::excel::normalize_turma;
use crate::models::{Lesson, LessonFilter, NewLesson, Period};

const LESSON_COLUMNS: &str = "id, course_id, turma, uc_id, uc_name, period, lab, date, description";

pub(crate) fn lesson_from_row(row: &Row<'_>) -> rusqlite::Result<Lesson> {
    let period_raw: String = row.get(5)?;
    let period = period_raw.parse::<Period>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, e.into())
    })?;
    Ok(Lesson {
        id: row.get(0)?,
        course_id: row.get(1)?,
        turma: row.get(2)?,
        uc_id: row.get(3)?,
        uc_name: row.get(4)?,
        period,
        lab: row.get(6)?,
        date: row.get(7)?,
        description: row.get(8)?,
    })
}

pub fn get_lesson(conn: &Connection, id: i64) -> Result<Lesson, AppError> {
    conn.query_row(
        &format!("SELECT {} FROM lessons WHERE id = ?1", LESSON_COLUMNS),
        params![id],
        lesson_from_row,
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound(format!("lesson {}", id)))
}

/// Aula ocupando el slot `(date, period, turma)`, comparando la turma normalizada.
pub fn find_lesson_by_slot(conn: &Connection, date: &str, period: Period, turma: &str) -> Result<Option<Lesson>, AppError> {
    let wanted = normalize_turma(turma);
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM lessons WHERE date = ?1 AND period = ?2 ORDER BY id",
        LESSON_COLUMNS
    ))?;
    let rows = stmt.query_map(params![date, period.as_str()], lesson_from_row)?;
    for r in rows {
        let lesson = r?;
        if normalize_turma(&lesson.turma) == wanted {
            return Ok(Some(lesson));
        }
    }
    Ok(None)
}

pub fn list_lessons(conn: &Connection, filter: &LessonFilter) -> Result<Vec<Lesson>, AppError> {
    if let Some(from) = &filter.from {
        validate_iso_date(from)?;
    }
    if let Some(to) = &filter.to {
        validate_iso_date(to)?;
    }
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM lessons
         WHERE (?1 IS NULL OR date >= ?1)
           AND (?2 IS NULL OR date <= ?2)
           AND (?3 IS NULL OR course_id = ?3)
           AND (?4 IS NULL OR period = ?4)
         ORDER BY date, period, turma",
        LESSON_COLUMNS
    ))?;
    let period = filter.period.map(|p| p.as_str());
    let rows = stmt.query_map(params![filter.from, filter.to, filter.course_id, period], lesson_from_row)?;
    let turma = filter.turma.as_deref().map(normalize_turma).filter(|t| !t.is_empty());
    let mut out = Vec::new();
    for r in rows {
        let lesson = r?;
        if let Some(t) = &turma {
            if &normalize_turma(&lesson.turma) != t {
                continue;
            }
        }
        out.push(lesson);
    }
    Ok(out)
}

/// Valida la entrada y devuelve (turma normalizada, nombre de la UC).
fn validate_lesson(conn: &Connection, input: &NewLesson) -> Result<(String, String), AppError> {
    validate_iso_date(&input.date)?;
    let turma = normalize_turma(&input.turma);
    if turma.is_empty() {
        return Err(AppError::Validation("turma is required".into()));
    }
    get_course(conn, input.course_id)?;
    let uc = get_uc(conn, input.uc_id)?;
    if uc.course_id != input.course_id {
        return Err(AppError::Validation(format!(
            "uc {} does not belong to course {}",
            uc.id, input.course_id
        )));
    }
    Ok((turma, uc.name))
}

/// Alta manual. Respeta la clave natural `(date, period, turma)`.
pub fn insert_lesson(conn: &Connection, input: &NewLesson) -> Result<Lesson, AppError> {
    let (turma, uc_name) = validate_lesson(conn, input)?;
    if let Some(existing) = find_lesson_by_slot(conn, &input.date, input.period, &turma)? {
        return Err(AppError::Conflict(format!(
            "{} {} already has lesson {} for {}",
            input.date, input.period, existing.id, turma
        )));
    }
    conn.execute(
        "INSERT INTO lessons (course_id, turma, uc_id, uc_name, period, lab, date, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            input.course_id,
            turma,
            input.uc_id,
            uc_name,
            input.period.as_str(),
            input.lab.trim(),
            input.date,
            input.description,
        ],
    )
    .map_err(|e| map_constraint(e, format!("slot {} {} {} is taken", input.date, input.period, turma)))?;
    get_lesson(conn, conn.last_insert_rowid())
}

pub fn update_lesson(conn: &Connection, id: i64, input: &NewLesson) -> Result<Lesson, AppError> {
    get_lesson(conn, id)?;
    let (turma, uc_name) = validate_lesson(conn, input)?;
    if let Some(existing) = find_lesson_by_slot(conn, &input.date, input.period, &turma)? {
        if existing.id != id {
            return Err(AppError::Conflict(format!(
                "{} {} already has lesson {} for {}",
                input.date, input.period, existing.id, turma
            )));
        }
    }
    conn.execute(
        "UPDATE lessons SET course_id = ?1, turma = ?2, uc_id = ?3, uc_name = ?4, period = ?5,
             lab = ?6, date = ?7, description = ?8
         WHERE id = ?9",
        params![
            input.course_id,
            turma,
            input.uc_id,
            uc_name,
            input.period.as_str(),
            input.lab.trim(),
            input.date,
            input.description,
            id,
        ],
    )
    .map_err(|e| map_constraint(e, format!("slot {} {} {} is taken", input.date, input.period, turma)))?;
    get_lesson(conn, id)
}

pub fn delete_lesson(conn: &Connection, id: i64) -> Result<(), AppError> {
    let n = conn.execute("DELETE FROM lessons WHERE id = ?1", params![id])?;
    if n == 0 {
        return Err(AppError::NotFound(format!("lesson {}", id)));
    }
    Ok(())
}
