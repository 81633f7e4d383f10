//! Datos de referencia: cursos, turmas y UCs.
//!
//! Las funciones `find_*` son las mismas que usa el resolver de la
//! importación, así el alta manual y la importación convergen en las mismas
//! reglas de identidad.

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::db::map_constraint;
use crate::error::AppError;
use crate::excel::normalize_turma;
use crate::models::{Course, NewCourse, NewTurma, NewUc, Turma, Uc};

fn course_from_row(row: &Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course { id: row.get(0)?, name: row.get(1)?, acronym: row.get(2)? })
}

fn turma_from_row(row: &Row<'_>) -> rusqlite::Result<Turma> {
    Ok(Turma { id: row.get(0)?, name: row.get(1)?, course_id: row.get(2)? })
}

fn uc_from_row(row: &Row<'_>) -> rusqlite::Result<Uc> {
    Ok(Uc {
        id: row.get(0)?,
        name: row.get(1)?,
        desc: row.get(2)?,
        hours: row.get(3)?,
        course_id: row.get(4)?,
    })
}

// --- cursos ---

pub fn list_courses(conn: &Connection) -> Result<Vec<Course>, AppError> {
    let mut stmt = conn.prepare("SELECT id, name, acronym FROM courses ORDER BY name")?;
    let rows = stmt.query_map([], course_from_row)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn get_course(conn: &Connection, id: i64) -> Result<Course, AppError> {
    conn.query_row("SELECT id, name, acronym FROM courses WHERE id = ?1", params![id], course_from_row)
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("course {}", id)))
}

pub fn find_course_by_name(conn: &Connection, name: &str) -> Result<Option<Course>, AppError> {
    Ok(conn
        .query_row("SELECT id, name, acronym FROM courses WHERE name = ?1", params![name], course_from_row)
        .optional()?)
}

pub fn find_course_by_acronym(conn: &Connection, acronym: &str) -> Result<Option<Course>, AppError> {
    Ok(conn
        .query_row("SELECT id, name, acronym FROM courses WHERE acronym = ?1", params![acronym], course_from_row)
        .optional()?)
}

fn validate_course(input: &NewCourse) -> Result<(String, String), AppError> {
    let name = input.name.trim().to_string();
    let acronym = input.acronym.trim().to_uppercase();
    if name.is_empty() || acronym.is_empty() {
        return Err(AppError::Validation("course name and acronym are required".into()));
    }
    Ok((name, acronym))
}

pub fn insert_course(conn: &Connection, input: &NewCourse) -> Result<Course, AppError> {
    let (name, acronym) = validate_course(input)?;
    conn.execute("INSERT INTO courses (name, acronym) VALUES (?1, ?2)", params![name, acronym])
        .map_err(|e| map_constraint(e, format!("course acronym '{}' already exists", acronym)))?;
    get_course(conn, conn.last_insert_rowid())
}

pub fn update_course(conn: &Connection, id: i64, input: &NewCourse) -> Result<Course, AppError> {
    let (name, acronym) = validate_course(input)?;
    let n = conn
        .execute("UPDATE courses SET name = ?1, acronym = ?2 WHERE id = ?3", params![name, acronym, id])
        .map_err(|e| map_constraint(e, format!("course acronym '{}' already exists", acronym)))?;
    if n == 0 {
        return Err(AppError::NotFound(format!("course {}", id)));
    }
    get_course(conn, id)
}

pub fn delete_course(conn: &Connection, id: i64) -> Result<(), AppError> {
    let n = conn
        .execute("DELETE FROM courses WHERE id = ?1", params![id])
        .map_err(|e| map_constraint(e, format!("course {} is still referenced", id)))?;
    if n == 0 {
        return Err(AppError::NotFound(format!("course {}", id)));
    }
    Ok(())
}

// --- turmas ---

pub fn list_turmas(conn: &Connection, course_id: Option<i64>) -> Result<Vec<Turma>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, course_id FROM turmas WHERE (?1 IS NULL OR course_id = ?1) ORDER BY name",
    )?;
    let rows = stmt.query_map(params![course_id], turma_from_row)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn get_turma(conn: &Connection, id: i64) -> Result<Turma, AppError> {
    conn.query_row("SELECT id, name, course_id FROM turmas WHERE id = ?1", params![id], turma_from_row)
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("class {}", id)))
}

/// Busca la turma del curso cuyo nombre normalizado coincide con `name`.
///
/// Se traen todas las turmas del curso y se comparan normalizadas: filas
/// antiguas pueden estar guardadas sin normalizar.
pub fn find_turma_by_normalized_name(conn: &Connection, course_id: i64, name: &str) -> Result<Option<Turma>, AppError> {
    let wanted = normalize_turma(name);
    let turmas = list_turmas(conn, Some(course_id))?;
    Ok(turmas.into_iter().find(|t| normalize_turma(&t.name) == wanted))
}

fn validate_turma(conn: &Connection, input: &NewTurma) -> Result<String, AppError> {
    let name = normalize_turma(&input.name);
    if name.is_empty() {
        return Err(AppError::Validation("class name is required".into()));
    }
    get_course(conn, input.course_id)?;
    Ok(name)
}

pub fn insert_turma(conn: &Connection, input: &NewTurma) -> Result<Turma, AppError> {
    let name = validate_turma(conn, input)?;
    if let Some(existing) = find_turma_by_normalized_name(conn, input.course_id, &name)? {
        return Err(AppError::Conflict(format!(
            "class '{}' already exists in course {} (id {})",
            name, input.course_id, existing.id
        )));
    }
    conn.execute("INSERT INTO turmas (name, course_id) VALUES (?1, ?2)", params![name, input.course_id])
        .map_err(|e| map_constraint(e, format!("class '{}' already exists", name)))?;
    get_turma(conn, conn.last_insert_rowid())
}

/// Renombra la turma y, en la misma transacción, sus aulas (`lessons.turma`).
pub fn update_turma(conn: &Connection, id: i64, input: &NewTurma) -> Result<Turma, AppError> {
    let name = validate_turma(conn, input)?;
    let current = get_turma(conn, id)?;
    if let Some(existing) = find_turma_by_normalized_name(conn, input.course_id, &name)? {
        if existing.id != id {
            return Err(AppError::Conflict(format!("class '{}' already exists (id {})", name, existing.id)));
        }
    }

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "UPDATE turmas SET name = ?1, course_id = ?2 WHERE id = ?3",
        params![name, input.course_id, id],
    )
    .map_err(|e| map_constraint(e, format!("class '{}' already exists", name)))?;
    let renamed = rename_lesson_turma(&tx, current.course_id, &current.name, &name)?;
    tx.commit()?;

    if renamed > 0 {
        debug!(turma_id = id, from = %current.name, to = %name, lessons = renamed, "aulas renombradas");
    }
    get_turma(conn, id)
}

/// Copia `new` en `lessons.turma` para las aulas del curso cuya turma
/// normalizada es `old` (las filas antiguas pueden no estar normalizadas).
fn rename_lesson_turma(conn: &Connection, course_id: i64, old: &str, new: &str) -> Result<usize, AppError> {
    let old = normalize_turma(old);
    let mut ids: Vec<i64> = Vec::new();
    {
        let mut stmt = conn.prepare("SELECT id, turma FROM lessons WHERE course_id = ?1")?;
        let rows = stmt.query_map(params![course_id], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?)))?;
        for r in rows {
            let (lesson_id, turma) = r?;
            if normalize_turma(&turma) == old {
                ids.push(lesson_id);
            }
        }
    }
    for lesson_id in &ids {
        conn.execute("UPDATE lessons SET turma = ?1 WHERE id = ?2", params![new, lesson_id])
            .map_err(|e| map_constraint(e, format!("lesson {} clashes with an existing '{}' slot", lesson_id, new)))?;
    }
    Ok(ids.len())
}

pub fn delete_turma(conn: &Connection, id: i64) -> Result<(), AppError> {
    let n = conn.execute("DELETE FROM turmas WHERE id = ?1", params![id])?;
    if n == 0 {
        return Err(AppError::NotFound(format!("class {}", id)));
    }
    Ok(())
}

// --- UCs ---

pub fn list_ucs(conn: &Connection, course_id: Option<i64>) -> Result<Vec<Uc>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, description, hours, course_id FROM ucs
         WHERE (?1 IS NULL OR course_id = ?1) ORDER BY name",
    )?;
    let rows = stmt.query_map(params![course_id], uc_from_row)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn get_uc(conn: &Connection, id: i64) -> Result<Uc, AppError> {
    conn.query_row(
        "SELECT id, name, description, hours, course_id FROM ucs WHERE id = ?1",
        params![id],
        uc_from_row,
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound(format!("uc {}", id)))
}

pub fn find_uc(conn: &Connection, name: &str, course_id: i64) -> Result<Option<Uc>, AppError> {
    Ok(conn
        .query_row(
            "SELECT id, name, description, hours, course_id FROM ucs WHERE name = ?1 AND course_id = ?2",
            params![name, course_id],
            uc_from_row,
        )
        .optional()?)
}

fn validate_uc(conn: &Connection, input: &NewUc) -> Result<String, AppError> {
    // mismo código canónico que produce la importación ("UC 12" -> "UC12")
    let name = normalize_turma(&input.name);
    if name.is_empty() {
        return Err(AppError::Validation("uc name is required".into()));
    }
    if input.hours < 0 {
        return Err(AppError::Validation("uc hours cannot be negative".into()));
    }
    get_course(conn, input.course_id)?;
    Ok(name)
}

pub fn insert_uc(conn: &Connection, input: &NewUc) -> Result<Uc, AppError> {
    let name = validate_uc(conn, input)?;
    conn.execute(
        "INSERT INTO ucs (name, description, hours, course_id) VALUES (?1, ?2, ?3, ?4)",
        params![name, input.desc.trim(), input.hours, input.course_id],
    )
    .map_err(|e| map_constraint(e, format!("uc '{}' already exists in course {}", name, input.course_id)))?;
    get_uc(conn, conn.last_insert_rowid())
}

/// Actualiza la UC y mantiene sincronizado `lessons.uc_name`.
pub fn update_uc(conn: &Connection, id: i64, input: &NewUc) -> Result<Uc, AppError> {
    let name = validate_uc(conn, input)?;
    let tx = conn.unchecked_transaction()?;
    let n = tx
        .execute(
            "UPDATE ucs SET name = ?1, description = ?2, hours = ?3, course_id = ?4 WHERE id = ?5",
            params![name, input.desc.trim(), input.hours, input.course_id, id],
        )
        .map_err(|e| map_constraint(e, format!("uc '{}' already exists in course {}", name, input.course_id)))?;
    if n == 0 {
        return Err(AppError::NotFound(format!("uc {}", id)));
    }
    tx.execute("UPDATE lessons SET uc_name = ?1 WHERE uc_id = ?2", params![name, id])?;
    tx.commit()?;
    get_uc(conn, id)
}

pub fn delete_uc(conn: &Connection, id: i64) -> Result<(), AppError> {
    let n = conn
        .execute("DELETE FROM ucs WHERE id = ?1", params![id])
        .map_err(|e| map_constraint(e, format!("uc {} is still referenced by lessons", id)))?;
    if n == 0 {
        return Err(AppError::NotFound(format!("uc {}", id)));
    }
    Ok(())
}
