use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::db::catalog::{find_course_by_acronym, find_course_by_name, find_turma_by_normalized_name, find_uc};
use crate::error::AppError;
use crate::excel::normalize_turma;

/// Prefijo de turma -> nombre completo del curso.
pub const COURSE_NAMES: &[(&str, &str)] = &[
    ("TI", "Técnico em Informática"),
    ("ADM", "Técnico em Administração"),
    ("ENF", "Técnico em Enfermagem"),
    ("ELE", "Técnico em Eletrotécnica"),
    ("MEC", "Técnico em Mecânica"),
    ("LOG", "Técnico em Logística"),
    ("SEG", "Técnico em Segurança do Trabalho"),
    ("DS", "Técnico em Desenvolvimento de Sistemas"),
];

pub fn course_name_for_prefix(prefix: &str) -> String {
    let prefix = prefix.trim().to_uppercase();
    COURSE_NAMES
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| format!("Curso Importado ({})", prefix))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUc {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntities {
    pub course_id: i64,
    pub turma_id: i64,
    /// Nombre normalizado; es el que se copia en `lessons.turma`.
    pub turma: String,
    pub uc: ResolvedUc,
}

/// Busca o crea curso, turma y UC para un slot.
///
/// Debe llamarse dentro de la transacción del slot: si algo falla, el
/// rollback deshace también las entidades creadas aquí.
pub fn resolve_entities(conn: &Connection, prefix: &str, turma: &str, uc_code: &str) -> Result<ResolvedEntities, AppError> {
    let turma = normalize_turma(turma);
    let uc_code = normalize_turma(uc_code);
    if turma.is_empty() || uc_code.is_empty() {
        return Err(AppError::Validation("turma and uc are required".into()));
    }

    let course_id = resolve_course(conn, prefix)?;
    let turma_id = resolve_turma(conn, course_id, &turma)?;
    let uc = resolve_uc(conn, course_id, &uc_code)?;

    Ok(ResolvedEntities { course_id, turma_id, turma, uc })
}

fn resolve_course(conn: &Connection, prefix: &str) -> Result<i64, AppError> {
    let acronym = prefix.trim().to_uppercase();
    if acronym.is_empty() {
        return Err(AppError::Validation("course prefix is empty".into()));
    }
    let name = course_name_for_prefix(&acronym);
    if let Some(c) = find_course_by_name(conn, &name)? {
        return Ok(c.id);
    }

    let inserted: Option<i64> = conn
        .query_row(
            "INSERT INTO courses (name, acronym) VALUES (?1, ?2)
             ON CONFLICT(acronym) DO NOTHING RETURNING id",
            params![name, acronym],
            |r| r.get(0),
        )
        .optional()?;
    if let Some(id) = inserted {
        debug!(course_id = id, %name, %acronym, "curso creado");
        return Ok(id);
    }

    // Otro curso (p. ej. creado a mano con otro nombre) ya tiene la sigla
    find_course_by_acronym(conn, &acronym)?
        .map(|c| c.id)
        .ok_or_else(|| AppError::Internal(format!("course '{}' vanished after conflict", acronym)))
}

fn resolve_turma(conn: &Connection, course_id: i64, turma: &str) -> Result<i64, AppError> {
    if let Some(t) = find_turma_by_normalized_name(conn, course_id, turma)? {
        return Ok(t.id);
    }

    let inserted: Option<i64> = conn
        .query_row(
            "INSERT INTO turmas (name, course_id) VALUES (?1, ?2)
             ON CONFLICT(course_id, name) DO NOTHING RETURNING id",
            params![turma, course_id],
            |r| r.get(0),
        )
        .optional()?;
    if let Some(id) = inserted {
        debug!(turma_id = id, turma, course_id, "turma creada");
        return Ok(id);
    }

    find_turma_by_normalized_name(conn, course_id, turma)?
        .map(|t| t.id)
        .ok_or_else(|| AppError::Internal(format!("class '{}' vanished after conflict", turma)))
}

fn resolve_uc(conn: &Connection, course_id: i64, code: &str) -> Result<ResolvedUc, AppError> {
    if let Some(uc) = find_uc(conn, code, course_id)? {
        return Ok(ResolvedUc { id: uc.id, name: uc.name });
    }

    // hours = 0 hasta que se corrija en la configuración
    let inserted: Option<i64> = conn
        .query_row(
            "INSERT INTO ucs (name, description, hours, course_id) VALUES (?1, '', 0, ?2)
             ON CONFLICT(name, course_id) DO NOTHING RETURNING id",
            params![code, course_id],
            |r| r.get(0),
        )
        .optional()?;
    if let Some(id) = inserted {
        debug!(uc_id = id, uc = code, course_id, "uc creada");
        return Ok(ResolvedUc { id, name: code.to_string() });
    }

    find_uc(conn, code, course_id)?
        .map(|uc| ResolvedUc { id: uc.id, name: uc.name })
        .ok_or_else(|| AppError::Internal(format!("uc '{}' vanished after conflict", code)))
}
