use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::validate_iso_date;
use crate::error::AppError;
use crate::models::{DateRange, Event, EventKind, NewEvent};

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    let kind_raw: String = row.get(2)?;
    let kind = kind_raw.parse::<EventKind>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, e.into())
    })?;
    Ok(Event {
        id: row.get(0)?,
        title: row.get(1)?,
        kind,
        date: row.get(3)?,
        end_date: row.get(4)?,
        description: row.get(5)?,
    })
}

fn validate_event(input: &NewEvent) -> Result<(), AppError> {
    if input.title.trim().is_empty() {
        return Err(AppError::Validation("event title is required".into()));
    }
    validate_iso_date(&input.date)?;
    if let Some(end) = &input.end_date {
        validate_iso_date(end)?;
        if end.as_str() < input.date.as_str() {
            return Err(AppError::Validation("end_date is before date".into()));
        }
    }
    Ok(())
}

pub fn get_event(conn: &Connection, id: i64) -> Result<Event, AppError> {
    conn.query_row(
        "SELECT id, title, kind, date, end_date, description FROM events WHERE id = ?1",
        params![id],
        event_from_row,
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound(format!("event {}", id)))
}

/// Eventos que se solapan con el rango (un evento de varios días cuenta si
/// alguno de sus días cae dentro).
pub fn list_events(conn: &Connection, range: &DateRange) -> Result<Vec<Event>, AppError> {
    if let Some(from) = &range.from {
        validate_iso_date(from)?;
    }
    if let Some(to) = &range.to {
        validate_iso_date(to)?;
    }
    let mut stmt = conn.prepare(
        "SELECT id, title, kind, date, end_date, description FROM events
         WHERE (?1 IS NULL OR COALESCE(end_date, date) >= ?1)
           AND (?2 IS NULL OR date <= ?2)
         ORDER BY date, id",
    )?;
    let rows = stmt.query_map(params![range.from, range.to], event_from_row)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn insert_event(conn: &Connection, input: &NewEvent) -> Result<Event, AppError> {
    validate_event(input)?;
    conn.execute(
        "INSERT INTO events (title, kind, date, end_date, description) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![input.title.trim(), input.kind.as_str(), input.date, input.end_date, input.description],
    )?;
    get_event(conn, conn.last_insert_rowid())
}

pub fn update_event(conn: &Connection, id: i64, input: &NewEvent) -> Result<Event, AppError> {
    validate_event(input)?;
    let n = conn.execute(
        "UPDATE events SET title = ?1, kind = ?2, date = ?3, end_date = ?4, description = ?5 WHERE id = ?6",
        params![input.title.trim(), input.kind.as_str(), input.date, input.end_date, input.description, id],
    )?;
    if n == 0 {
        return Err(AppError::NotFound(format!("event {}", id)));
    }
    get_event(conn, id)
}

pub fn delete_event(conn: &Connection, id: i64) -> Result<(), AppError> {
    let n = conn.execute("DELETE FROM events WHERE id = ?1", params![id])?;
    if n == 0 {
        return Err(AppError::NotFound(format!("event {}", id)));
    }
    Ok(())
}
