use rusqlite::Connection;

use crate::error::AppError;

/// Crea las tablas si no existen.
///
/// `turmas(course_id, name)` y `lessons(date, period, turma)` llevan índices
/// únicos sobre el texto guardado; la comparación normalizada la hacen el
/// resolver y el motor de upsert.
pub fn init_schema(conn: &Connection) -> Result<(), AppError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS courses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            acronym TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS turmas (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            course_id INTEGER NOT NULL REFERENCES courses(id),
            UNIQUE(course_id, name)
        );

        CREATE TABLE IF NOT EXISTS ucs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            hours INTEGER NOT NULL DEFAULT 0,
            course_id INTEGER NOT NULL REFERENCES courses(id),
            UNIQUE(name, course_id)
        );

        CREATE TABLE IF NOT EXISTS lessons (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            course_id INTEGER NOT NULL REFERENCES courses(id),
            turma TEXT NOT NULL,
            uc_id INTEGER NOT NULL REFERENCES ucs(id),
            uc_name TEXT NOT NULL,
            period TEXT NOT NULL CHECK (period IN ('Manhã', 'Tarde', 'Noite')),
            lab TEXT NOT NULL DEFAULT '',
            date TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            UNIQUE(date, period, turma)
        );

        CREATE INDEX IF NOT EXISTS idx_lessons_date ON lessons(date);

        CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            kind TEXT NOT NULL,
            date TEXT NOT NULL,
            end_date TEXT,
            description TEXT NOT NULL DEFAULT ''
        );

        CREATE INDEX IF NOT EXISTS idx_events_date ON events(date);",
    )?;
    Ok(())
}
