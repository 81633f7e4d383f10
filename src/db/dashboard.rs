use chrono::{Duration, NaiveDate};
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::db::events::list_events;
use crate::db::lessons::lesson_from_row;
use crate::error::AppError;
use crate::models::{DateRange, Event, Lesson};

/// Días hacia adelante que cubre "próximas aulas/eventos".
pub const UPCOMING_DAYS: i64 = 7;
const TOP_LABS: i64 = 10;

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Totals {
    pub courses: i64,
    pub turmas: i64,
    pub ucs: i64,
    pub lessons: i64,
    pub events: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub today: String,
    pub totals: Totals,
    pub lessons_by_period: Vec<LabelCount>,
    pub lessons_by_course: Vec<LabelCount>,
    pub top_labs: Vec<LabelCount>,
    pub upcoming_lessons: Vec<Lesson>,
    pub upcoming_events: Vec<Event>,
}

fn count(conn: &Connection, table: &str) -> Result<i64, AppError> {
    Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?)
}

fn label_counts(conn: &Connection, sql: &str) -> Result<Vec<LabelCount>, AppError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |r| Ok(LabelCount { label: r.get(0)?, count: r.get(1)? }))?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Agregados del panel principal a partir de `today`.
pub fn dashboard_summary(conn: &Connection, today: NaiveDate) -> Result<DashboardSummary, AppError> {
    let totals = Totals {
        courses: count(conn, "courses")?,
        turmas: count(conn, "turmas")?,
        ucs: count(conn, "ucs")?,
        lessons: count(conn, "lessons")?,
        events: count(conn, "events")?,
    };

    let lessons_by_period = label_counts(
        conn,
        "SELECT period, COUNT(*) FROM lessons GROUP BY period
         ORDER BY CASE period WHEN 'Manhã' THEN 0 WHEN 'Tarde' THEN 1 ELSE 2 END",
    )?;
    let lessons_by_course = label_counts(
        conn,
        "SELECT c.acronym, COUNT(l.id) FROM courses c
         LEFT JOIN lessons l ON l.course_id = c.id
         GROUP BY c.id ORDER BY COUNT(l.id) DESC, c.acronym",
    )?;
    let top_labs = label_counts(
        conn,
        &format!(
            "SELECT lab, COUNT(*) FROM lessons WHERE lab <> '' GROUP BY lab
             ORDER BY COUNT(*) DESC, lab LIMIT {}",
            TOP_LABS
        ),
    )?;

    let from = today.format("%Y-%m-%d").to_string();
    let to = (today + Duration::days(UPCOMING_DAYS)).format("%Y-%m-%d").to_string();

    let mut stmt = conn.prepare(
        "SELECT id, course_id, turma, uc_id, uc_name, period, lab, date, description FROM lessons
         WHERE date >= ?1 AND date <= ?2
         ORDER BY date, CASE period WHEN 'Manhã' THEN 0 WHEN 'Tarde' THEN 1 ELSE 2 END, turma",
    )?;
    let rows = stmt.query_map(params![from, to], lesson_from_row)?;
    let mut upcoming_lessons = Vec::new();
    for r in rows {
        upcoming_lessons.push(r?);
    }

    let upcoming_events = list_events(conn, &DateRange { from: Some(from.clone()), to: Some(to) })?;

    Ok(DashboardSummary {
        today: from,
        totals,
        lessons_by_period,
        lessons_by_course,
        top_labs,
        upcoming_lessons,
        upcoming_events,
    })
}
