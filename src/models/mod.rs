// Estructuras de datos principales

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub acronym: String,
}

/// Turma (clase / cohorte). `name` se guarda normalizado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turma {
    pub id: i64,
    pub name: String,
    pub course_id: i64,
}

/// Unidad curricular.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Uc {
    pub id: i64,
    pub name: String,
    pub desc: String,
    pub hours: i64,
    pub course_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "Manhã")]
    Manha,
    Tarde,
    Noite,
}

impl Period {
    pub const ALL: [Period; 3] = [Period::Manha, Period::Tarde, Period::Noite];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Manha => "Manhã",
            Period::Tarde => "Tarde",
            Period::Noite => "Noite",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    /// Acepta la etiqueta con o sin acento, en cualquier capitalización.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "manhã" | "manha" => Ok(Period::Manha),
            "tarde" => Ok(Period::Tarde),
            "noite" => Ok(Period::Noite),
            other => Err(format!("unknown period '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i64,
    pub course_id: i64,
    /// Nombre de turma desnormalizado (no es FK a `Turma.id`).
    pub turma: String,
    pub uc_id: i64,
    pub uc_name: String,
    pub period: Period,
    pub lab: String,
    /// Fecha ISO `YYYY-MM-DD`.
    pub date: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Meeting,
    Holiday,
    Suspension,
    Other,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Meeting => "meeting",
            EventKind::Holiday => "holiday",
            EventKind::Suspension => "suspension",
            EventKind::Other => "other",
        }
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "meeting" => Ok(EventKind::Meeting),
            "holiday" => Ok(EventKind::Holiday),
            "suspension" => Ok(EventKind::Suspension),
            "other" => Ok(EventKind::Other),
            other => Err(format!("unknown event kind '{}'", other)),
        }
    }
}

/// Anotación de calendario (reuniones, feriados, suspensiones).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub kind: EventKind,
    pub date: String,
    pub end_date: Option<String>,
    pub description: String,
}

/// Resultado de importar un slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpsertAction {
    Created,
    Updated,
}

impl UpsertAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpsertAction::Created => "created",
            UpsertAction::Updated => "updated",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportStats {
    pub total_lines: usize,
    pub processed: usize,
    pub created: usize,
    pub updated: usize,
    pub errors: usize,
}

/// Entrada de `lessons[]` del reporte.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedLesson {
    pub id: i64,
    pub date: String,
    pub period: Period,
    pub turma: String,
    pub uc: String,
    pub lab: String,
    pub status: String,
}

/// Entrada de `details[]` del reporte: una fila/celda que no se pudo importar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportIssue {
    pub row: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col: Option<usize>,
    pub raw: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub message: String,
    pub stats: ImportStats,
    pub lessons: Vec<ImportedLesson>,
    pub details: Vec<ImportIssue>,
}

// --- Entradas de la API (crear / actualizar) ---

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewCourse {
    pub name: String,
    pub acronym: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewTurma {
    pub name: String,
    pub course_id: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewUc {
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub hours: i64,
    pub course_id: i64,
}

/// Alta manual de aula. `uc_name` se copia de la UC referenciada.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewLesson {
    pub course_id: i64,
    pub turma: String,
    pub uc_id: i64,
    pub period: Period,
    #[serde(default)]
    pub lab: String,
    pub date: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewEvent {
    pub title: String,
    pub kind: EventKind,
    pub date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// Filtros de `GET /lessons`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LessonFilter {
    pub from: Option<String>,
    pub to: Option<String>,
    pub turma: Option<String>,
    pub course_id: Option<i64>,
    pub period: Option<Period>,
}

/// Filtros de `GET /events`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DateRange {
    pub from: Option<String>,
    pub to: Option<String>,
}
