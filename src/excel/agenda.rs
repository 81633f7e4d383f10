//! Lectura de la planilla de agenda de aulas.
//!
//! Formato esperado (primera hoja):
//!
//! ```text
//! Março/2026
//! Data       | Dia     | Tarde                 | Noite
//! 02/03/2026 | Segunda | TI 27 - UC12 - LAB43  | TI 28 - UC13 - LAB44
//! 03/03      | Terça   |                       | ADM 3 - UC01 - LAB10
//! ```
//!
//! Cada fila de datos produce cero, uno o más slots (uno por columna de
//! periodo con contenido). Una celda o fecha inválida produce un slot de
//! error en lugar de abortar la lectura.

use chrono::NaiveDate;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

use crate::error::AppError;
use crate::excel::io::{check_extension, read_sheet};
use crate::excel::normalize::{course_prefix, normalize_turma};
use crate::models::Period;

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})[/\-.](\d{1,2})(?:[/\-.](\d{2}|\d{4}))?$").expect("valid regex"));
static MONTH_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\p{L}+)\s*(?:/|-|\s|de)\s*(\d{4})$").expect("valid regex"));
static SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\p{N} ]+$").expect("valid regex"));

/// Columnas por defecto cuando la planilla no trae encabezado de periodos.
const DEFAULT_PERIOD_COLUMNS: [(usize, Period); 2] = [(2, Period::Tarde), (3, Period::Noite)];

/// Parámetros de lectura que no vienen del archivo.
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// Año usado cuando ni la celda ni un encabezado de mes lo indican.
    pub default_year: i32,
    pub sheet: Option<String>,
}

impl ParseContext {
    pub fn for_year(default_year: i32) -> Self {
        ParseContext { default_year, sheet: None }
    }
}

/// Slot válido: una asignación de aula lista para resolver e importar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSlot {
    /// Fila (1-based) en la planilla.
    pub row: usize,
    pub col: usize,
    /// Fecha ISO `YYYY-MM-DD`.
    pub date: String,
    pub period: Period,
    pub turma: String,
    pub uc: String,
    pub lab: String,
    pub course_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotError {
    pub row: usize,
    pub col: Option<usize>,
    pub raw: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotResult {
    Valid(ValidSlot),
    Error(SlotError),
}

impl SlotResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, SlotResult::Valid(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedAgenda {
    pub slots: Vec<SlotResult>,
    /// Filas de datos encontradas (con fecha válida o inválida).
    pub total_rows: usize,
}

/// Abre la planilla y extrae los slots. Sólo falla si el archivo no se puede
/// leer como planilla.
pub fn parse_agenda_file<P: AsRef<Path>>(path: P, ctx: &ParseContext) -> Result<ParsedAgenda, AppError> {
    check_extension(path.as_ref())?;
    let rows = read_sheet(path.as_ref(), ctx.sheet.as_deref())?;
    debug!(rows = rows.len(), path = %path.as_ref().display(), "planilla leída");
    Ok(parse_agenda_rows(&rows, ctx))
}

/// Extrae los slots de una hoja ya leída. Nunca falla: las celdas inválidas
/// se devuelven como `SlotResult::Error`.
pub fn parse_agenda_rows(rows: &[Vec<String>], ctx: &ParseContext) -> ParsedAgenda {
    let mut out = ParsedAgenda::default();
    let mut period_columns: Vec<(usize, Period)> = DEFAULT_PERIOD_COLUMNS.to_vec();
    let mut header_year: Option<i32> = None;

    for (idx, row) in rows.iter().enumerate() {
        let row_no = idx + 1;
        let first = match row.iter().map(|c| c.trim()).find(|c| !c.is_empty()) {
            Some(c) => c,
            None => continue,
        };

        if let Some((_month, year)) = parse_month_header(first) {
            header_year = Some(year);
            continue;
        }

        if let Some(cols) = parse_period_header(row) {
            period_columns = cols;
            continue;
        }

        let date_cell = row.first().map(|c| c.trim()).unwrap_or("");
        let filled: Vec<(usize, Period, &str)> = period_columns
            .iter()
            .filter_map(|(col, period)| {
                let raw = row.get(*col).map(|c| c.trim()).unwrap_or("");
                if raw.is_empty() { None } else { Some((*col, *period, raw)) }
            })
            .collect();

        let date = match parse_date_cell(date_cell, header_year.unwrap_or(ctx.default_year)) {
            Ok(d) => d,
            Err(msg) => {
                // Títulos y notas sueltas: sin contenido en periodos no son filas de datos
                if filled.is_empty() {
                    continue;
                }
                out.total_rows += 1;
                out.slots.push(SlotResult::Error(SlotError {
                    row: row_no,
                    col: Some(0),
                    raw: date_cell.to_string(),
                    message: msg,
                }));
                continue;
            }
        };

        out.total_rows += 1;
        for (col, period, raw) in filled {
            out.slots.push(parse_slot_cell(raw, row_no, col, &date, period));
        }
    }

    out
}

/// `"Março/2026"` -> (3, 2026)
fn parse_month_header(cell: &str) -> Option<(u32, i32)> {
    let caps = MONTH_HEADER_RE.captures(cell.trim())?;
    let month = month_from_name(caps.get(1)?.as_str())?;
    let year = caps.get(2)?.as_str().parse::<i32>().ok()?;
    Some((month, year))
}

fn month_from_name(name: &str) -> Option<u32> {
    let folded = fold_accents(&name.to_lowercase());
    let month = match folded.as_str() {
        "janeiro" | "jan" => 1,
        "fevereiro" | "fev" => 2,
        "marco" | "mar" => 3,
        "abril" | "abr" => 4,
        "maio" | "mai" => 5,
        "junho" | "jun" => 6,
        "julho" | "jul" => 7,
        "agosto" | "ago" => 8,
        "setembro" | "set" => 9,
        "outubro" | "out" => 10,
        "novembro" | "nov" => 11,
        "dezembro" | "dez" => 12,
        _ => return None,
    };
    Some(month)
}

fn fold_accents(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Si la fila es un encabezado de periodos devuelve sus columnas.
fn parse_period_header(row: &[String]) -> Option<Vec<(usize, Period)>> {
    let cols: Vec<(usize, Period)> = row
        .iter()
        .enumerate()
        .filter_map(|(i, c)| c.parse::<Period>().ok().map(|p| (i, p)))
        .collect();
    if cols.is_empty() { None } else { Some(cols) }
}

/// `DD/MM` o `DD/MM/YYYY` (también `-` y `.`) -> `YYYY-MM-DD`.
fn parse_date_cell(cell: &str, fallback_year: i32) -> Result<String, String> {
    if cell.is_empty() {
        return Err("missing date".to_string());
    }
    let caps = DATE_RE
        .captures(cell)
        .ok_or_else(|| format!("invalid date '{}': expected DD/MM or DD/MM/YYYY", cell))?;
    let day: u32 = caps[1].parse().map_err(|_| format!("invalid day in '{}'", cell))?;
    let month: u32 = caps[2].parse().map_err(|_| format!("invalid month in '{}'", cell))?;
    let year: i32 = match caps.get(3) {
        Some(y) if y.as_str().len() == 2 => 2000 + y.as_str().parse::<i32>().map_err(|_| format!("invalid year in '{}'", cell))?,
        Some(y) => y.as_str().parse().map_err(|_| format!("invalid year in '{}'", cell))?,
        None => fallback_year,
    };
    NaiveDate::from_ymd_opt(year, month, day)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .ok_or_else(|| format!("invalid date '{}': no such day", cell))
}

/// `TURMA - UC - LAB`. Con más de tres partes, las dos últimas son UC y LAB
/// y el resto forma la turma (`"TI-27 - UC12 - LAB43"`).
fn parse_slot_cell(raw: &str, row: usize, col: usize, date: &str, period: Period) -> SlotResult {
    let fail = |message: String| {
        SlotResult::Error(SlotError { row, col: Some(col), raw: raw.to_string(), message })
    };

    let parts: Vec<&str> = raw.split('-').map(str::trim).collect();
    if parts.len() < 3 {
        return fail(format!("expected 'TURMA - UC - LABORATORIO', got '{}'", raw));
    }
    if parts.iter().any(|p| p.is_empty() || !SEGMENT_RE.is_match(p)) {
        return fail(format!("segments must be non-empty and alphanumeric in '{}'", raw));
    }

    let (turma_parts, rest) = parts.split_at(parts.len() - 2);
    let turma = normalize_turma(&turma_parts.join("-"));
    let uc = normalize_turma(rest[0]);
    let lab = normalize_turma(rest[1]);

    let prefix = match course_prefix(&turma) {
        Some(p) => p,
        None => return fail(format!("class label '{}' has no course prefix", turma)),
    };

    SlotResult::Valid(ValidSlot {
        row,
        col,
        date: date.to_string(),
        period,
        turma,
        uc,
        lab,
        course_prefix: prefix,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_headers() {
        assert_eq!(parse_month_header("Março/2026"), Some((3, 2026)));
        assert_eq!(parse_month_header("MARCO 2026"), Some((3, 2026)));
        assert_eq!(parse_month_header("abril de 2025"), Some((4, 2025)));
        assert_eq!(parse_month_header("Turmas/2026"), None);
        assert_eq!(parse_month_header("02/03/2026"), None);
    }

    #[test]
    fn dates_with_and_without_year() {
        assert_eq!(parse_date_cell("02/03/2026", 2000).unwrap(), "2026-03-02");
        assert_eq!(parse_date_cell("2/3", 2026).unwrap(), "2026-03-02");
        assert_eq!(parse_date_cell("02-03-26", 2000).unwrap(), "2026-03-02");
        assert!(parse_date_cell("31/02/2026", 2026).is_err());
        assert!(parse_date_cell("segunda", 2026).is_err());
        assert!(parse_date_cell("", 2026).is_err());
    }

    #[test]
    fn slot_cell_with_hyphenated_turma() {
        match parse_slot_cell("TI-27 - UC 12 - LAB 43", 4, 2, "2026-03-02", Period::Tarde) {
            SlotResult::Valid(s) => {
                assert_eq!(s.turma, "TI-27");
                assert_eq!(s.uc, "UC12");
                assert_eq!(s.lab, "LAB43");
                assert_eq!(s.course_prefix, "TI");
            }
            other => panic!("expected valid slot, got {:?}", other),
        }
    }

    #[test]
    fn slot_cell_errors() {
        for raw in ["TI 27 UC12 LAB43", "TI 27 - - LAB43", "TI 27 - UC12 - LAB#43", "27 - UC12 - LAB43"] {
            assert!(
                !parse_slot_cell(raw, 1, 2, "2026-03-02", Period::Noite).is_valid(),
                "{:?} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn period_header_remaps_columns() {
        let row: Vec<String> = ["Data", "Manhã", "Tarde", "Noite"].iter().map(|s| s.to_string()).collect();
        let cols = parse_period_header(&row).unwrap();
        assert_eq!(cols, vec![(1, Period::Manha), (2, Period::Tarde), (3, Period::Noite)]);
    }
}
