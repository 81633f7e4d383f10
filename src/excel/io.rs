use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Duration, NaiveDate};
use std::path::Path;

use crate::error::AppError;

/// Extensiones que acepta el importador.
pub const ACCEPTED_EXTENSIONS: [&str; 2] = ["xlsx", "xlsm"];

/// Convierte un `Data` de calamine a String.
///
/// Las fechas nativas de Excel se devuelven como `DD/MM/YYYY` para que el
/// parser de la agenda las trate igual que una fecha escrita a mano.
pub fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if (f.floor() - f).abs() < f64::EPSILON {
                format!("{}", *f as i64)
            } else {
                format!("{}", f)
            }
        }
        Data::Int(i) => format!("{}", i),
        Data::Bool(b) => format!("{}", b),
        Data::Empty => String::new(),
        Data::Error(_) => String::new(),
        Data::DateTime(dt) => match excel_serial_to_date(dt.as_f64()) {
            Some(d) => d.format("%d/%m/%Y").to_string(),
            None => dt.to_string(),
        },
        Data::DateTimeIso(s) => iso_to_dmy(s).unwrap_or_else(|| s.clone()),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Número de serie de Excel (sistema 1900) a fecha.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    // 1899-12-30 absorbe el falso 29/02/1900 de Excel para fechas posteriores a marzo de 1900
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(Duration::days(serial.floor() as i64))
}

fn iso_to_dmy(s: &str) -> Option<String> {
    let date_part = s.get(0..10)?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%d/%m/%Y").to_string())
}

/// Valida la extensión del archivo subido.
pub fn check_extension<P: AsRef<Path>>(path: P) -> Result<(), AppError> {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if ACCEPTED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(AppError::UnsupportedFile(format!(
            "expected one of {:?}, got '{}'",
            ACCEPTED_EXTENSIONS,
            path.as_ref().display()
        )))
    }
}

/// Lee una hoja del workbook como `Vec<Vec<String>>`.
///
/// Si `sheet_name` no existe (o es `None`) se usa la primera hoja. Cualquier
/// fallo al abrir o leer el archivo es un error estructural.
pub fn read_sheet<P: AsRef<Path>>(path: P, sheet_name: Option<&str>) -> Result<Vec<Vec<String>>, AppError> {
    let mut workbook = open_workbook_auto(path.as_ref())?;

    let names = workbook.sheet_names().to_owned();
    let sheet_to_use = match sheet_name {
        Some(wanted) => names.iter().find(|s| s.as_str() == wanted).or_else(|| names.first()),
        None => names.first(),
    }
    .cloned()
    .ok_or_else(|| AppError::Spreadsheet(format!("workbook '{}' has no sheets", path.as_ref().display())))?;

    let range = workbook.worksheet_range(&sheet_to_use)?;
    let mut rows: Vec<Vec<String>> = Vec::new();
    for r in range.rows() {
        rows.push(r.iter().map(cell_to_string).collect());
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_without_fraction_print_as_integers() {
        assert_eq!(cell_to_string(&Data::Float(27.0)), "27");
        assert_eq!(cell_to_string(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_to_string(&Data::String("  TI 27 ".into())), "TI 27");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }

    #[test]
    fn excel_serial_dates() {
        // 46083 = 2026-03-02
        assert_eq!(excel_serial_to_date(46083.0), NaiveDate::from_ymd_opt(2026, 3, 2));
        assert_eq!(excel_serial_to_date(0.5), None);
    }

    #[test]
    fn iso_datetime_cells_become_day_month_year() {
        assert_eq!(cell_to_string(&Data::DateTimeIso("2026-03-02T00:00:00".into())), "02/03/2026");
    }

    #[test]
    fn extension_check() {
        assert!(check_extension("agenda.xlsx").is_ok());
        assert!(check_extension("AGENDA.XLSM").is_ok());
        assert!(check_extension("agenda.csv").is_err());
        assert!(check_extension("agenda").is_err());
    }
}
