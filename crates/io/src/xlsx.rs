// Excel import (xlsx, xls, xlsb, ods)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use geodash_core::{Cell, Table};

use crate::error::LoadError;

/// First serial after 9999-12-31.
const MAX_SERIAL: f64 = 2_958_466.0;

/// Import one worksheet as a table. The first row is the header row.
///
/// `sheet` selects a worksheet by name; `None` reads the first one.
pub fn import(path: &Path, sheet: Option<&str>) -> Result<Table, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| LoadError::Read { path: path.to_path_buf(), message: e.to_string() })?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let name = match sheet {
        Some(wanted) => sheet_names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| {
                LoadError::parse(
                    path,
                    format!("no sheet named '{}' (available: {})", wanted, sheet_names.join(", ")),
                )
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| LoadError::parse(path, "workbook contains no sheets"))?,
    };

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| LoadError::parse(path, format!("failed to read sheet '{}': {}", name, e)))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(|d| convert(d).to_string().trim().to_string()).collect(),
        None => Vec::new(),
    };

    let mut table = Table::new(headers);
    for row in rows {
        let cells: Vec<Cell> = row.iter().map(convert).collect();
        // Dense ranges pad with fully blank rows at the end of some exports
        if cells.iter().all(Cell::is_empty) {
            continue;
        }
        table.push_row(cells);
    }

    log::debug!("{}: sheet '{}', {} rows", path.display(), name, table.len());
    Ok(table)
}

fn convert(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::from_text(s),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::Error(e) => Cell::Text(format!("#{:?}", e)),
        // calamine's ExcelDateTime does not expose the 1904 flag; assume the 1900 system
        Data::DateTime(dt) => match serial_to_datetime(dt.as_f64()) {
            Some(dt) => Cell::DateTime(dt),
            None => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => parse_iso(s).map(Cell::DateTime).unwrap_or_else(|| Cell::from_text(s)),
        Data::DurationIso(s) => Cell::from_text(s),
    }
}

/// Convert an Excel serial date (1900 system) to a timestamp.
///
/// Serial 1 is 1900-01-01; the base is shifted to 1899-12-30 to absorb the
/// phantom 1900-02-29 for every serial past 60. Serials past 9999-12-31,
/// the last date Excel can show, give `None`.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..MAX_SERIAL).contains(&serial) {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = serial.trunc() as i64;
    let millis = (serial.fract() * 86_400_000.0).round() as i64;
    base.checked_add_signed(Duration::try_days(days)?)?
        .checked_add_signed(Duration::try_milliseconds(millis)?)
}

fn parse_iso(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .ok()
        .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_serial_dates() {
        let dt = serial_to_datetime(45658.0).unwrap();
        assert_eq!(dt.to_string(), "2025-01-01 00:00:00");

        let dt = serial_to_datetime(45658.5).unwrap();
        assert_eq!(dt.to_string(), "2025-01-01 12:00:00");

        assert!(serial_to_datetime(f64::NAN).is_none());
        assert!(serial_to_datetime(-1.0).is_none());

        let dt = serial_to_datetime(2_958_465.0).unwrap();
        assert_eq!(dt.to_string(), "9999-12-31 00:00:00");
        assert!(serial_to_datetime(2_958_466.0).is_none());
        assert!(serial_to_datetime(1e20).is_none());
    }

    #[test]
    fn test_convert_cells() {
        assert_eq!(convert(&Data::Int(7)), Cell::Number(7.0));
        assert_eq!(convert(&Data::String("  ".into())), Cell::Empty);
        assert_eq!(convert(&Data::String("Sur".into())), Cell::from("Sur"));
        assert_eq!(convert(&Data::Bool(true)), Cell::Bool(true));
        assert_eq!(
            convert(&Data::DateTimeIso("2023-01-01T07:06:11".into())),
            Cell::DateTime(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap().and_hms_opt(7, 6, 11).unwrap())
        );
    }

    #[test]
    fn test_missing_workbook_is_not_found() {
        let dir = tempdir().unwrap();
        let err = import(&dir.path().join("ventas.xlsx"), None).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_garbage_workbook_is_read_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ventas.xlsx");
        std::fs::write(&path, b"not a zip archive").unwrap();
        let err = import(&path, None).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }
}
