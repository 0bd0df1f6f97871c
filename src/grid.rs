use std::path::Path;

use calamine::{Data, Reader};
use chrono::NaiveDate;

use crate::error::{RapikanError, Result};

/// One raw spreadsheet cell. Typed dates are kept as dates so the date
/// normalizer can branch on them; everything else stays untouched text.
/// Numbers are never coerced; the normalizers need to see the original
/// accounting-formatted strings.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Date(NaiveDate),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

pub type RawRow = Vec<Cell>;
pub type RawGrid = Vec<RawRow>;

/// Columns beyond a row's populated range read as empty, not as an error.
pub fn cell_at(row: &[Cell], idx: usize) -> &Cell {
    static EMPTY: Cell = Cell::Empty;
    row.get(idx).unwrap_or(&EMPTY)
}

/// Read a ledger export into a raw grid, dispatching on the file extension.
pub fn load_grid(path: &Path) -> Result<RawGrid> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let grid = match ext.as_str() {
        "csv" => read_csv(path)?,
        "xls" | "xlsx" => read_workbook(path)?,
        other => return Err(RapikanError::UnsupportedExtension(other.to_string())),
    };
    if grid.is_empty() {
        return Err(RapikanError::EmptyGrid);
    }
    Ok(grid)
}

fn read_csv(path: &Path) -> Result<RawGrid> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));
    let mut grid = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let row: RawRow = record
            .iter()
            .map(|field| {
                if field.trim().is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(field.to_string())
                }
            })
            .collect();
        grid.push(row);
    }
    Ok(grid)
}

fn read_workbook(path: &Path) -> Result<RawGrid> {
    let mut workbook = calamine::open_workbook_auto(path)
        .map_err(|e| RapikanError::Spreadsheet(format!("failed to open workbook: {e}")))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| RapikanError::Spreadsheet("workbook has no sheets".to_string()))?
        .map_err(|e| RapikanError::Spreadsheet(format!("failed to read sheet: {e}")))?;

    let mut grid = Vec::new();
    for row in range.rows() {
        grid.push(row.iter().map(cell_from_data).collect::<RawRow>());
    }
    Ok(grid)
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => {
            if s.trim().is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.clone())
            }
        }
        Data::Float(f) => Cell::Text(format_float(*f)),
        Data::Int(i) => Cell::Text(i.to_string()),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => Cell::Date(excel_serial_to_date(dt.as_f64())),
        Data::DateTimeIso(s) => match NaiveDate::parse_from_str(&s[..s.len().min(10)], "%Y-%m-%d") {
            Ok(d) => Cell::Date(d),
            Err(_) => Cell::Text(s.clone()),
        },
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

fn excel_serial_to_date(serial: f64) -> NaiveDate {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap();
    base + chrono::Duration::days(serial as i64)
}

/// Render spreadsheet numerics the way they look in the sheet: no trailing
/// `.0` on whole numbers.
fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        format!("{f}")
    }
}
