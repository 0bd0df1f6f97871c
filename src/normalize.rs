use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::grid::Cell;

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

/// Accounting decoration around an amount: `(Dr)`, `(Cr)`, bare `Dr`/`Cr`.
fn marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\(\s*(dr|cr)\s*\)|\b(dr|cr)\b").unwrap())
}

/// Parse an accounting-formatted amount. `None` means the cell held
/// non-numeric residue after cleaning; callers decide whether that is worth
/// recording as an anomaly. Empty cells are a plain zero, not an anomaly.
pub fn parse_number(cell: &Cell) -> Option<Decimal> {
    let raw = match cell {
        Cell::Empty => return Some(Decimal::ZERO),
        Cell::Text(s) => s,
        // A typed date where an amount should be is residue, same as text
        // that fails to parse.
        Cell::Date(_) => return None,
    };

    let cleaned = marker_re().replace_all(raw, "");
    // Parentheses are a stripped wrapper here, not a negative-value marker.
    // The source format uses (Dr)/(Cr) for direction and never encodes sign
    // with bare parentheses, so this stays a plain strip.
    let cleaned: String = cleaned
        .chars()
        .filter(|c| *c != '(' && *c != ')' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Some(Decimal::ZERO);
    }

    Decimal::from_str(&undo_grouping(&cleaned)).ok()
}

/// Disambiguate Indonesian grouping (`.` thousands, `,` decimal) from
/// Western grouping (`,` thousands, `.` decimal) by the position of the last
/// separator of each kind: whichever comes last is the decimal separator.
/// A lone `,` is decimal; a lone `.` is decimal (`"1.234"` reads as 1.234,
/// not 1234, kept for compatibility with the targeted export).
fn undo_grouping(s: &str) -> String {
    let last_comma = s.rfind(',');
    let last_dot = s.rfind('.');
    let comma_is_decimal = match (last_comma, last_dot) {
        (Some(c), Some(d)) => c > d,
        (Some(_), None) => true,
        _ => false,
    };
    if comma_is_decimal {
        s.chars()
            .filter(|c| *c != '.')
            .map(|c| if c == ',' { '.' } else { c })
            .collect()
    } else {
        s.chars().filter(|c| *c != ',').collect()
    }
}

/// Total version of [`parse_number`]: unparsable residue degrades to zero.
/// Downstream totals depend on this lossy default, so it is deliberate.
#[allow(dead_code)]
pub fn normalize_number(cell: &Cell) -> Decimal {
    match parse_number(cell) {
        Some(v) => v,
        None => {
            log::warn!("unparsable amount {cell:?}, using 0");
            Decimal::ZERO
        }
    }
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Indonesian month names, abbreviated and full. Lookup is exact-case, as
/// the export writes them.
fn month_number(name: &str) -> Option<&'static str> {
    let n = match name {
        "Jan" | "Januari" => "01",
        "Feb" | "Februari" => "02",
        "Mar" | "Maret" => "03",
        "Apr" | "April" => "04",
        "Mei" => "05",
        "Jun" | "Juni" => "06",
        "Jul" | "Juli" => "07",
        "Agu" | "Agustus" => "08",
        "Sep" | "September" => "09",
        "Okt" | "Oktober" => "10",
        "Nov" | "November" => "11",
        "Des" | "Desember" => "12",
        _ => return None,
    };
    Some(n)
}

/// Normalize a date cell to `DD/MM/YYYY`, reporting whether the month name
/// had to fall back to `01` (so the walk can record the anomaly without
/// changing the output value).
pub fn normalize_date_checked(cell: &Cell) -> (String, bool) {
    match cell {
        Cell::Empty => (String::new(), false),
        Cell::Date(d) => (d.format("%d/%m/%Y").to_string(), false),
        Cell::Text(s) => {
            let parts: Vec<&str> = s.split_whitespace().collect();
            if parts.len() < 3 {
                // Not worded day/month/year; hand it back untouched.
                return (s.clone(), false);
            }
            let day = format!("{:0>2}", parts[0]);
            let (month, defaulted) = match month_number(parts[1]) {
                Some(m) => (m, false),
                None => ("01", true),
            };
            let year = parts[2];
            (format!("{day}/{month}/{year}"), defaulted)
        }
    }
}

/// Total date normalizer; see [`normalize_date_checked`] for the lossy
/// month-01 default.
#[allow(dead_code)]
pub fn normalize_date(cell: &Cell) -> String {
    let (out, defaulted) = normalize_date_checked(cell);
    if defaulted {
        log::warn!("unrecognized month name in {cell:?}, defaulting to 01");
    }
    out
}
