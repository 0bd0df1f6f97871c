use crate::grid::{Cell, RawGrid};

/// Column positions for the five logical ledger fields. Built once per file
/// and never changed afterward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldMap {
    pub date: usize,
    pub desc: usize,
    pub debit: usize,
    pub credit: usize,
    pub balance: usize,
}

/// Fixed positions from the older export layout, used when no header row is
/// found anywhere in the file.
pub const LEGACY_MAP: FieldMap = FieldMap {
    date: 2,
    desc: 12,
    debit: 19,
    credit: 21,
    balance: 23,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnSource {
    /// Positions read from a header row declared in the file.
    Declared,
    /// No header row found; legacy positional map substituted wholesale.
    Legacy,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Located {
    pub map: FieldMap,
    pub source: ColumnSource,
}

fn header_texts(row: &[Cell]) -> Vec<(usize, String)> {
    row.iter()
        .enumerate()
        .filter_map(|(i, c)| c.as_text().map(|s| (i, s.to_lowercase())))
        .collect()
}

/// Scan the grid top to bottom for the first row declaring both a date and a
/// debit caption, and map each logical field to the first column whose
/// caption mentions it. Fields the header row does not mention keep their
/// legacy position. If no row qualifies, the whole legacy map is substituted
/// and the caller gets `ColumnSource::Legacy` to surface as a warning.
pub fn locate_columns(grid: &RawGrid) -> Located {
    for row in grid {
        let texts = header_texts(row);
        let has_date = texts.iter().any(|(_, t)| t.contains("tanggal"));
        let has_debit = texts.iter().any(|(_, t)| t.contains("debit"));
        if !(has_date && has_debit) {
            continue;
        }

        let mut map = LEGACY_MAP;
        let (mut date, mut desc, mut debit, mut credit, mut balance) =
            (None, None, None, None, None);
        for (i, t) in &texts {
            if date.is_none() && t.contains("tanggal") {
                date = Some(*i);
            }
            if desc.is_none() && t.contains("keterangan") {
                desc = Some(*i);
            }
            if debit.is_none() && t.contains("debit") {
                debit = Some(*i);
            }
            if credit.is_none() && t.contains("kredit") {
                credit = Some(*i);
            }
            if balance.is_none() && (t.contains("saldo") || t.contains("balance")) {
                balance = Some(*i);
            }
        }
        if let Some(i) = date {
            map.date = i;
        }
        if let Some(i) = desc {
            map.desc = i;
        }
        if let Some(i) = debit {
            map.debit = i;
        }
        if let Some(i) = credit {
            map.credit = i;
        }
        if let Some(i) = balance {
            map.balance = i;
        }
        return Located {
            map,
            source: ColumnSource::Declared,
        };
    }

    log::warn!("no header row found, falling back to legacy column positions");
    Located {
        map: LEGACY_MAP,
        source: ColumnSource::Legacy,
    }
}
