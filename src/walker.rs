use rust_decimal::Decimal;
use serde::Serialize;

use crate::columns::{locate_columns, ColumnSource, FieldMap};
use crate::grid::{cell_at, Cell, RawGrid};
use crate::normalize::{normalize_date_checked, parse_number};

/// Synthetic first record emitted per account.
pub const OPENING_DESC: &str = "Saldo Awal";
pub const OPENING_DATE: &str = "01/01/2025";
/// Account type used when the header row carries none.
pub const DEFAULT_ACCOUNT_TYPE: &str = "Umum";

/// One flat output row. Serde names match the export's column captions so
/// the CSV writer emits them directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRecord {
    #[serde(rename = "Tanggal")]
    pub date: String,
    #[serde(rename = "Nama Akun")]
    pub account_name: String,
    #[serde(rename = "Tipe Akun")]
    pub account_type: String,
    #[serde(rename = "Keterangan")]
    pub description: String,
    #[serde(rename = "Debit")]
    pub debit: Decimal,
    #[serde(rename = "Kredit")]
    pub credit: Decimal,
    #[serde(rename = "Saldo")]
    pub balance: Decimal,
}

/// A lossy normalization fallback taken during the walk. Output values are
/// unchanged; this exists so data-quality issues are countable instead of
/// silent.
#[derive(Debug, Clone, PartialEq)]
pub struct Anomaly {
    pub row: usize,
    pub field: &'static str,
    pub raw: String,
}

/// Per-account state threaded through the walk. `name == None` means no
/// account block has started yet and transaction rows are orphans.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountContext {
    pub name: Option<String>,
    pub account_type: String,
}

/// Shape-based row classification. The export carries no row-type tag, so
/// rows are told apart by which positional cells are populated.
#[derive(Debug, Clone, PartialEq)]
pub enum RowKind {
    AccountHeader {
        name: String,
        account_type: String,
        opening_balance: Cell,
    },
    Transaction {
        date: Cell,
        description: Cell,
        debit: Cell,
        credit: Cell,
        balance: Cell,
    },
    Ignored,
}

// ---------------------------------------------------------------------------
// Classification predicates
// ---------------------------------------------------------------------------

/// True when the text is only digits, separators and a sign: an account
/// code or amount, never an account name.
pub fn is_numeric_text(s: &str) -> bool {
    let t = s.trim();
    !t.is_empty()
        && t.chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | ' '))
}

/// Account name: leftmost non-purely-numeric text cell in columns 2..=9.
fn find_account_name(row: &[Cell]) -> Option<(usize, String)> {
    (2..=9).find_map(|i| match cell_at(row, i) {
        Cell::Text(s) if !is_numeric_text(s) => Some((i, s.trim().to_string())),
        _ => None,
    })
}

/// Account type: leftmost text cell longer than 3 characters after the name
/// column, up to column 20.
fn find_account_type(row: &[Cell], name_col: usize) -> Option<(usize, String)> {
    (name_col + 1..=20).find_map(|i| match cell_at(row, i) {
        Cell::Text(s) if s.trim().chars().count() > 3 => Some((i, s.trim().to_string())),
        _ => None,
    })
}

/// Opening balance: the mapped balance column when populated, otherwise the
/// first digit-bearing cell to the right of the account metadata.
fn find_opening_balance(row: &[Cell], fields: &FieldMap, after: usize) -> Cell {
    let at_balance = cell_at(row, fields.balance);
    if !at_balance.is_empty() {
        return at_balance.clone();
    }
    row.iter()
        .skip(after + 1)
        .find(|c| match c {
            Cell::Text(s) => s.chars().any(|ch| ch.is_ascii_digit()),
            _ => false,
        })
        .cloned()
        .unwrap_or(Cell::Empty)
}

/// Classify one row given the column map and the context so far. Pure: no
/// state is touched, and every heuristic above is testable on its own.
pub fn classify_row(row: &[Cell], fields: &FieldMap, ctx: &AccountContext) -> RowKind {
    // Account header shape: column 1 populated, column 0 empty.
    if !cell_at(row, 1).is_empty() && cell_at(row, 0).is_empty() {
        if let Some((name_col, name)) = find_account_name(row) {
            let (type_col, account_type) = match find_account_type(row, name_col) {
                Some((i, t)) => (i, t),
                None => (name_col, DEFAULT_ACCOUNT_TYPE.to_string()),
            };
            return RowKind::AccountHeader {
                name,
                account_type,
                opening_balance: find_opening_balance(row, fields, type_col),
            };
        }
        return RowKind::Ignored;
    }

    // Transaction shape: the date column is populated with something other
    // than the "Tanggal" caption, and an account block is open.
    let date_cell = cell_at(row, fields.date);
    let is_caption = matches!(date_cell, Cell::Text(s) if s.trim() == "Tanggal");
    if !date_cell.is_empty() && !is_caption && ctx.name.is_some() {
        return RowKind::Transaction {
            date: date_cell.clone(),
            description: cell_at(row, fields.desc).clone(),
            debit: cell_at(row, fields.debit).clone(),
            credit: cell_at(row, fields.credit).clone(),
            balance: cell_at(row, fields.balance).clone(),
        };
    }

    RowKind::Ignored
}

// ---------------------------------------------------------------------------
// The walk
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct WalkOutput {
    pub records: Vec<LedgerRecord>,
    pub anomalies: Vec<Anomaly>,
}

fn cell_text(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Text(s) => s.clone(),
        Cell::Date(d) => d.to_string(),
    }
}

fn amount(cell: &Cell, row: usize, field: &'static str, anomalies: &mut Vec<Anomaly>) -> Decimal {
    match parse_number(cell) {
        Some(v) => v,
        None => {
            log::warn!("row {row}: unparsable {field} {cell:?}, using 0");
            anomalies.push(Anomaly {
                row,
                field,
                raw: cell_text(cell),
            });
            Decimal::ZERO
        }
    }
}

fn date(cell: &Cell, row: usize, anomalies: &mut Vec<Anomaly>) -> String {
    let (out, month_defaulted) = normalize_date_checked(cell);
    if month_defaulted {
        log::warn!("row {row}: unrecognized month in {cell:?}, defaulting to 01");
        anomalies.push(Anomaly {
            row,
            field: "tanggal",
            raw: cell_text(cell),
        });
    }
    out
}

/// Apply one classified row: returns the context for the next row plus the
/// record emitted for this one, if any. The context is a value passed in
/// and returned; nothing outlives a single walk.
fn apply(
    ctx: AccountContext,
    kind: RowKind,
    row_idx: usize,
    anomalies: &mut Vec<Anomaly>,
) -> (AccountContext, Option<LedgerRecord>) {
    match kind {
        RowKind::AccountHeader {
            name,
            account_type,
            opening_balance,
        } => {
            let record = LedgerRecord {
                date: OPENING_DATE.to_string(),
                account_name: name.clone(),
                account_type: account_type.clone(),
                description: OPENING_DESC.to_string(),
                debit: Decimal::ZERO,
                credit: Decimal::ZERO,
                balance: amount(&opening_balance, row_idx, "saldo awal", anomalies),
            };
            (
                AccountContext {
                    name: Some(name),
                    account_type,
                },
                Some(record),
            )
        }
        RowKind::Transaction {
            date: date_cell,
            description,
            debit,
            credit,
            balance,
        } => {
            let record = LedgerRecord {
                date: date(&date_cell, row_idx, anomalies),
                account_name: ctx.name.clone().unwrap_or_default(),
                account_type: ctx.account_type.clone(),
                description: cell_text(&description),
                debit: amount(&debit, row_idx, "debit", anomalies),
                credit: amount(&credit, row_idx, "kredit", anomalies),
                balance: amount(&balance, row_idx, "saldo", anomalies),
            };
            (ctx, Some(record))
        }
        RowKind::Ignored => (ctx, None),
    }
}

/// Single pass over the grid: classify each row, thread the account context
/// through, emit records in grid order. Never fails past a single field:
/// malformed cells degrade to the normalizers' defaults and the row is still
/// emitted.
pub fn walk(grid: &RawGrid, fields: &FieldMap) -> WalkOutput {
    let mut out = WalkOutput::default();
    let mut ctx = AccountContext::default();
    for (idx, row) in grid.iter().enumerate() {
        let kind = classify_row(row, fields, &ctx);
        let (next, emitted) = apply(ctx, kind, idx, &mut out.anomalies);
        ctx = next;
        if let Some(record) = emitted {
            out.records.push(record);
        }
    }
    out
}

/// Full reconstruction of one export file: locate columns, then walk.
/// Column map and context are built fresh here, so nothing leaks between
/// files.
pub struct Conversion {
    pub records: Vec<LedgerRecord>,
    pub anomalies: Vec<Anomaly>,
    pub column_source: ColumnSource,
}

pub fn reconstruct(grid: &RawGrid) -> Conversion {
    let located = locate_columns(grid);
    let out = walk(grid, &located.map);
    Conversion {
        records: out.records,
        anomalies: out.anomalies,
        column_source: located.source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{locate_columns, ColumnSource, LEGACY_MAP};
    use std::str::FromStr;

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells
            .iter()
            .map(|s| {
                if s.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(s.to_string())
                }
            })
            .collect()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    const FIELDS: FieldMap = FieldMap {
        date: 2,
        desc: 4,
        debit: 6,
        credit: 8,
        balance: 10,
    };

    fn header_row() -> Vec<Cell> {
        row(&["", "", "Tanggal", "", "Keterangan", "", "Debit", "", "Kredit", "", "Saldo"])
    }

    // col 1 = account code, col 6 = name, col 8 = type, col 10 = opening
    fn account_row(name: &str, acc_type: &str, opening: &str) -> Vec<Cell> {
        row(&["", "1-1000", "", "", "", "", name, "", acc_type, "", opening])
    }

    fn txn_row(date: &str, desc: &str, debit: &str, credit: &str, balance: &str) -> Vec<Cell> {
        row(&["", "", date, "", desc, "", debit, "", credit, "", balance])
    }

    #[test]
    fn test_is_numeric_text() {
        assert!(is_numeric_text("1.234,50"));
        assert!(is_numeric_text("-500"));
        assert!(!is_numeric_text("Kas Besar"));
        assert!(!is_numeric_text(""));
    }

    #[test]
    fn test_classify_account_header_leftmost_name_wins() {
        // Two name candidates in cols 2..=9: the leftmost one is the name,
        // and the next long string after it becomes the type.
        let r = row(&["", "x", "", "Kas Kecil", "", "", "Aktiva Lancar", "", ""]);
        let kind = classify_row(&r, &FIELDS, &AccountContext::default());
        match kind {
            RowKind::AccountHeader { name, account_type, .. } => {
                assert_eq!(name, "Kas Kecil");
                assert_eq!(account_type, "Aktiva Lancar");
            }
            other => panic!("expected AccountHeader, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_header_without_name_is_ignored() {
        // Column shape matches a header but cols 2..=9 hold only numbers.
        let r = row(&["", "1-1000", "", "500", "", "", "", "", "", "123"]);
        let kind = classify_row(&r, &FIELDS, &AccountContext::default());
        assert_eq!(kind, RowKind::Ignored);
    }

    #[test]
    fn test_classify_header_defaults_account_type() {
        let r = row(&["", "1-1000", "", "", "", "", "", "", "", "Kas"]);
        let kind = classify_row(&r, &FIELDS, &AccountContext::default());
        match kind {
            // "Kas" is only 3 chars, too short to be a type
            RowKind::AccountHeader { name, account_type, .. } => {
                assert_eq!(name, "Kas");
                assert_eq!(account_type, DEFAULT_ACCOUNT_TYPE);
            }
            other => panic!("expected AccountHeader, got {other:?}"),
        }
    }

    #[test]
    fn test_opening_balance_rightward_fallback() {
        // Balance column empty; opening sits in an off-map column.
        let r = row(&["", "1-1000", "", "", "", "", "Kas Besar", "", "Aktiva Lancar", "750,00", ""]);
        let kind = classify_row(&r, &FIELDS, &AccountContext::default());
        match kind {
            RowKind::AccountHeader { opening_balance, .. } => {
                assert_eq!(opening_balance, Cell::Text("750,00".to_string()));
            }
            other => panic!("expected AccountHeader, got {other:?}"),
        }
    }

    #[test]
    fn test_caption_row_is_not_a_transaction() {
        let ctx = AccountContext {
            name: Some("Kas".to_string()),
            account_type: "Aktiva".to_string(),
        };
        let kind = classify_row(&header_row(), &FIELDS, &ctx);
        assert_eq!(kind, RowKind::Ignored);
    }

    #[test]
    fn test_walk_emits_opening_then_transactions() {
        let grid = vec![
            header_row(),
            account_row("Kas Besar", "Aktiva Lancar", "500.000,00"),
            txn_row("15 Agustus 2024", "Setoran tunai", "250.000,00", "0", "750.000,00"),
            txn_row("16 Agustus 2024", "Pembayaran listrik", "0", "50.000,00", "700.000,00"),
        ];
        let located = locate_columns(&grid);
        assert_eq!(located.source, ColumnSource::Declared);
        let out = walk(&grid, &located.map);

        assert_eq!(out.records.len(), 3);
        let opening = &out.records[0];
        assert_eq!(opening.description, OPENING_DESC);
        assert_eq!(opening.date, OPENING_DATE);
        assert_eq!(opening.account_name, "Kas Besar");
        assert_eq!(opening.account_type, "Aktiva Lancar");
        assert_eq!(opening.debit, Decimal::ZERO);
        assert_eq!(opening.credit, Decimal::ZERO);
        assert_eq!(opening.balance, dec("500000.00"));

        let first = &out.records[1];
        assert_eq!(first.date, "15/08/2024");
        assert_eq!(first.description, "Setoran tunai");
        assert_eq!(first.debit, dec("250000.00"));
        assert_eq!(first.balance, dec("750000.00"));

        let second = &out.records[2];
        assert_eq!(second.date, "16/08/2024");
        assert_eq!(second.credit, dec("50000.00"));
        assert!(out.anomalies.is_empty());
    }

    #[test]
    fn test_orphan_transactions_are_dropped() {
        let grid = vec![
            header_row(),
            txn_row("15 Agustus 2024", "Sebelum akun", "100", "0", "100"),
            account_row("Kas Besar", "Aktiva Lancar", "0"),
            txn_row("16 Agustus 2024", "Sesudah akun", "100", "0", "200"),
        ];
        let out = walk(&grid, &locate_columns(&grid).map);
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[1].description, "Sesudah akun");
    }

    #[test]
    fn test_account_switch_resets_context() {
        let grid = vec![
            header_row(),
            account_row("Kas Besar", "Aktiva Lancar", "100,00"),
            txn_row("15 Agustus 2024", "Milik kas", "10", "0", "110"),
            account_row("Hutang Dagang", "Kewajiban", "200,00"),
            txn_row("16 Agustus 2024", "Milik hutang", "0", "20", "180"),
        ];
        let out = walk(&grid, &locate_columns(&grid).map);
        assert_eq!(out.records.len(), 4);
        assert_eq!(out.records[2].account_name, "Hutang Dagang");
        assert_eq!(out.records[2].account_type, "Kewajiban");
        assert_eq!(out.records[3].account_name, "Hutang Dagang");
        assert_eq!(out.records[3].account_type, "Kewajiban");
        assert_eq!(out.records[3].description, "Milik hutang");
    }

    #[test]
    fn test_legacy_fallback_still_emits_records() {
        // No header row anywhere; data sits at the legacy positions.
        let mut account = vec![Cell::Empty; 24];
        account[1] = Cell::Text("1-1000".to_string());
        account[6] = Cell::Text("Kas Besar".to_string());
        account[10] = Cell::Text("Aktiva Lancar".to_string());
        account[23] = Cell::Text("500.000,00".to_string());

        let mut txn = vec![Cell::Empty; 24];
        txn[2] = Cell::Text("15 Agustus 2024".to_string());
        txn[12] = Cell::Text("Setoran tunai".to_string());
        txn[19] = Cell::Text("250.000,00".to_string());
        txn[21] = Cell::Text("0".to_string());
        txn[23] = Cell::Text("750.000,00".to_string());

        let grid = vec![account, txn];
        let located = locate_columns(&grid);
        assert_eq!(located.source, ColumnSource::Legacy);
        assert_eq!(located.map, LEGACY_MAP);

        let out = walk(&grid, &located.map);
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[0].balance, dec("500000.00"));
        assert_eq!(out.records[1].date, "15/08/2024");
        assert_eq!(out.records[1].debit, dec("250000.00"));
    }

    #[test]
    fn test_malformed_fields_degrade_but_row_still_emitted() {
        let grid = vec![
            header_row(),
            account_row("Kas Besar", "Aktiva Lancar", "100,00"),
            txn_row("15 Zzz 2024", "Rusak", "bukan angka", "0", "abc"),
        ];
        let out = walk(&grid, &locate_columns(&grid).map);
        assert_eq!(out.records.len(), 2);
        let broken = &out.records[1];
        assert_eq!(broken.date, "15/01/2024");
        assert_eq!(broken.debit, Decimal::ZERO);
        assert_eq!(broken.balance, Decimal::ZERO);
        // Month default + two unparsable amounts
        assert_eq!(out.anomalies.len(), 3);
        assert_eq!(out.anomalies[0].field, "tanggal");
        assert_eq!(out.anomalies[0].row, 2);
        assert_eq!(out.anomalies[1].field, "debit");
        assert_eq!(out.anomalies[1].raw, "bukan angka");
    }

    #[test]
    fn test_typed_date_cell_makes_a_transaction() {
        let d = chrono::NaiveDate::from_ymd_opt(2024, 8, 15).unwrap();
        let mut txn = txn_row("", "Dari xlsx", "100", "0", "100");
        txn[2] = Cell::Date(d);
        let grid = vec![
            header_row(),
            account_row("Kas Besar", "Aktiva Lancar", "0"),
            txn,
        ];
        let out = walk(&grid, &locate_columns(&grid).map);
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[1].date, "15/08/2024");
    }
}
