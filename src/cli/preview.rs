use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::columns::ColumnSource;
use crate::error::Result;
use crate::fmt::money;
use crate::grid::load_grid;
use crate::walker::reconstruct;

pub fn run(file: &str, rows: usize) -> Result<()> {
    let grid = load_grid(&PathBuf::from(file))?;
    let conversion = reconstruct(&grid);

    if conversion.column_source == ColumnSource::Legacy {
        println!(
            "{}",
            "No header row found; using legacy column positions.".yellow()
        );
    }
    if conversion.records.is_empty() {
        println!("{}", "No accounts recognized in this file.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Tanggal",
        "Nama Akun",
        "Tipe Akun",
        "Keterangan",
        "Debit",
        "Kredit",
        "Saldo",
    ]);
    for record in conversion.records.iter().take(rows) {
        table.add_row(vec![
            Cell::new(&record.date),
            Cell::new(&record.account_name),
            Cell::new(&record.account_type),
            Cell::new(&record.description),
            Cell::new(money(&record.debit)),
            Cell::new(money(&record.credit)),
            Cell::new(money(&record.balance)),
        ]);
    }
    println!(
        "Showing {} of {} records\n{table}",
        conversion.records.len().min(rows),
        conversion.records.len()
    );
    Ok(())
}
