use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::columns::ColumnSource;
use crate::error::Result;
use crate::export::write_csv;
use crate::grid::load_grid;
use crate::walker::reconstruct;

fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "buku_besar".to_string());
    input.with_file_name(format!("{stem}_rapi.csv"))
}

pub fn run(file: &str, output: Option<&str>) -> Result<()> {
    let input = PathBuf::from(file);
    let grid = load_grid(&input)?;
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

    let out_path = output.map(PathBuf::from).unwrap_or_else(|| default_output(&input));
    write_csv(&conversion.records, &out_path)?;

    println!(
        "{} records written to {}",
        conversion.records.len(),
        out_path.display()
    );
    if !conversion.anomalies.is_empty() {
        println!(
            "{}",
            format!(
                "{} field(s) could not be parsed and fell back to defaults:",
                conversion.anomalies.len()
            )
            .yellow()
        );
        for a in conversion.anomalies.iter().take(5) {
            println!("  row {}: {} = {:?}", a.row + 1, a.field, a.raw);
        }
        if conversion.anomalies.len() > 5 {
            println!("  ... and {} more", conversion.anomalies.len() - 5);
        }
    }
    Ok(())
}
