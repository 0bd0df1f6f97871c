pub mod convert;
pub mod preview;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "rapikan",
    about = "Converts hierarchical Accurate general-ledger exports into flat pivot-ready tables."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a ledger export (.csv, .xls, .xlsx) to a flat CSV table.
    Convert {
        /// Path to the export file
        file: String,
        /// Output path (default: <input stem>_rapi.csv next to the input)
        #[arg(long)]
        output: Option<String>,
    },
    /// Show the first records of a conversion as a terminal table.
    Preview {
        /// Path to the export file
        file: String,
        /// Number of records to show
        #[arg(long, default_value_t = 50)]
        rows: usize,
    },
}
