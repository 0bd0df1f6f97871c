mod cli;
mod columns;
mod error;
mod export;
mod fmt;
mod grid;
mod normalize;
mod walker;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert { file, output } => cli::convert::run(&file, output.as_deref()),
        Commands::Preview { file, rows } => cli::preview::run(&file, rows),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
