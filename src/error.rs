use thiserror::Error;

#[derive(Error, Debug)]
pub enum RapikanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("Unsupported file extension: {0} (expected .csv, .xls or .xlsx)")]
    UnsupportedExtension(String),

    #[error("File contains no rows")]
    EmptyGrid,
}

pub type Result<T> = std::result::Result<T, RapikanError>;
