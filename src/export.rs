use std::path::Path;

use crate::error::Result;
use crate::walker::LedgerRecord;

/// Serialize the record sequence to CSV. Column captions come from the
/// serde renames on `LedgerRecord` (Tanggal, Nama Akun, Tipe Akun,
/// Keterangan, Debit, Kredit, Saldo). Display formatting such as currency
/// styles is left to whatever opens the file.
pub fn write_csv(records: &[LedgerRecord], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}
