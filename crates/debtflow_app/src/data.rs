// SPDX-License-Identifier: MIT OR Apache-2.0
//! Debt data loading.
//!
//! The data is a CSV with a `source,target,value` header: `source` owes
//! `target` an amount of `value` billion dollars.

use crate::error::AppError;
use debtflow_graph::DebtRecord;
use std::io::Read;
use std::path::Path;

/// Read debt records from a CSV file
pub fn load_records(path: &Path) -> Result<Vec<DebtRecord>, AppError> {
    let file = std::fs::File::open(path)?;
    let records = read_records(file)?;
    tracing::info!("Loaded {} debt records from {}", records.len(), path.display());
    Ok(records)
}

/// Read debt records from any CSV source
pub fn read_records(reader: impl Read) -> Result<Vec<DebtRecord>, AppError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: DebtRecord = result?;
        records.push(record);
    }
    Ok(records)
}
