use crate::dataset::Dataset;
use crate::error::Result;
use crate::types::{ContractRecord, RawRow};
use crate::util::{parse_f64_safe, parse_i32_safe};
use csv::ReaderBuilder;
use log::{debug, info, warn};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub skipped_rows: usize,
}

/// Read the `;`-delimited contracts export into a year-sorted [`Dataset`].
///
/// Rows whose NIF is blank or whose year or amount cannot be parsed are
/// skipped and counted in the returned [`LoadReport`].
pub fn load_contracts(path: &Path) -> Result<(Dataset, LoadReport)> {
    let rdr = ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_path(path)?;
    let (dataset, report) = read_contracts(rdr)?;
    info!(
        "Loaded {} contracts from {} ({} rows skipped)",
        report.loaded_rows,
        path.display(),
        report.skipped_rows
    );
    Ok((dataset, report))
}

fn read_contracts<R: std::io::Read>(mut rdr: csv::Reader<R>) -> Result<(Dataset, LoadReport)> {
    let mut total_rows = 0usize;
    let mut skipped_rows = 0usize;
    let mut records: Vec<ContractRecord> = Vec::new();

    for (idx, result) in rdr.deserialize::<RawRow>().enumerate() {
        total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!("row {}: {}", idx + 1, e);
                skipped_rows += 1;
                continue;
            }
        };
        let Some(record) = clean_row(row) else {
            debug!("row {}: missing NIF or unparseable year/amount", idx + 1);
            skipped_rows += 1;
            continue;
        };
        records.push(record);
    }

    if skipped_rows > 0 {
        warn!("Skipped {} malformed rows", skipped_rows);
    }
    let loaded_rows = records.len();
    let report = LoadReport {
        total_rows,
        loaded_rows,
        skipped_rows,
    };
    Ok((Dataset::from_records(records), report))
}

fn clean_row(row: RawRow) -> Option<ContractRecord> {
    let nif = row.nif.as_deref().map(str::trim).filter(|s| !s.is_empty())?.to_string();
    let year = parse_i32_safe(row.year.as_deref())?;
    let amount = parse_f64_safe(row.amount.as_deref())?;
    let contractor = row
        .contractor
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| nif.clone());
    let section = row
        .section
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    Some(ContractRecord {
        nif,
        contractor,
        section,
        year,
        amount,
    })
}
