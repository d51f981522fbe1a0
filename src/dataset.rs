use crate::error::{ReportError, Result};
use crate::types::ContractRecord;
use std::collections::{BTreeSet, HashMap};

/// The loaded contracts, sorted by year, plus the NIF → name index.
///
/// Read-only once built: every query borrows it.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<ContractRecord>,
    names: HashMap<String, String>,
}

impl Dataset {
    /// Sort the records by year and index contractor names.
    ///
    /// The sort is stable, so rows of the same year keep their file order.
    /// When a NIF appears under several names the first one (in year order)
    /// wins.
    pub fn from_records(mut records: Vec<ContractRecord>) -> Self {
        records.sort_by_key(|r| r.year);
        let mut names: HashMap<String, String> = HashMap::new();
        for r in &records {
            names
                .entry(r.nif.clone())
                .or_insert_with(|| r.contractor.clone());
        }
        Dataset { records, names }
    }

    pub fn records(&self) -> &[ContractRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Display name of the contractor with the given NIF.
    pub fn contractor_name(&self, nif: &str) -> Result<&str> {
        self.names
            .get(nif)
            .map(String::as_str)
            .ok_or_else(|| ReportError::contractor_not_found(nif))
    }

    pub fn contractor_count(&self) -> usize {
        self.names.len()
    }

    pub fn section_count(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.section.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// First and last year present, `None` when empty.
    pub fn year_span(&self) -> Option<(i32, i32)> {
        let first = self.records.first()?.year;
        let last = self.records.last()?.year;
        Some((first, last))
    }

    pub fn total_amount(&self) -> f64 {
        self.records.iter().map(|r| r.amount).sum()
    }
}

#[cfg(test)]
pub(crate) fn record(nif: &str, name: &str, section: &str, year: i32, amount: f64) -> ContractRecord {
    ContractRecord {
        nif: nif.to_string(),
        contractor: name.to_string(),
        section: section.to_string(),
        year,
        amount,
    }
}
