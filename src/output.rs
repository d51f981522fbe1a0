use crate::dataset::Dataset;
use crate::error::Result;
use crate::types::{ContractRow, QueryRow, RankedEntry, RankingRow, Totals};
use crate::util::{format_euros, format_int};
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Render rows as a markdown table, or `(no rows)` when empty.
pub fn render_table<T: Tabled>(rows: Vec<T>) -> String {
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(rows).with(Style::markdown()).to_string()
}

pub fn print_table<T: Tabled>(title: &str, rows: Vec<T>) {
    println!("{}\n", title);
    println!("{}\n", render_table(rows));
}

pub fn contract_rows(ds: &Dataset) -> Vec<ContractRow> {
    ds.records()
        .iter()
        .map(|r| ContractRow {
            year: r.year,
            nif: r.nif.clone(),
            contractor: r.contractor.clone(),
            section: r.section.clone(),
            amount: format_euros(r.amount),
        })
        .collect()
}

pub fn query_row(query: impl Into<String>, totals: Totals) -> QueryRow {
    QueryRow {
        query: query.into(),
        count: format_int(totals.count),
        total: format_euros(totals.sum),
    }
}

pub fn ranking_rows(ranking: &[RankedEntry]) -> Vec<RankingRow> {
    ranking
        .iter()
        .enumerate()
        .map(|(idx, e)| RankingRow {
            rank: idx + 1,
            nif: e.nif.clone(),
            name: e.name.clone(),
            count: format_int(e.totals.count),
            total: format_euros(e.totals.sum),
        })
        .collect()
}
