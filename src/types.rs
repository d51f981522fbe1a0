use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One CSV row as it appears in the open-data export. Extra columns are
/// ignored by the deserializer.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "NIF")]
    pub nif: Option<String>,
    #[serde(rename = "CONTRATISTA")]
    pub contractor: Option<String>,
    #[serde(rename = "SECCION")]
    pub section: Option<String>,
    #[serde(rename = "AÑO")]
    pub year: Option<String>,
    #[serde(rename = "IMPORTE")]
    pub amount: Option<String>,
}

/// A minor contract awarded to a contractor by a section in a given year.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractRecord {
    pub nif: String,
    pub contractor: String,
    pub section: String,
    pub year: i32,
    pub amount: f64,
}

/// Number of matching contracts and the sum of their amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub count: usize,
    pub sum: f64,
}

impl Totals {
    pub fn add(&mut self, amount: f64) {
        self.count += 1;
        self.sum += amount;
    }
}

/// A contractor in a top-N ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub nif: String,
    pub name: String,
    pub totals: Totals,
}

#[derive(Debug, Tabled, Clone)]
pub struct ContractRow {
    #[tabled(rename = "AÑO")]
    pub year: i32,
    #[tabled(rename = "NIF")]
    pub nif: String,
    #[tabled(rename = "CONTRATISTA")]
    pub contractor: String,
    #[tabled(rename = "SECCION")]
    pub section: String,
    #[tabled(rename = "IMPORTE")]
    pub amount: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct QueryRow {
    #[tabled(rename = "Consulta")]
    pub query: String,
    #[tabled(rename = "Número de contratos")]
    pub count: String,
    #[tabled(rename = "Total")]
    pub total: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct RankingRow {
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[tabled(rename = "NIF")]
    pub nif: String,
    #[tabled(rename = "Contratista")]
    pub name: String,
    #[tabled(rename = "Contratos")]
    pub count: String,
    #[tabled(rename = "Importe total")]
    pub total: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_records: usize,
    pub skipped_rows: usize,
    pub total_contractors: usize,
    pub total_sections: usize,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
    pub total_amount: f64,
    pub generated_at: String,
}
