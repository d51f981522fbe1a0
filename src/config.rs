//! Run configuration. The binary takes no flags, so every run uses
//! [`ReportConfig::default`].

use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct ReportConfig {
    /// `;`-delimited contracts file.
    pub input_path: PathBuf,
    /// Directory receiving chart images and the JSON summary.
    pub output_dir: PathBuf,
    pub queries: QueryConfig,
    pub ranking: RankingConfig,
    pub charts: ChartConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("datos/datos-contratos-menores.csv"),
            output_dir: PathBuf::from("img"),
            queries: QueryConfig::default(),
            ranking: RankingConfig::default(),
            charts: ChartConfig::default(),
        }
    }
}

/// Parameters of the three scalar queries printed at start-up.
#[derive(Debug, Clone, Serialize)]
pub struct QueryConfig {
    pub contractor_nif: String,
    pub section: String,
    /// Contractor used for the contractor+section query.
    pub section_contractor_nif: String,
    pub years: Vec<i32>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            contractor_nif: "B28380582".to_string(),
            section: "EMPRESA MUNICIPAL DE TRANSPORTES S.A.".to_string(),
            section_contractor_nif: "B80176936".to_string(),
            years: vec![2018, 2019],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingConfig {
    /// Number of contractors in the top-N ranking and evolution chart.
    pub top_n: usize,
    /// Year set for the snapshot ranking.
    pub years: Vec<i32>,
    /// Inclusive year range for both evolution charts.
    pub evolution_start: i32,
    pub evolution_end: i32,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            years: vec![2018, 2019],
            evolution_start: 2017,
            evolution_end: 2019,
        }
    }
}

/// Pixel sizes of the rendered images.
#[derive(Debug, Clone, Serialize)]
pub struct ChartConfig {
    pub bar_size: (u32, u32),
    pub line_size: (u32, u32),
    /// Width reserved to the right of line charts for the legend.
    pub legend_width: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            bar_size: (600, 800),
            line_size: (1300, 400),
            legend_width: 300,
        }
    }
}
