// Batch report over the Madrid city council minor-contracts export.
//
// Loads the CSV once, prints the dataset and three sample queries, then
// ranks contractors and renders the ranking and evolution charts into the
// output directory. A missing input file is reported and ends the run
// without any analysis.
mod chart;
mod config;
mod dataset;
mod error;
mod grouping;
mod loader;
mod output;
mod reports;
mod types;
mod util;

use anyhow::Context;
use chart::{ChartRenderer, PlottersRenderer};
use config::ReportConfig;
use dataset::Dataset;
use log::{info, warn};

/// Print the sample queries and produce every chart and the summary.
fn run_reports(
    ds: &Dataset,
    skipped_rows: usize,
    config: &ReportConfig,
    renderer: &mut dyn ChartRenderer,
) -> error::Result<()> {
    output::print_table("Contratos menores (ordenados por año)", output::contract_rows(ds));

    let q = &config.queries;
    let rows = vec![
        output::query_row(
            format!("Facturación {} {:?}", q.contractor_nif, q.years),
            reports::contractor_billing(ds, &q.contractor_nif, &q.years),
        ),
        output::query_row(
            format!("Gasto {} {:?}", q.section, q.years),
            reports::section_spend(ds, &q.section, &q.years),
        ),
        output::query_row(
            format!(
                "Facturación {} a {} {:?}",
                q.section_contractor_nif, q.section, q.years
            ),
            reports::contractor_section_billing(
                ds,
                &q.section_contractor_nif,
                &q.section,
                &q.years,
            ),
        ),
    ];
    output::print_table("Consultas", rows);

    let r = &config.ranking;
    let dir = config.output_dir.as_path();

    let ranking = reports::top_contractors(ds, &r.years, r.top_n)?;
    output::print_table(
        &format!("{} empresas con mayor facturación {:?}", r.top_n, r.years),
        output::ranking_rows(&ranking),
    );
    renderer.render_bar(
        &chart::top_contractors_chart(&ranking, &r.years, r.top_n),
        &chart::top_contractors_path(dir, r.top_n),
    )?;

    let evolution = reports::contractor_evolution(ds, r.evolution_start, r.evolution_end, r.top_n)?;
    renderer.render_lines(
        &chart::contractor_evolution_chart(&evolution, r.top_n),
        &chart::contractor_evolution_path(dir, r.top_n),
    )?;

    let sections = reports::section_evolution(ds, r.evolution_start, r.evolution_end)?;
    renderer.render_lines(
        &chart::section_evolution_chart(&sections),
        &chart::section_evolution_path(dir, r.evolution_start, r.evolution_end),
    )?;

    let summary = reports::generate_summary(ds, skipped_rows);
    let summary_path = dir.join("resumen.json");
    output::write_json(&summary_path, &summary)?;
    info!("Summary written to {}", summary_path.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = ReportConfig::default();

    let (ds, load_report) = match loader::load_contracts(&config.input_path) {
        Ok(loaded) => loaded,
        Err(e) if e.is_missing_file() => {
            println!("El fichero {} no existe", config.input_path.display());
            return Ok(());
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("loading {}", config.input_path.display()))
        }
    };

    if ds.is_empty() {
        warn!("{} contains no usable contracts", config.input_path.display());
    }

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;
    let mut renderer = PlottersRenderer::new(config.charts.clone());
    run_reports(&ds, load_report.skipped_rows, &config, &mut renderer)
        .context("generating reports")?;
    Ok(())
}
