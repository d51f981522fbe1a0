//! Chart descriptions and the renderer that turns them into PNG files.
//!
//! Report queries never touch plotting: they produce a [`BarChart`] or a
//! [`LineChart`], and a [`ChartRenderer`] writes it to a path.

use crate::config::ChartConfig;
use crate::error::{ReportError, Result};
use crate::grouping::{Pivot, Series};
use crate::types::RankedEntry;
use crate::util::format_years;
use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

/// One bar per label, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub y_label: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// Multi-series line chart over consecutive years.
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub y_label: String,
    pub years: Vec<i32>,
    pub series: Vec<Series>,
}

pub trait ChartRenderer {
    fn render_bar(&mut self, chart: &BarChart, path: &Path) -> Result<()>;
    fn render_lines(&mut self, chart: &LineChart, path: &Path) -> Result<()>;
}

pub fn top_contractors_chart(ranking: &[RankedEntry], years: &[i32], n: usize) -> BarChart {
    BarChart {
        title: format!("{} empresas con mayor facturación (años {})", n, format_years(years)),
        y_label: "Importe total en €".to_string(),
        labels: ranking.iter().map(|e| e.name.clone()).collect(),
        values: ranking.iter().map(|e| e.totals.sum).collect(),
    }
}

pub fn contractor_evolution_chart(table: &Pivot, n: usize) -> LineChart {
    LineChart {
        title: format!("Evolución facturacion {} empresas con mayor facturación", n),
        y_label: "Importe anual en €".to_string(),
        years: table.years.clone(),
        series: table.series.clone(),
    }
}

pub fn section_evolution_chart(table: &Pivot) -> LineChart {
    LineChart {
        title: "Evolución facturacion por secciones".to_string(),
        y_label: "Importe anual en €".to_string(),
        years: table.years.clone(),
        series: table.series.clone(),
    }
}

pub fn top_contractors_path(dir: &Path, n: usize) -> PathBuf {
    dir.join(format!("empresas-mayor-facturacion-{n}.png"))
}

pub fn contractor_evolution_path(dir: &Path, n: usize) -> PathBuf {
    dir.join(format!("evolucion-empresas-mayor-facturacion{n}.png"))
}

pub fn section_evolution_path(dir: &Path, start: i32, end: i32) -> PathBuf {
    dir.join(format!("evolucion-secciones-{start}:{end}.png"))
}

/// Split a series into runs of consecutive years with a value, so that
/// missing years are drawn as gaps.
fn segments(years: &[i32], values: &[Option<f64>]) -> Vec<Vec<(i32, f64)>> {
    let mut runs: Vec<Vec<(i32, f64)>> = Vec::new();
    let mut current: Vec<(i32, f64)> = Vec::new();
    for (year, value) in years.iter().zip(values) {
        match value {
            Some(v) => current.push((*year, *v)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Tick text for the year axis. The axis may extend past the last year when
/// the range holds a single year; those ticks stay blank.
fn year_tick_label(years: &[i32], year: i32) -> String {
    if years.contains(&year) {
        year.to_string()
    } else {
        String::new()
    }
}

fn upper_bound(max: Option<f64>) -> f64 {
    match max {
        Some(m) if m > 0.0 => m * 1.05,
        _ => 1.0,
    }
}

type DrawResult = std::result::Result<(), Box<dyn std::error::Error>>;

/// Draws charts as PNG files with `plotters`.
pub struct PlottersRenderer {
    config: ChartConfig,
}

impl PlottersRenderer {
    pub fn new(config: ChartConfig) -> Self {
        Self { config }
    }

    fn draw_bar(&self, chart: &BarChart, path: &Path) -> DrawResult {
        let root = BitMapBackend::new(path, self.config.bar_size).into_drawing_area();
        root.fill(&WHITE)?;
        let bars = chart.values.len().max(1) as i32;
        let y_max = upper_bound(chart.values.iter().copied().reduce(f64::max));
        let labels = &chart.labels;

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 18))
            .margin(10)
            .x_label_area_size((self.config.bar_size.1 as f64 * 0.45) as u32)
            .y_label_area_size(90)
            .build_cartesian_2d((0..bars).into_segmented(), 0f64..y_max)?;
        ctx.configure_mesh()
            .disable_x_mesh()
            .y_desc(chart.y_label.as_str())
            .x_labels(bars as usize)
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .x_label_style(
                ("sans-serif", 12)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .y_label_formatter(&|v| format!("{:.0}", v))
            .draw()?;
        ctx.draw_series(
            Histogram::vertical(&ctx)
                .style(BLUE.filled())
                .margin(8)
                .data(chart.values.iter().enumerate().map(|(i, v)| (i as i32, *v))),
        )?;
        root.present()?;
        Ok(())
    }

    fn draw_lines(&self, chart: &LineChart, path: &Path) -> DrawResult {
        let root = BitMapBackend::new(path, self.config.line_size).into_drawing_area();
        root.fill(&WHITE)?;
        let plot_width = self
            .config
            .line_size
            .0
            .saturating_sub(self.config.legend_width) as i32;
        let (plot_area, legend_area) = root.split_horizontally(plot_width);

        let (first, last) = match (chart.years.first(), chart.years.last()) {
            (Some(f), Some(l)) => (*f, *l),
            _ => (0, 1),
        };
        let y_max = upper_bound(
            chart
                .series
                .iter()
                .flat_map(|s| s.values.iter().flatten().copied())
                .reduce(f64::max),
        );

        let mut ctx = ChartBuilder::on(&plot_area)
            .caption(&chart.title, ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(90)
            .build_cartesian_2d(first..last.max(first + 1), 0f64..y_max)?;
        ctx.configure_mesh()
            .x_labels(chart.years.len().max(2))
            .x_label_formatter(&|y| year_tick_label(&chart.years, *y))
            .y_desc(chart.y_label.as_str())
            .y_label_formatter(&|v| format!("{:.0}", v))
            .draw()?;

        for (idx, series) in chart.series.iter().enumerate() {
            let color = Palette99::pick(idx);
            for run in segments(&chart.years, &series.values) {
                ctx.draw_series(LineSeries::new(run.clone(), color.stroke_width(2)))?;
                ctx.draw_series(
                    run.into_iter()
                        .map(|point| Circle::new(point, 3, color.filled())),
                )?;
            }
        }

        draw_legend(&legend_area, &chart.series)?;
        root.present()?;
        Ok(())
    }
}

/// Legend drawn in its own area to the right of the plot.
fn draw_legend<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, series: &[Series]) -> DrawResult
where
    DB::ErrorType: 'static,
{
    let (_, height) = area.dim_in_pixel();
    let line_height = 18i32;
    let top = (height as i32 - line_height * series.len() as i32).max(0) / 2;
    for (idx, s) in series.iter().enumerate() {
        let y = top + line_height * idx as i32 + line_height / 2;
        let color = Palette99::pick(idx);
        area.draw(&PathElement::new(
            vec![(10, y), (40, y)],
            color.stroke_width(2),
        ))?;
        area.draw(&Text::new(
            s.label.clone(),
            (48, y - 6),
            ("sans-serif", 13).into_font(),
        ))?;
    }
    Ok(())
}

impl ChartRenderer for PlottersRenderer {
    fn render_bar(&mut self, chart: &BarChart, path: &Path) -> Result<()> {
        self.draw_bar(chart, path)
            .map_err(|e| ReportError::Chart(format!("{}: {}", path.display(), e)))?;
        info!("Saved bar chart to {}", path.display());
        Ok(())
    }

    fn render_lines(&mut self, chart: &LineChart, path: &Path) -> Result<()> {
        self.draw_lines(chart, path)
            .map_err(|e| ReportError::Chart(format!("{}: {}", path.display(), e)))?;
        info!("Saved line chart to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::Totals;

    /// Records what would have been drawn instead of writing images.
    #[derive(Default)]
    pub(crate) struct RecordingRenderer {
        pub bars: Vec<(BarChart, PathBuf)>,
        pub lines: Vec<(LineChart, PathBuf)>,
    }

    impl ChartRenderer for RecordingRenderer {
        fn render_bar(&mut self, chart: &BarChart, path: &Path) -> Result<()> {
            self.bars.push((chart.clone(), path.to_path_buf()));
            Ok(())
        }

        fn render_lines(&mut self, chart: &LineChart, path: &Path) -> Result<()> {
            self.lines.push((chart.clone(), path.to_path_buf()));
            Ok(())
        }
    }

    #[test]
    fn bar_chart_from_ranking() {
        let ranking = vec![
            RankedEntry {
                nif: "B".into(),
                name: "Beta SA".into(),
                totals: Totals { count: 1, sum: 200.0 },
            },
            RankedEntry {
                nif: "A".into(),
                name: "Alfa SL".into(),
                totals: Totals { count: 2, sum: 150.0 },
            },
        ];
        let chart = top_contractors_chart(&ranking, &[2018, 2019], 10);
        assert_eq!(chart.title, "10 empresas con mayor facturación (años [2018, 2019])");
        assert_eq!(chart.y_label, "Importe total en €");
        assert_eq!(chart.labels, vec!["Beta SA", "Alfa SL"]);
        assert_eq!(chart.values, vec![200.0, 150.0]);
    }

    #[test]
    fn output_paths_are_keyed_by_parameters() {
        let dir = Path::new("img");
        assert_eq!(
            top_contractors_path(dir, 10),
            PathBuf::from("img/empresas-mayor-facturacion-10.png")
        );
        assert_eq!(
            contractor_evolution_path(dir, 5),
            PathBuf::from("img/evolucion-empresas-mayor-facturacion5.png")
        );
        assert_eq!(
            section_evolution_path(dir, 2017, 2019),
            PathBuf::from("img/evolucion-secciones-2017:2019.png")
        );
    }

    #[test]
    fn gaps_split_line_segments() {
        let years = [2015, 2016, 2017, 2018, 2019];
        let values = [Some(1.0), Some(2.0), None, Some(4.0), None];
        assert_eq!(
            segments(&years, &values),
            vec![vec![(2015, 1.0), (2016, 2.0)], vec![(2018, 4.0)]]
        );
        assert!(segments(&years, &[None; 5]).is_empty());
    }

    #[test]
    fn single_year_axis_labels_only_that_year() {
        let years = [2019];
        assert_eq!(year_tick_label(&years, 2019), "2019");
        assert_eq!(year_tick_label(&years, 2020), "");
        assert_eq!(year_tick_label(&[], 0), "");
    }

    #[test]
    fn empty_charts_get_a_unit_axis() {
        assert_eq!(upper_bound(None), 1.0);
        assert_eq!(upper_bound(Some(0.0)), 1.0);
        assert_eq!(upper_bound(Some(100.0)), 105.0);
    }
}
