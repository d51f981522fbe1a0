use crate::dataset::Dataset;
use crate::error::{ReportError, Result};
use crate::grouping::{group_sum, pivot, rank_desc, Pivot};
use crate::types::{ContractRecord, RankedEntry, SummaryStats, Totals};
use log::{debug, warn};
use std::collections::{HashMap, HashSet};

fn totals_where<F>(ds: &Dataset, pred: F) -> Totals
where
    F: Fn(&ContractRecord) -> bool,
{
    ds.records()
        .iter()
        .filter(|r| pred(r))
        .fold(Totals::default(), |mut acc, r| {
            acc.add(r.amount);
            acc
        })
}

/// Contracts and amount billed by one contractor during the given years.
pub fn contractor_billing(ds: &Dataset, nif: &str, years: &[i32]) -> Totals {
    totals_where(ds, |r| r.nif == nif && years.contains(&r.year))
}

/// Contracts and amount spent by one section during the given years.
pub fn section_spend(ds: &Dataset, section: &str, years: &[i32]) -> Totals {
    totals_where(ds, |r| r.section == section && years.contains(&r.year))
}

/// Contracts and amount billed by one contractor to one section during the
/// given years.
pub fn contractor_section_billing(ds: &Dataset, nif: &str, section: &str, years: &[i32]) -> Totals {
    totals_where(ds, |r| {
        r.nif == nif && r.section == section && years.contains(&r.year)
    })
}

/// Rank contractors by amount over `records` and resolve the first `n` names.
fn rank_contractors<'a, I>(ds: &Dataset, records: I, n: usize) -> Result<Vec<RankedEntry>>
where
    I: IntoIterator<Item = &'a ContractRecord>,
{
    let mut groups = group_sum(records, |r| r.nif.clone());
    debug!("ranking {} contractors, keeping {}", groups.len(), n);
    rank_desc(&mut groups);
    groups
        .into_iter()
        .take(n)
        .map(|(nif, totals)| {
            let name = ds.contractor_name(&nif)?.to_string();
            Ok(RankedEntry { nif, name, totals })
        })
        .collect()
}

/// The `n` contractors with the largest total amount during `years`,
/// highest first. Equal totals keep the order in which the contractors first
/// appear in the year-sorted dataset.
pub fn top_contractors(ds: &Dataset, years: &[i32], n: usize) -> Result<Vec<RankedEntry>> {
    let filtered = ds.records().iter().filter(|r| years.contains(&r.year));
    let ranked = rank_contractors(ds, filtered, n)?;
    if ranked.is_empty() {
        warn!("no contracts in years {:?}; ranking is empty", years);
    }
    Ok(ranked)
}

fn check_range(start: i32, end: i32) -> Result<()> {
    if start > end {
        return Err(ReportError::InvalidYearRange { start, end });
    }
    Ok(())
}

/// Yearly totals of the `n` contractors with the largest amount over
/// `start..=end`. The ranking is computed once over the whole range.
pub fn contractor_evolution(ds: &Dataset, start: i32, end: i32, n: usize) -> Result<Pivot> {
    check_range(start, end)?;
    let in_range: Vec<&ContractRecord> = ds
        .records()
        .iter()
        .filter(|r| (start..=end).contains(&r.year))
        .collect();
    let top = rank_contractors(ds, in_range.iter().copied(), n)?;
    let selected: HashSet<&str> = top.iter().map(|e| e.nif.as_str()).collect();

    let groups = group_sum(
        in_range
            .iter()
            .copied()
            .filter(|r| selected.contains(r.nif.as_str())),
        |r| (r.year, r.nif.clone()),
    );
    debug!("contractor evolution: {} (year, NIF) groups", groups.len());
    let mut table = pivot(
        groups.into_iter().map(|(key, totals)| (key, totals.sum)),
        start,
        end,
    );
    label_by_name(ds, &mut table)?;
    if table.is_empty() {
        warn!("no contractor activity in {}..={}", start, end);
    }
    Ok(table)
}

/// Replace NIF column labels with contractor names. Names shared by several
/// NIFs get the NIF appended so each contractor keeps its own series.
fn label_by_name(ds: &Dataset, table: &mut Pivot) -> Result<()> {
    let names: Vec<String> = table
        .series
        .iter()
        .map(|s| ds.contractor_name(&s.label).map(str::to_string))
        .collect::<Result<_>>()?;
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for name in &names {
        *seen.entry(name.as_str()).or_default() += 1;
    }
    for (series, name) in table.series.iter_mut().zip(&names) {
        series.label = if seen[name.as_str()] > 1 {
            format!("{} ({})", name, series.label)
        } else {
            name.clone()
        };
    }
    table.series.sort_by(|a, b| a.label.cmp(&b.label));
    Ok(())
}

/// Yearly spend of every section active in `start..=end`. Contracts with a
/// blank section are left out of the grouping.
pub fn section_evolution(ds: &Dataset, start: i32, end: i32) -> Result<Pivot> {
    check_range(start, end)?;
    let groups = group_sum(
        ds.records()
            .iter()
            .filter(|r| (start..=end).contains(&r.year) && !r.section.is_empty()),
        |r| (r.year, r.section.clone()),
    );
    debug!("section evolution: {} (year, section) groups", groups.len());
    let table = pivot(
        groups.into_iter().map(|(key, totals)| (key, totals.sum)),
        start,
        end,
    );
    if table.is_empty() {
        warn!("no section activity in {}..={}", start, end);
    }
    Ok(table)
}

pub fn generate_summary(ds: &Dataset, skipped_rows: usize) -> SummaryStats {
    let span = ds.year_span();
    SummaryStats {
        total_records: ds.len(),
        skipped_rows,
        total_contractors: ds.contractor_count(),
        total_sections: ds.section_count(),
        first_year: span.map(|(first, _)| first),
        last_year: span.map(|(_, last)| last),
        total_amount: ds.total_amount(),
        generated_at: chrono::Utc::now().to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::record;

    fn three_records() -> Dataset {
        Dataset::from_records(vec![
            record("A", "Alfa SL", "S1", 2018, 100.0),
            record("A", "Alfa SL", "S1", 2019, 50.0),
            record("B", "Beta SA", "S2", 2018, 200.0),
        ])
    }

    fn wider() -> Dataset {
        Dataset::from_records(vec![
            record("A", "Alfa SL", "S1", 2017, 10.0),
            record("B", "Beta SA", "S2", 2017, 40.0),
            record("C", "Gamma", "S1", 2018, 25.0),
            record("A", "Alfa SL", "S2", 2018, 30.0),
            record("B", "Beta SA", "S1", 2019, 5.0),
            record("D", "Delta", "S3", 2019, 1.0),
            record("A", "Alfa SL", "S1", 2020, 500.0),
        ])
    }

    #[test]
    fn contractor_billing_scenario() {
        let ds = three_records();
        assert_eq!(
            contractor_billing(&ds, "A", &[2018, 2019]),
            Totals { count: 2, sum: 150.0 }
        );
        assert_eq!(
            contractor_billing(&ds, "A", &[2019]),
            Totals { count: 1, sum: 50.0 }
        );
    }

    #[test]
    fn empty_filters_yield_zero_totals() {
        let ds = three_records();
        assert_eq!(contractor_billing(&ds, "A", &[]), Totals::default());
        assert_eq!(section_spend(&ds, "S9", &[2018]), Totals::default());
        assert_eq!(
            contractor_section_billing(&ds, "Z", "S1", &[2018, 2019]),
            Totals { count: 0, sum: 0.0 }
        );
    }

    #[test]
    fn combined_filter_is_bounded_by_single_filters() {
        let ds = wider();
        let years = [2017, 2018, 2019];
        for nif in ["A", "B", "C", "D"] {
            for section in ["S1", "S2", "S3"] {
                let both = contractor_section_billing(&ds, nif, section, &years);
                let by_nif = contractor_billing(&ds, nif, &years);
                let by_section = section_spend(&ds, section, &years);
                assert!(both.count <= by_nif.count.min(by_section.count));
            }
        }
        assert_eq!(
            section_spend(&ds, "S1", &[2017, 2019]),
            Totals { count: 2, sum: 15.0 }
        );
    }

    #[test]
    fn queries_are_idempotent() {
        let ds = wider();
        let before = ds.records().to_vec();
        assert_eq!(
            contractor_billing(&ds, "A", &[2018, 2020]),
            contractor_billing(&ds, "A", &[2018, 2020])
        );
        assert_eq!(
            top_contractors(&ds, &[2017, 2018], 3).unwrap(),
            top_contractors(&ds, &[2017, 2018], 3).unwrap()
        );
        assert_eq!(
            section_evolution(&ds, 2017, 2019).unwrap(),
            section_evolution(&ds, 2017, 2019).unwrap()
        );
        assert_eq!(ds.records(), before.as_slice());
    }

    #[test]
    fn top_one_scenario() {
        let ds = three_records();
        let top = top_contractors(&ds, &[2018, 2019], 1).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].nif, "B");
        assert_eq!(top[0].name, "Beta SA");
        assert_eq!(top[0].totals.sum, 200.0);
    }

    #[test]
    fn top_contractors_is_descending_and_capped() {
        let ds = wider();
        let top = top_contractors(&ds, &[2017, 2018, 2019], 10).unwrap();
        assert_eq!(top.len(), 4);
        for pair in top.windows(2) {
            assert!(pair[0].totals.sum >= pair[1].totals.sum);
        }
        let total: f64 = top.iter().map(|e| e.totals.sum).sum();
        let expected: f64 = ds
            .records()
            .iter()
            .filter(|r| r.year <= 2019)
            .map(|r| r.amount)
            .sum();
        assert_eq!(total, expected);
        assert!(top_contractors(&ds, &[2017], 0).unwrap().is_empty());
        assert!(top_contractors(&ds, &[1999], 5).unwrap().is_empty());
    }

    #[test]
    fn contractor_evolution_ranks_over_whole_range() {
        let ds = wider();
        // Over 2017..=2019: B 45, A 40, C 25, D 1.
        let table = contractor_evolution(&ds, 2017, 2019, 2).unwrap();
        assert_eq!(table.years, vec![2017, 2018, 2019]);
        let labels: Vec<&str> = table.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Alfa SL", "Beta SA"]);
        assert_eq!(table.get("Alfa SL", 2017), Some(10.0));
        assert_eq!(table.get("Alfa SL", 2018), Some(30.0));
        assert_eq!(table.get("Alfa SL", 2019), None);
        assert_eq!(table.get("Beta SA", 2018), None);
        assert_eq!(table.get("Beta SA", 2019), Some(5.0));
    }

    #[test]
    fn section_evolution_includes_every_section() {
        let ds = wider();
        let table = section_evolution(&ds, 2018, 2020).unwrap();
        let labels: Vec<&str> = table.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["S1", "S2", "S3"]);
        assert_eq!(table.get("S1", 2020), Some(500.0));
        assert_eq!(table.get("S3", 2018), None);
        let grouped: f64 = table
            .series
            .iter()
            .flat_map(|s| s.values.iter().flatten())
            .sum();
        assert_eq!(grouped, 561.0);
    }

    #[test]
    fn contractors_sharing_a_name_keep_separate_series() {
        let ds = Dataset::from_records(vec![
            record("A1", "UTE Limpieza", "S1", 2018, 100.0),
            record("A2", "UTE Limpieza", "S1", 2018, 80.0),
            record("B", "Beta SA", "S2", 2018, 10.0),
        ]);
        let table = contractor_evolution(&ds, 2018, 2018, 2).unwrap();
        let labels: Vec<&str> = table.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["UTE Limpieza (A1)", "UTE Limpieza (A2)"]);
        assert_eq!(table.get("UTE Limpieza (A1)", 2018), Some(100.0));
        assert_eq!(table.get("UTE Limpieza (A2)", 2018), Some(80.0));
    }

    #[test]
    fn blank_sections_are_not_a_series() {
        let ds = Dataset::from_records(vec![
            record("A", "Alfa SL", "S1", 2018, 10.0),
            record("B", "Beta SA", "", 2018, 20.0),
        ]);
        let table = section_evolution(&ds, 2018, 2018).unwrap();
        let labels: Vec<&str> = table.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["S1"]);
        assert_eq!(contractor_billing(&ds, "B", &[2018]).sum, 20.0);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let ds = wider();
        assert!(matches!(
            section_evolution(&ds, 2019, 2017),
            Err(ReportError::InvalidYearRange { start: 2019, end: 2017 })
        ));
        assert!(matches!(
            contractor_evolution(&ds, 2019, 2017, 3),
            Err(ReportError::InvalidYearRange { .. })
        ));
    }

    #[test]
    fn summary_counts() {
        let ds = wider();
        let s = generate_summary(&ds, 2);
        assert_eq!(s.total_records, 7);
        assert_eq!(s.skipped_rows, 2);
        assert_eq!(s.total_contractors, 4);
        assert_eq!(s.total_sections, 3);
        assert_eq!((s.first_year, s.last_year), (Some(2017), Some(2020)));
        assert_eq!(s.total_amount, 611.0);
    }
}
