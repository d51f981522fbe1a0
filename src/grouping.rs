// Group-by, ranking and pivot primitives used by the report queries.
//
// Groups come back in the order their key first appears in the input. Since
// the dataset is sorted by year, that is also the tie-break for rankings.
use crate::types::{ContractRecord, Totals};
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Sum amounts per key, keeping first-appearance order of the keys.
pub fn group_sum<'a, K, I, F>(records: I, key: F) -> Vec<(K, Totals)>
where
    I: IntoIterator<Item = &'a ContractRecord>,
    K: Eq + Hash + Clone,
    F: Fn(&ContractRecord) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Totals)> = Vec::new();
    for r in records {
        let k = key(r);
        let slot = *index.entry(k.clone()).or_insert_with(|| {
            groups.push((k, Totals::default()));
            groups.len() - 1
        });
        groups[slot].1.add(r.amount);
    }
    groups
}

/// Stable descending sort by summed amount: equal totals keep their order.
pub fn rank_desc<K>(groups: &mut [(K, Totals)]) {
    groups.sort_by(|a, b| b.1.sum.total_cmp(&a.1.sum));
}

/// One line of an evolution chart: a value per year, `None` for no activity.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub values: Vec<Option<f64>>,
}

/// Year-indexed table with one column per entity.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pivot {
    pub years: Vec<i32>,
    pub series: Vec<Series>,
}

impl Pivot {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, label: &str, year: i32) -> Option<f64> {
        let row = self.years.iter().position(|y| *y == year)?;
        self.series
            .iter()
            .find(|s| s.label == label)
            .and_then(|s| s.values[row])
    }
}

/// Reshape `((year, label), amount)` cells into a [`Pivot`] with a row for
/// every year in `start..=end` and columns ordered by label. Cells for the
/// same `(year, label)` pair are added together; cells outside the range are
/// dropped.
pub fn pivot<I>(cells: I, start: i32, end: i32) -> Pivot
where
    I: IntoIterator<Item = ((i32, String), f64)>,
{
    let years: Vec<i32> = (start..=end).collect();
    let mut columns: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();
    for ((year, label), amount) in cells {
        if year < start || year > end {
            continue;
        }
        let row = (year - start) as usize;
        let column = columns
            .entry(label)
            .or_insert_with(|| vec![None; years.len()]);
        let cell = &mut column[row];
        *cell = Some(cell.unwrap_or(0.0) + amount);
    }
    let series = columns
        .into_iter()
        .map(|(label, values)| Series { label, values })
        .collect();
    Pivot { years, series }
}
