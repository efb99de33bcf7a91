use std::cmp::Ordering;
use std::collections::HashMap;

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::data::{Cell, Column, ColumnKind};

/// Sum and mean of one time-index group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupStats {
    /// Number of non-missing values that went into the aggregates.
    pub count: usize,
    pub sum: f64,
    /// `None` when every value in the group was missing.
    pub mean: Option<f64>,
    /// Sum of a gap-free integer or boolean column, kept without rounding.
    pub exact_sum: Option<i128>,
}

impl GroupStats {
    /// Aggregate values, skipping missing ones. An all-missing group sums to 0.
    pub fn compute<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let (count, sum) = values
            .into_iter()
            .flatten()
            .fold((0usize, 0.0f64), |(n, s), v| (n + 1, s + v));
        let mean = if count == 0 { None } else { Some(sum / count as f64) };
        Self {
            count,
            sum,
            mean,
            exact_sum: None,
        }
    }

    /// Aggregate whole numbers, accumulating the sum as an integer.
    pub fn compute_exact<I>(values: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        let (count, exact) = values
            .into_iter()
            .fold((0usize, 0i128), |(n, s), v| (n + 1, s + i128::from(v)));
        let sum = exact as f64;
        let mean = if count == 0 { None } else { Some(sum / count as f64) };
        Self {
            count,
            sum,
            mean,
            exact_sum: Some(exact),
        }
    }
}

/// Per-group aggregates in grouping-key order.
#[derive(Debug, Clone, Default)]
pub struct StatsTable {
    groups: Vec<(String, GroupStats)>,
}

impl StatsTable {
    pub fn groups(&self) -> &[(String, GroupStats)] {
        &self.groups
    }

    pub fn get(&self, label: &str) -> Option<&GroupStats> {
        self.groups
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, s)| s)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(l, _)| l.as_str())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[derive(Debug)]
enum SortKey {
    Number(f64),
    Label(String),
}

impl SortKey {
    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Label(a), SortKey::Label(b)) => a.cmp(b),
            (SortKey::Number(_), SortKey::Label(_)) => Ordering::Less,
            (SortKey::Label(_), SortKey::Number(_)) => Ordering::Greater,
        }
    }
}

/// Shortest round-trip float text with a signed, two-digit exponent
/// (`1.0`, `2.5`, `1e+16`, `1.5e-05`).
pub fn float_label(v: f64) -> String {
    let text = format!("{v:?}");
    match text.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => text,
    }
}

/// Render a grouping key the way it appears in the JSON response.
pub fn key_label(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Missing => None,
        Cell::Integer(v) => Some(v.to_string()),
        Cell::Float(v) => Some(float_label(*v)),
        Cell::Bool(true) => Some("True".to_string()),
        Cell::Bool(false) => Some("False".to_string()),
        Cell::Text(s) => Some(s.clone()),
    }
}

fn numeric_key(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Integer(v) => Some(*v as f64),
        Cell::Float(v) => Some(*v),
        Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Cell::Missing | Cell::Text(_) => None,
    }
}

/// Split `values` by the cells of `keys`, ordered by key.
///
/// Rows with a missing key are dropped. Numeric keys sort numerically, text
/// keys by plain string comparison. An integer key column with gaps is
/// labelled like a float column (`1.0`).
fn grouped<T: Copy>(keys: &Column, values: &[T]) -> Vec<(String, Vec<T>)> {
    let float_labels = keys.kind == ColumnKind::Integer && keys.has_missing();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(SortKey, String, Vec<T>)> = Vec::new();

    for (cell, value) in keys.cells.iter().zip(values) {
        let label = match cell {
            Cell::Integer(v) if float_labels => Some(float_label(*v as f64)),
            other => key_label(other),
        };
        let Some(label) = label else {
            continue;
        };
        let slot = *index.entry(label.clone()).or_insert_with(|| {
            let sort = match numeric_key(cell) {
                Some(n) => SortKey::Number(n),
                None => SortKey::Label(label.clone()),
            };
            groups.push((sort, label, Vec::new()));
            groups.len() - 1
        });
        groups[slot].2.push(*value);
    }

    groups.sort_by(|a, b| a.0.compare(&b.0).then_with(|| a.1.cmp(&b.1)));
    groups
        .into_iter()
        .map(|(_, label, values)| (label, values))
        .collect()
}

/// Group `values` by the cells of `keys` and aggregate each group.
pub fn group_stats(keys: &Column, values: &[Option<f64>]) -> StatsTable {
    StatsTable {
        groups: grouped(keys, values)
            .into_iter()
            .map(|(label, values)| (label, GroupStats::compute(values)))
            .collect(),
    }
}

/// Like [`group_stats`] for gap-free whole numbers; sums stay exact.
pub fn group_exact_stats(keys: &Column, values: &[i64]) -> StatsTable {
    StatsTable {
        groups: grouped(keys, values)
            .into_iter()
            .map(|(label, values)| (label, GroupStats::compute_exact(values)))
            .collect(),
    }
}

struct StatsEntry<'a>(&'a GroupStats);

impl Serialize for StatsEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let stats = self.0;
        let mut state = serializer.serialize_struct("GroupStats", 2)?;
        match stats.exact_sum.map(i64::try_from) {
            Some(Ok(sum)) => state.serialize_field("sum", &sum)?,
            _ => state.serialize_field("sum", &stats.sum)?,
        }
        state.serialize_field("mean", &stats.mean)?;
        state.end()
    }
}

impl Serialize for StatsTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (label, stats) in &self.groups {
            map.serialize_entry(label, &StatsEntry(stats))?;
        }
        map.end()
    }
}
