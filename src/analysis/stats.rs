use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// One entry of a count ranking. Rankings are ordered vectors rather than
/// maps so rank order survives JSON serialization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CountEntry {
    pub key: String,
    pub count: u64,
}

/// One entry of a summed ranking (e.g. bytes per address).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SumEntry {
    pub key: String,
    pub total: f64,
}

/// Occurrence counter that remembers first-seen order, so that rankings and
/// mode computations break ties by insertion order rather than by key.
#[derive(Clone, Debug, Default)]
pub struct Counter<K> {
    index: HashMap<K, usize>,
    entries: Vec<(K, u64)>,
}

impl<K: Eq + Hash + Clone + ToString> Counter<K> {
    pub fn new() -> Self {
        Counter {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    pub fn add(&mut self, key: K) {
        self.add_by(key, 1);
    }

    pub fn add_by(&mut self, key: K, amount: u64) {
        match self.index.get(&key) {
            Some(&slot) => self.entries[slot].1 += amount,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, amount));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries ordered by descending count; equal counts keep their
    /// first-seen order (stable sort).
    pub fn sorted_desc(&self) -> Vec<CountEntry> {
        let mut entries: Vec<&(K, u64)> = self.entries.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
            .into_iter()
            .map(|(key, count)| CountEntry {
                key: key.to_string(),
                count: *count,
            })
            .collect()
    }

    pub fn top_n(&self, n: usize) -> Vec<CountEntry> {
        let mut entries = self.sorted_desc();
        entries.truncate(n);
        entries
    }

    /// Most frequent key; ties resolve to the first-seen key.
    pub fn mode(&self) -> Option<&K> {
        let mut best: Option<(&K, u64)> = None;
        for (key, count) in &self.entries {
            match best {
                Some((_, best_count)) if *count <= best_count => {}
                _ => best = Some((key, *count)),
            }
        }
        best.map(|(key, _)| key)
    }
}

/// Groups items by a key, preserving first-seen group order and the input
/// order of items within each group.
pub fn group_by<'a, T, K, F>(items: &'a [T], key_fn: F) -> Vec<(K, Vec<&'a T>)>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&'a T>)> = Vec::new();
    for item in items {
        let key = key_fn(item);
        match index.get(&key) {
            Some(&slot) => groups[slot].1.push(item),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![item]));
            }
        }
    }
    groups
}

/// Top-n entries by value, descending; equal values keep input order.
pub fn nlargest(mut entries: Vec<SumEntry>, n: usize) -> Vec<SumEntry> {
    entries.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(std::cmp::Ordering::Equal));
    entries.truncate(n);
    entries
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divisor n).
pub fn std_pop(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mu = mean(values);
    (values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

/// Sample standard deviation (divisor n - 1), as used in describe().
pub fn std_sample(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mu = mean(values);
    (values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / (values.len() - 1) as f64).sqrt()
}

/// Quantile with linear interpolation between order statistics. Empty input
/// yields NaN, so comparisons against the result are uniformly false.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let weight = position - lower as f64;
    sorted[lower] * (1.0 - weight) + sorted[upper] * weight
}

/// Five-number summary plus count/mean/std over one numeric column.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DistributionSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

pub fn describe(values: &[f64]) -> DistributionSummary {
    if values.is_empty() {
        return DistributionSummary {
            count: 0,
            mean: 0.0,
            std: 0.0,
            min: 0.0,
            q25: 0.0,
            median: 0.0,
            q75: 0.0,
            max: 0.0,
        };
    }

    DistributionSummary {
        count: values.len(),
        mean: mean(values),
        std: std_sample(values),
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        q25: quantile(values, 0.25),
        median: quantile(values, 0.5),
        q75: quantile(values, 0.75),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}

/// Column-wise standardization to zero mean and unit variance, fit on the
/// batch being transformed. Constant columns keep a unit scale so they map
/// to all zeros instead of NaN.
pub fn standardize(matrix: &mut [Vec<f64>]) {
    if matrix.is_empty() {
        return;
    }
    let columns = matrix[0].len();
    for col in 0..columns {
        let values: Vec<f64> = matrix.iter().map(|row| row[col]).collect();
        let mu = mean(&values);
        let sigma = std_pop(&values);
        let scale = if sigma == 0.0 { 1.0 } else { sigma };
        for row in matrix.iter_mut() {
            row[col] = (row[col] - mu) / scale;
        }
    }
}
