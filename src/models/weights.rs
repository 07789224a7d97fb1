use super::stat::StatKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-stat importance for the current build.
/// A zero or absent weight means the stat does not influence scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightVector(BTreeMap<StatKey, f64>);

impl WeightVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Weight for a stat, 0.0 when absent
    pub fn get(&self, key: StatKey) -> f64 {
        self.0.get(&key).copied().unwrap_or(0.0)
    }

    /// Set a weight. Negative and non-finite weights are stored as 0.0.
    pub fn set(&mut self, key: StatKey, weight: f64) {
        let weight = if weight.is_finite() { weight.max(0.0) } else { 0.0 };
        self.0.insert(key, weight);
    }

    /// Add to a stat's weight (weights accumulate, they never override)
    pub fn add(&mut self, key: StatKey, weight: f64) {
        let merged = self.get(key) + weight;
        self.set(key, merged);
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|w| *w <= 0.0)
    }

    /// Weighted stats (weight > 0) in vocabulary order
    pub fn iter(&self) -> impl Iterator<Item = (StatKey, f64)> + '_ {
        self.0
            .iter()
            .map(|(k, w)| (*k, *w))
            .filter(|(_, w)| *w > 0.0)
    }
}

impl FromIterator<(StatKey, f64)> for WeightVector {
    fn from_iter<I: IntoIterator<Item = (StatKey, f64)>>(iter: I) -> Self {
        let mut weights = WeightVector::new();
        for (key, weight) in iter {
            weights.add(key, weight);
        }
        weights
    }
}

/// Per-piece reference values used to normalize observed stats.
///
/// Every key always has an entry; keys missing from a deserialized table are
/// filled from the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<StatKey, f64>", into = "BTreeMap<StatKey, f64>")]
pub struct BenchmarkTable(BTreeMap<StatKey, f64>);

impl BenchmarkTable {
    pub fn get(&self, key: StatKey) -> f64 {
        self.0
            .get(&key)
            .copied()
            .unwrap_or_else(|| key.default_benchmark())
    }

    /// Edit a benchmark. Non-finite values are rejected and leave the table unchanged.
    ///
    /// Zero or negative values are accepted; scoring skips such keys.
    pub fn set(&mut self, key: StatKey, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        self.0.insert(key, value);
        true
    }

    pub fn reset(&mut self, key: StatKey) {
        self.0.insert(key, key.default_benchmark());
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatKey, f64)> + '_ {
        StatKey::ALL.iter().map(move |&key| (key, self.get(key)))
    }
}

impl Default for BenchmarkTable {
    fn default() -> Self {
        Self(
            StatKey::ALL
                .iter()
                .map(|&key| (key, key.default_benchmark()))
                .collect(),
        )
    }
}

impl From<BTreeMap<StatKey, f64>> for BenchmarkTable {
    fn from(overrides: BTreeMap<StatKey, f64>) -> Self {
        let mut table = BenchmarkTable::default();
        for (key, value) in overrides {
            table.set(key, value);
        }
        table
    }
}

impl From<BenchmarkTable> for BTreeMap<StatKey, f64> {
    fn from(table: BenchmarkTable) -> Self {
        table.0
    }
}
