use crate::models::build::BuildConfiguration;
use crate::models::equipment::{EquipmentSet, Slot};
use crate::models::score::ScoreResult;
use crate::models::stat::{StatKey, StatMap};
use crate::models::weights::{BenchmarkTable, WeightVector};
use crate::services::aggregator::aggregate;
use crate::services::weighting::compute_weights;
use serde::{Deserialize, Serialize};

/// Upper bound of a normalized stat: 125% of the benchmark
pub const NORMALIZED_CAP: f64 = 1.25;

/// Observed value relative to its benchmark, clamped to [0, 1.25].
///
/// Returns `None` when the benchmark is not a usable reference (zero,
/// negative or non-finite). Missing or non-finite observations count as 0.
pub fn normalized_contribution(observed: f64, effective_benchmark: f64) -> Option<f64> {
    if !(effective_benchmark.is_finite() && effective_benchmark > 0.0) {
        return None;
    }

    let observed = if observed.is_finite() { observed } else { 0.0 };
    Some((observed / effective_benchmark).clamp(0.0, NORMALIZED_CAP))
}

/// Weighted, benchmark-normalized score in 0..=100.
///
/// `piece_multiplier` scales every benchmark: 1 for a single piece,
/// `Slot::COUNT` for the summed set. Weighted stats whose benchmark is not
/// usable are left out of both sums; with nothing left the score is 0.
pub fn score_values(
    values: &StatMap,
    weights: &WeightVector,
    benchmarks: &BenchmarkTable,
    piece_multiplier: u32,
) -> u8 {
    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;

    for (key, weight) in weights.iter() {
        let effective = benchmarks.get(key) * f64::from(piece_multiplier);
        let Some(norm) = normalized_contribution(values.get(key).unwrap_or(0.0), effective) else {
            tracing::trace!("{:?}: benchmark {} unusable, skipped", key, effective);
            continue;
        };

        weighted_sum += norm * weight;
        weight_sum += weight;
    }

    if weight_sum <= 0.0 {
        return 0;
    }

    ((weighted_sum / weight_sum) * 100.0).clamp(0.0, 100.0).round() as u8
}

/// Score a single piece against per-piece benchmarks
pub fn score_piece(stats: &StatMap, weights: &WeightVector, benchmarks: &BenchmarkTable) -> ScoreResult {
    ScoreResult::new(score_values(stats, weights, benchmarks, 1))
}

/// Score the whole set: stats summed over all 8 pieces, benchmarks times 8.
///
/// Slots without readings count as empty.
pub fn score_set(
    pieces: &EquipmentSet,
    weights: &WeightVector,
    benchmarks: &BenchmarkTable,
) -> ScoreResult {
    let total = aggregate(pieces);
    ScoreResult::new(score_values(&total, weights, benchmarks, Slot::COUNT as u32))
}

/// The `n` most heavily weighted stats, ties in vocabulary order
pub fn top_priority_stats(weights: &WeightVector, n: usize) -> Vec<StatKey> {
    let mut keys = StatKey::ALL.to_vec();
    // Stable sort keeps vocabulary order among equal weights
    keys.sort_by(|a, b| weights.get(*b).total_cmp(&weights.get(*a)));
    keys.truncate(n);
    keys
}

/// Weights and benchmarks used together for every scoring call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringProfile {
    pub weights: WeightVector,
    pub benchmarks: BenchmarkTable,
}

impl ScoringProfile {
    pub fn new(weights: WeightVector, benchmarks: BenchmarkTable) -> Self {
        Self { weights, benchmarks }
    }

    pub fn from_build(build: &BuildConfiguration, benchmarks: BenchmarkTable) -> Self {
        Self::new(compute_weights(build), benchmarks)
    }

    /// Recompute the active weights from a build. Until this is called the
    /// previous weights stay in effect.
    pub fn apply_build(&mut self, build: &BuildConfiguration) {
        self.weights = compute_weights(build);
    }

    pub fn score_piece(&self, stats: &StatMap) -> ScoreResult {
        score_piece(stats, &self.weights, &self.benchmarks)
    }

    pub fn score_set(&self, pieces: &EquipmentSet) -> ScoreResult {
        score_set(pieces, &self.weights, &self.benchmarks)
    }

    pub fn top_stats(&self, n: usize) -> Vec<StatKey> {
        top_priority_stats(&self.weights, n)
    }
}

impl Default for ScoringProfile {
    fn default() -> Self {
        Self::from_build(&BuildConfiguration::default(), BenchmarkTable::default())
    }
}
