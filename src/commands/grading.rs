use crate::models::build::{BuildConfiguration, Element, Role, Scaling, Scenario};
use crate::models::equipment::EquipmentSet;
use crate::models::score::ScoreResult;
use crate::models::stat::{StatKey, StatMap};
use crate::models::weights::{BenchmarkTable, WeightVector};
use crate::services::{scoring, weighting};

/// Merged stat weights for a build
pub fn compute_weights(build: &BuildConfiguration) -> WeightVector {
    weighting::compute_weights(build)
}

/// Score one piece's stats
pub fn score_piece(stats: &StatMap, weights: &WeightVector, benchmarks: &BenchmarkTable) -> ScoreResult {
    scoring::score_piece(stats, weights, benchmarks)
}

/// Score the full set from the pieces' summed stats
pub fn score_set(
    pieces: &EquipmentSet,
    weights: &WeightVector,
    benchmarks: &BenchmarkTable,
) -> ScoreResult {
    scoring::score_set(pieces, weights, benchmarks)
}

/// Stats to chase first for these weights
pub fn top_priority_stats(weights: &WeightVector, n: usize) -> Vec<StatKey> {
    scoring::top_priority_stats(weights, n)
}

/// Build for a character name.
///
/// Known characters fill element, role and scaling; anything else keeps the
/// settings from `manual`. Never fails.
pub fn build_from_character(name: &str, manual: &BuildConfiguration) -> BuildConfiguration {
    let mut build = manual.clone();
    build.apply_character(name);
    build
}

/// Build from the option names shown in the selectors (English or Spanish)
pub fn parse_build(
    character: &str,
    element: &str,
    role: &str,
    scenario: &str,
    scaling: &str,
) -> Result<BuildConfiguration, String> {
    let manual = BuildConfiguration {
        character: String::new(),
        element: element.parse::<Element>().map_err(|e| e.to_string())?,
        role: role.parse::<Role>().map_err(|e| e.to_string())?,
        scenario: scenario.parse::<Scenario>().map_err(|e| e.to_string())?,
        scaling: scaling.parse::<Scaling>().map_err(|e| e.to_string())?,
    };

    Ok(build_from_character(character, &manual))
}
