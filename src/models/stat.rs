use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Equipment attribute recognized on a gear panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatKey {
    AtkPct,
    AtkFlat,
    DefPct,
    DefFlat,
    HpPct,
    HpFlat,
    CritRate,
    CritDmg,
    Speed,
    ElemDmg,
    DmgBoost,
    DefPen,
    DamageReductionPct,
    MpFlat,
    MpCostReductionPct,
    MpRecoveryPct,
}

/// Whether a stat is read as a percentage or as a flat amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatUnit {
    Percent,
    Flat,
}

impl StatKey {
    /// Vocabulary order. Classification, scoring and tie breaking all follow it.
    pub const ALL: [StatKey; 16] = [
        StatKey::AtkPct,
        StatKey::AtkFlat,
        StatKey::DefPct,
        StatKey::DefFlat,
        StatKey::HpPct,
        StatKey::HpFlat,
        StatKey::CritRate,
        StatKey::CritDmg,
        StatKey::Speed,
        StatKey::ElemDmg,
        StatKey::DmgBoost,
        StatKey::DefPen,
        StatKey::DamageReductionPct,
        StatKey::MpFlat,
        StatKey::MpCostReductionPct,
        StatKey::MpRecoveryPct,
    ];

    /// Position in `StatKey::ALL`
    pub fn order(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            StatKey::AtkPct => "Attack (%)",
            StatKey::AtkFlat => "Additional Attack",
            StatKey::DefPct => "Defense (%)",
            StatKey::DefFlat => "Additional Defense",
            StatKey::HpPct => "HP (%)",
            StatKey::HpFlat => "Additional HP",
            StatKey::CritRate => "Critical Hit Rate",
            StatKey::CritDmg => "Critical Hit Damage",
            StatKey::Speed => "Speed (SPD)",
            StatKey::ElemDmg => "Elemental Damage",
            StatKey::DmgBoost => "Damage Increase",
            StatKey::DefPen => "Defense Penetration",
            StatKey::DamageReductionPct => "Damage Reduction",
            StatKey::MpFlat => "Additional MP",
            StatKey::MpCostReductionPct => "MP Cost Reduction",
            StatKey::MpRecoveryPct => "MP Recovery Rate (%)",
        }
    }

    pub fn unit(self) -> StatUnit {
        match self {
            StatKey::AtkFlat
            | StatKey::DefFlat
            | StatKey::HpFlat
            | StatKey::Speed
            | StatKey::DefPen
            | StatKey::MpFlat => StatUnit::Flat,
            _ => StatUnit::Percent,
        }
    }

    pub fn is_percent(self) -> bool {
        self.unit() == StatUnit::Percent
    }

    /// Reference value for a good roll on a single piece
    pub fn default_benchmark(self) -> f64 {
        match self {
            StatKey::AtkPct => 10.0,
            StatKey::AtkFlat => 50.0,
            StatKey::DefPct => 10.0,
            StatKey::DefFlat => 20.0,
            StatKey::HpPct => 10.0,
            StatKey::HpFlat => 200.0,
            StatKey::CritRate => 10.0,
            StatKey::CritDmg => 20.0,
            StatKey::Speed => 5.0,
            StatKey::ElemDmg => 10.0,
            StatKey::DmgBoost => 10.0,
            StatKey::DefPen => 1000.0,
            StatKey::DamageReductionPct => 10.0,
            StatKey::MpFlat => 50.0,
            StatKey::MpCostReductionPct => 10.0,
            StatKey::MpRecoveryPct => 10.0,
        }
    }

    /// Display form of a value: "12.50%" for percentages, "1200" for flat stats
    pub fn format_value(self, value: f64) -> String {
        match self.unit() {
            StatUnit::Percent => format!("{:.2}%", value),
            StatUnit::Flat => format!("{}", value.round() as i64),
        }
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stat readings for one piece (or the summed set).
///
/// Percentage stats hold plain percentage numbers (12.5 means 12.5%),
/// never fractions. A missing key means there is no reading for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatMap(HashMap<StatKey, f64>);

impl StatMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: StatKey) -> Option<f64> {
        self.0.get(&key).copied()
    }

    /// Store a reading. Non-finite values are not readings and clear the key instead.
    pub fn set(&mut self, key: StatKey, value: f64) {
        if value.is_finite() {
            self.0.insert(key, value);
        } else {
            self.0.remove(&key);
        }
    }

    pub fn remove(&mut self, key: StatKey) -> Option<f64> {
        self.0.remove(&key)
    }

    pub fn contains(&self, key: StatKey) -> bool {
        self.0.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Readings in vocabulary order
    pub fn iter(&self) -> impl Iterator<Item = (StatKey, f64)> + '_ {
        StatKey::ALL
            .iter()
            .filter_map(move |&key| self.get(key).map(|value| (key, value)))
    }
}

impl FromIterator<(StatKey, f64)> for StatMap {
    fn from_iter<I: IntoIterator<Item = (StatKey, f64)>>(iter: I) -> Self {
        let mut map = StatMap::new();
        for (key, value) in iter {
            map.set(key, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_matches_declaration_order() {
        for (idx, key) in StatKey::ALL.iter().enumerate() {
            assert_eq!(key.order(), idx);
        }
    }

    #[test]
    fn test_units() {
        assert_eq!(StatKey::AtkPct.unit(), StatUnit::Percent);
        assert_eq!(StatKey::CritDmg.unit(), StatUnit::Percent);
        assert_eq!(StatKey::HpFlat.unit(), StatUnit::Flat);
        assert_eq!(StatKey::DefPen.unit(), StatUnit::Flat);
        assert_eq!(StatKey::Speed.unit(), StatUnit::Flat);

        let flat = StatKey::ALL.iter().filter(|k| !k.is_percent()).count();
        assert_eq!(flat, 6);
    }

    #[test]
    fn test_default_benchmarks_positive() {
        assert!(StatKey::ALL.iter().all(|k| k.default_benchmark() > 0.0));
        assert_eq!(StatKey::DefPen.default_benchmark(), 1000.0);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(StatKey::CritRate.format_value(12.5), "12.50%");
        assert_eq!(StatKey::HpFlat.format_value(1199.6), "1200");
    }

    #[test]
    fn test_serde_uses_short_identifiers() {
        let json = serde_json::to_string(&StatKey::DamageReductionPct).unwrap();
        assert_eq!(json, "\"damageReductionPct\"");

        let key: StatKey = serde_json::from_str("\"atkPct\"").unwrap();
        assert_eq!(key, StatKey::AtkPct);
    }

    #[test]
    fn test_stat_map_rejects_non_finite() {
        let mut map = StatMap::new();
        map.set(StatKey::AtkPct, 5.0);
        map.set(StatKey::AtkPct, f64::NAN);
        assert!(!map.contains(StatKey::AtkPct));

        map.set(StatKey::Speed, f64::INFINITY);
        assert!(map.is_empty());
    }

    #[test]
    fn test_stat_map_iter_in_vocabulary_order() {
        let map: StatMap = [(StatKey::MpFlat, 30.0), (StatKey::AtkPct, 5.0), (StatKey::Speed, 2.0)]
            .into_iter()
            .collect();

        let keys: Vec<StatKey> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![StatKey::AtkPct, StatKey::Speed, StatKey::MpFlat]);
    }
}
