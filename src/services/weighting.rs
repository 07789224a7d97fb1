use crate::models::build::{BuildConfiguration, Element, Role, Scaling, Scenario};
use crate::models::stat::StatKey::{self, *};
use crate::models::weights::WeightVector;

fn partial(entries: &[(StatKey, f64)]) -> WeightVector {
    entries.iter().copied().collect()
}

/// Weights for the stat family the character's damage scales with
pub fn scaling_weights(scaling: Scaling) -> WeightVector {
    match scaling {
        Scaling::Health => partial(&[
            (HpPct, 1.0),
            (HpFlat, 0.7),
            (CritRate, 0.7),
            (CritDmg, 0.8),
            (DmgBoost, 0.7),
            (Speed, 0.5),
        ]),
        Scaling::Defense => partial(&[
            (DefPct, 1.0),
            (DefFlat, 0.6),
            (CritRate, 0.6),
            (CritDmg, 0.7),
            (DefPen, 0.6),
            (DmgBoost, 0.5),
        ]),
        Scaling::Attack => partial(&[
            (AtkPct, 1.0),
            (AtkFlat, 0.6),
            (CritRate, 1.0),
            (CritDmg, 1.0),
            (DmgBoost, 0.7),
            (Speed, 0.5),
        ]),
    }
}

/// Stat priorities of each role
pub fn role_weights(role: Role) -> WeightVector {
    match role {
        Role::Tank => partial(&[
            (HpPct, 1.0),
            (DefPct, 1.0),
            (DamageReductionPct, 0.8),
            (Speed, 0.6),
            (DefFlat, 0.3),
        ]),
        Role::Fighter => partial(&[
            (AtkPct, 0.9),
            (CritRate, 1.0),
            (CritDmg, 1.0),
            (Speed, 0.6),
            (DefPen, 0.5),
            (DmgBoost, 0.6),
        ]),
        Role::Mage => partial(&[
            (ElemDmg, 1.0),
            (CritRate, 0.7),
            (CritDmg, 0.8),
            (AtkPct, 0.6),
            (MpRecoveryPct, 0.6),
            (MpCostReductionPct, 0.4),
        ]),
        Role::Assassin => partial(&[
            (Speed, 1.0),
            (CritRate, 1.0),
            (CritDmg, 1.0),
            (AtkPct, 0.8),
            (DefPen, 0.6),
        ]),
        Role::Breaker => partial(&[
            (DefPen, 1.1),
            (DmgBoost, 0.8),
            (AtkPct, 0.7),
            (Speed, 0.5),
            (CritRate, 0.6),
            (CritDmg, 0.7),
        ]),
        Role::Healer => partial(&[
            (MpRecoveryPct, 1.0),
            (HpPct, 0.8),
            (Speed, 0.8),
            (MpCostReductionPct, 0.6),
            (DmgBoost, 0.3),
        ]),
    }
}

/// Generic elemental damage boost; the element itself does not change the weights
pub fn element_weights(_element: Element) -> WeightVector {
    partial(&[(ElemDmg, 0.4)])
}

/// Situational boosts per scenario
pub fn scenario_weights(scenario: Scenario) -> WeightVector {
    match scenario {
        Scenario::GuildBoss => partial(&[
            (CritDmg, 0.3),
            (AtkPct, 0.2),
            (DefPen, 0.3),
            (DmgBoost, 0.3),
        ]),
        Scenario::Battlefield => partial(&[
            (Speed, 0.4),
            (HpPct, 0.2),
            (DefPct, 0.2),
            (DamageReductionPct, 0.2),
        ]),
        Scenario::LightWorkshop => partial(&[(ElemDmg, 0.4), (Speed, 0.1)]),
        Scenario::PvP => partial(&[
            (Speed, 0.4),
            (CritRate, 0.2),
            (DamageReductionPct, 0.3),
        ]),
        Scenario::Story | Scenario::Other => WeightVector::new(),
    }
}

/// Sum partial vectors key by key. No normalization is applied.
pub fn merge_weights<'a>(parts: impl IntoIterator<Item = &'a WeightVector>) -> WeightVector {
    let mut merged = WeightVector::new();
    for part in parts {
        for (key, weight) in part.iter() {
            merged.add(key, weight);
        }
    }
    merged
}

/// Merged weights for a build: scaling + role + element + scenario
pub fn compute_weights(build: &BuildConfiguration) -> WeightVector {
    let weights = merge_weights(&[
        scaling_weights(build.scaling),
        role_weights(build.role),
        element_weights(build.element),
        scenario_weights(build.scenario),
    ]);

    tracing::debug!(
        "Computed weights for {:?}/{:?}/{:?}/{:?}: {:?}",
        build.scaling,
        build.role,
        build.element,
        build.scenario,
        weights
    );

    weights
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_scaling_emphasizes_family() {
        assert_eq!(scaling_weights(Scaling::Health).get(HpPct), 1.0);
        assert_eq!(scaling_weights(Scaling::Health).get(AtkPct), 0.0);
        assert_eq!(scaling_weights(Scaling::Defense).get(DefPen), 0.6);
        assert_eq!(scaling_weights(Scaling::Attack).get(CritDmg), 1.0);
    }

    #[test]
    fn test_coefficients_in_range() {
        let all_parts = Scaling::ALL
            .iter()
            .map(|s| scaling_weights(*s))
            .chain(Role::ALL.iter().map(|r| role_weights(*r)));

        for part in all_parts {
            for (_, weight) in part.iter() {
                assert!(weight > 0.0 && weight <= 1.1);
            }
        }
    }

    #[test]
    fn test_role_tables() {
        let tank = role_weights(Role::Tank);
        assert_eq!(tank.get(HpPct), 1.0);
        assert_eq!(tank.get(DefPct), 1.0);

        assert_eq!(role_weights(Role::Healer).get(MpRecoveryPct), 1.0);
        assert_eq!(role_weights(Role::Breaker).get(DefPen), 1.1);
    }

    #[test]
    fn test_element_is_constant() {
        for element in Element::ALL {
            let weights = element_weights(element);
            assert_eq!(weights.get(ElemDmg), 0.4);
            assert_eq!(weights.iter().count(), 1);
        }
    }

    #[test]
    fn test_scenario_boosts_are_small() {
        for scenario in Scenario::ALL {
            for (_, weight) in scenario_weights(scenario).iter() {
                assert!(weight >= 0.1 && weight <= 0.4);
            }
        }
        assert!(scenario_weights(Scenario::Story).is_empty());
        assert_eq!(scenario_weights(Scenario::PvP).get(DamageReductionPct), 0.3);
    }

    #[test]
    fn test_merge_is_additive() {
        let a = partial(&[(Speed, 0.5), (CritRate, 1.0)]);
        let b = partial(&[(Speed, 0.4)]);

        let merged = merge_weights(&[a, b]);
        assert!(approx(merged.get(Speed), 0.9));
        assert!(approx(merged.get(CritRate), 1.0));
        assert_eq!(merged.get(HpPct), 0.0);
    }

    #[test]
    fn test_compute_weights_assassin_pvp() {
        let build = BuildConfiguration {
            element: Element::Dark,
            role: Role::Assassin,
            scenario: Scenario::PvP,
            scaling: Scaling::Attack,
            ..BuildConfiguration::default()
        };

        let weights = compute_weights(&build);
        // attack 0.5 + assassin 1.0 + pvp 0.4
        assert!(approx(weights.get(Speed), 1.9));
        // attack 1.0 + assassin 1.0 + pvp 0.2
        assert!(approx(weights.get(CritRate), 2.2));
        assert!(approx(weights.get(ElemDmg), 0.4));
        assert!(approx(weights.get(DamageReductionPct), 0.3));
        assert_eq!(weights.get(MpFlat), 0.0);
    }

    #[test]
    fn test_compute_weights_default_build() {
        let weights = compute_weights(&BuildConfiguration::default());
        // attack 1.0 + fighter 0.9
        assert!(approx(weights.get(AtkPct), 1.9));
        assert!(approx(weights.get(AtkFlat), 0.6));
        assert!(approx(weights.get(DefPen), 0.5));
    }
}
