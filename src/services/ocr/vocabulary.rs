use crate::models::stat::StatKey;
use regex::Regex;
use std::sync::OnceLock;

/// One recognition pattern for a stat.
///
/// `flat` patterns only match when no percent sign follows the matched
/// label on the same line, so "ATK +50" is flat while "ATK +5%" is not.
/// `unless` rejects the line outright when it matches anywhere.
struct PatternSource {
    pattern: &'static str,
    flat: bool,
    unless: Option<&'static str>,
}

const fn pat(pattern: &'static str) -> PatternSource {
    PatternSource {
        pattern,
        flat: false,
        unless: None,
    }
}

const fn flat(pattern: &'static str) -> PatternSource {
    PatternSource {
        pattern,
        flat: true,
        unless: None,
    }
}

const fn flat_unless(pattern: &'static str, unless: &'static str) -> PatternSource {
    PatternSource {
        pattern,
        flat: true,
        unless: Some(unless),
    }
}

/// Recognition rules in priority order (first match wins).
/// English and Spanish labels, matched case-insensitively.
const RULE_SOURCES: &[(StatKey, &[PatternSource])] = &[
    (
        StatKey::AtkPct,
        &[
            pat(r"\bATK\s*%"),
            pat(r"\bATQ\s*%"),
            pat(r"\bAtaque\s*%"),
            pat(r"\bAttack\s*%"),
        ],
    ),
    (
        StatKey::AtkFlat,
        &[
            flat(r"\bATK\b"),
            flat(r"\bATQ\b"),
            pat(r"\bAtaque\s+adicional"),
            pat(r"\bAdditional\s+Attack"),
            flat_unless(r"\bAttack\b", r"Speed"),
        ],
    ),
    (
        StatKey::DefPct,
        &[
            pat(r"\bDEF\s*%"),
            pat(r"\bDefensa\s*%"),
            pat(r"\bDefense\s*%"),
        ],
    ),
    (
        StatKey::DefFlat,
        &[
            flat(r"\bDEF\b"),
            pat(r"\bDefensa\s+adicional"),
            flat_unless(r"\bDefensa\b", r"Penetraci[oó]n"),
            pat(r"\bAdditional\s+Defense"),
            flat_unless(r"\bDefense\b", r"Penetration"),
        ],
    ),
    (
        StatKey::HpPct,
        &[
            pat(r"\bHP\s*%"),
            pat(r"\bPS\s*%"),
            pat(r"\bVida\s*%"),
            pat(r"\bHealth\s*%"),
        ],
    ),
    (
        StatKey::HpFlat,
        &[
            flat(r"\bHP\b"),
            pat(r"\bPS\s+adicionales"),
            flat(r"\bVida\b"),
            flat(r"\bHealth\b"),
        ],
    ),
    (
        StatKey::CritRate,
        &[
            pat(r"[IÍií]ndice\s+de\s+golpe\s+cr[ií]tico"),
            pat(r"Prob\.?\s*Cr[ií]tica"),
            pat(r"Crit(?:ical)?\s*(?:Hit\s*)?Rate"),
        ],
    ),
    (
        StatKey::CritDmg,
        &[
            pat(r"Da[ñn]o\s*Cr[ií]tico"),
            pat(r"Crit(?:ical)?\s*(?:Hit\s*)?(?:DMG|Damage)"),
        ],
    ),
    (
        StatKey::Speed,
        &[pat(r"Velocidad"), pat(r"\bSPD\b"), pat(r"\bSpeed\b")],
    ),
    (
        StatKey::ElemDmg,
        &[
            pat(r"Da[ñn]o\s+elemental\s+de\s+(?:agua|fuego|luz|oscuridad|viento)"),
            pat(r"Elemental\s*Damage"),
            pat(r"\b(?:Water|Fire|Light|Dark(?:ness)?|Wind)\s+Damage"),
        ],
    ),
    (
        StatKey::DmgBoost,
        &[
            pat(r"Aumento\s+de\s+da[ñn][oa]"),
            pat(r"Damage\s*(?:Increase|Boost)"),
        ],
    ),
    (
        StatKey::DefPen,
        &[
            pat(r"Penetraci[oó]n\s*de\s*defensa"),
            pat(r"Defense\s*Penetration"),
        ],
    ),
    (
        StatKey::DamageReductionPct,
        &[
            pat(r"Reducci[oó]n\s+de\s+da[ñn][oa]"),
            pat(r"Damage\s*Reduction"),
        ],
    ),
    (
        StatKey::MpFlat,
        &[
            pat(r"\bPM\s+adicionales"),
            pat(r"\bMP\s+\+?\d+"),
            pat(r"\bAdditional\s+MP\b"),
        ],
    ),
    (
        StatKey::MpCostReductionPct,
        &[
            pat(r"Reducci[oó]n\s+de\s+consumo\s+de\s+PM"),
            pat(r"MP\s*Cost\s*Reduction"),
        ],
    ),
    (
        StatKey::MpRecoveryPct,
        &[
            pat(r"recuperaci[oó]n\s+de\s+PM"),
            pat(r"MP\s*Recovery(?:\s*Rate)?"),
        ],
    ),
];

/// Fallback tokens for lines no rule claimed; each needs a percent sign on the line
const FALLBACK_SOURCES: &[(StatKey, &str)] = &[
    (StatKey::HpPct, r"HP|PS|Vida|Health"),
    (StatKey::AtkPct, r"ATK|ATQ|Ataque|Attack"),
    (StatKey::DefPct, r"DEF|Defensa"),
];

struct StatPattern {
    regex: Regex,
    flat: bool,
    unless: Option<Regex>,
}

impl StatPattern {
    fn compile(source: &PatternSource) -> Self {
        Self {
            regex: case_insensitive(source.pattern),
            flat: source.flat,
            unless: source.unless.map(case_insensitive),
        }
    }

    fn matches(&self, line: &str) -> bool {
        if let Some(unless) = &self.unless {
            if unless.is_match(line) {
                return false;
            }
        }

        self.regex
            .find_iter(line)
            .any(|m| !self.flat || !line[m.end()..].contains('%'))
    }
}

/// A stat key with its recognition patterns
pub struct StatRule {
    pub key: StatKey,
    patterns: Vec<StatPattern>,
}

impl StatRule {
    pub fn matches(&self, line: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(line))
    }
}

fn case_insensitive(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){}", pattern)).expect("stat pattern must compile")
}

/// Compiled rules, in the fixed priority order
pub fn rules() -> &'static [StatRule] {
    static RULES: OnceLock<Vec<StatRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        RULE_SOURCES
            .iter()
            .map(|(key, sources)| StatRule {
                key: *key,
                patterns: sources.iter().map(StatPattern::compile).collect(),
            })
            .collect()
    })
}

fn fallbacks() -> &'static [(StatKey, Regex)] {
    static FALLBACKS: OnceLock<Vec<(StatKey, Regex)>> = OnceLock::new();
    FALLBACKS.get_or_init(|| {
        FALLBACK_SOURCES
            .iter()
            .map(|(key, pattern)| (*key, case_insensitive(pattern)))
            .collect()
    })
}

/// Classify one OCR line. Rules are tried in order and the first rule with a
/// matching pattern wins; lines no rule claims fall back to the generic
/// HP/ATK/DEF percent heuristics.
pub fn classify_line(line: &str) -> Option<StatKey> {
    if let Some(rule) = rules().iter().find(|rule| rule.matches(line)) {
        return Some(rule.key);
    }

    if !line.contains('%') {
        return None;
    }

    fallbacks()
        .iter()
        .find(|(_, token)| token.is_match(line))
        .map(|(key, _)| *key)
}
