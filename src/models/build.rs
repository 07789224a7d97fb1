use crate::error::ParseVariantError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Character element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Light,
    Dark,
    Water,
    Fire,
    Wind,
}

/// Character role in the team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Tank,
    Fighter,
    Mage,
    Assassin,
    Breaker,
    Healer,
}

/// Content the build is tuned for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    Story,
    Battlefield,
    GuildBoss,
    LightWorkshop,
    #[serde(rename = "pvp")]
    PvP,
    Other,
}

/// Stat the character's damage scales with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scaling {
    Attack,
    Defense,
    Health,
}

impl Element {
    pub const ALL: [Element; 5] = [
        Element::Light,
        Element::Dark,
        Element::Water,
        Element::Fire,
        Element::Wind,
    ];
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Tank,
        Role::Fighter,
        Role::Mage,
        Role::Assassin,
        Role::Breaker,
        Role::Healer,
    ];
}

impl Scenario {
    pub const ALL: [Scenario; 6] = [
        Scenario::Story,
        Scenario::Battlefield,
        Scenario::GuildBoss,
        Scenario::LightWorkshop,
        Scenario::PvP,
        Scenario::Other,
    ];
}

impl Scaling {
    pub const ALL: [Scaling; 3] = [Scaling::Attack, Scaling::Defense, Scaling::Health];
}

/// Lowercase, trim and drop separators so "Guild Boss", "guild_boss" and
/// "Jefe de gremio" style inputs compare cleanly.
fn normalize_name(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

impl FromStr for Element {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "light" | "luz" => Ok(Element::Light),
            "dark" | "darkness" | "oscuridad" => Ok(Element::Dark),
            "water" | "agua" => Ok(Element::Water),
            "fire" | "fuego" => Ok(Element::Fire),
            "wind" | "viento" => Ok(Element::Wind),
            _ => Err(ParseVariantError::new("element", s)),
        }
    }
}

impl FromStr for Role {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "tank" | "tanque" => Ok(Role::Tank),
            "fighter" | "luchador" => Ok(Role::Fighter),
            "mage" | "mago" => Ok(Role::Mage),
            "assassin" | "asesino" => Ok(Role::Assassin),
            "breaker" => Ok(Role::Breaker),
            "healer" | "sanador" => Ok(Role::Healer),
            _ => Err(ParseVariantError::new("role", s)),
        }
    }
}

impl FromStr for Scenario {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "story" | "historia" => Ok(Scenario::Story),
            "battlefield" | "campodebatalla" => Ok(Scenario::Battlefield),
            "guildboss" | "jefedegremio" => Ok(Scenario::GuildBoss),
            "lightworkshop" | "workshopoflight" | "tallerdeluz" => Ok(Scenario::LightWorkshop),
            "pvp" => Ok(Scenario::PvP),
            "other" | "otros" => Ok(Scenario::Other),
            _ => Err(ParseVariantError::new("scenario", s)),
        }
    }
}

impl FromStr for Scaling {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "attack" | "atk" | "ataque" => Ok(Scaling::Attack),
            "defense" | "def" | "defensa" => Ok(Scaling::Defense),
            "health" | "hp" | "ps" => Ok(Scaling::Health),
            _ => Err(ParseVariantError::new("scaling", s)),
        }
    }
}

/// Known characters with a fixed element, default role and damage scaling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterPreset {
    pub name: &'static str,
    pub element: Element,
    pub role: Role,
    pub scaling: Scaling,
}

pub const CHARACTER_PRESETS: [CharacterPreset; 3] = [
    CharacterPreset {
        name: "Seorin",
        element: Element::Water,
        role: Role::Breaker,
        scaling: Scaling::Health,
    },
    CharacterPreset {
        name: "Cha Hae-In",
        element: Element::Water,
        role: Role::Fighter,
        scaling: Scaling::Defense,
    },
    CharacterPreset {
        name: "Lennart Niermann",
        element: Element::Wind,
        role: Role::Fighter,
        scaling: Scaling::Defense,
    },
];

/// Look up a preset by character name (case-insensitive, surrounding whitespace ignored)
pub fn find_preset(name: &str) -> Option<&'static CharacterPreset> {
    let wanted = name.trim();
    CHARACTER_PRESETS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(wanted))
}

/// Build choices that drive the stat weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildConfiguration {
    #[serde(default)]
    pub character: String,
    pub element: Element,
    pub role: Role,
    pub scenario: Scenario,
    pub scaling: Scaling,
}

impl Default for BuildConfiguration {
    fn default() -> Self {
        Self {
            character: String::new(),
            element: Element::Water,
            role: Role::Fighter,
            scenario: Scenario::Story,
            scaling: Scaling::Attack,
        }
    }
}

impl BuildConfiguration {
    /// Record the character name and, when it is a known character, take its
    /// element, role and scaling. Unknown names leave the manual settings alone.
    ///
    /// Returns true when a preset was applied.
    pub fn apply_character(&mut self, name: &str) -> bool {
        self.character = name.trim().to_string();

        match find_preset(name) {
            Some(preset) => {
                self.element = preset.element;
                self.role = preset.role;
                self.scaling = preset.scaling;
                true
            }
            None => {
                tracing::debug!("No preset for character '{}', keeping manual build", name.trim());
                false
            }
        }
    }
}
