use super::stat::{StatKey, StatMap};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the 8 fixed equipment positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Helmet,
    Armor,
    Gloves,
    Boots,
    Necklace,
    Bracelet,
    Ring,
    Earrings,
}

impl Slot {
    pub const COUNT: usize = 8;

    pub const ALL: [Slot; Slot::COUNT] = [
        Slot::Helmet,
        Slot::Armor,
        Slot::Gloves,
        Slot::Boots,
        Slot::Necklace,
        Slot::Bracelet,
        Slot::Ring,
        Slot::Earrings,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Slot::Helmet => "Helmet",
            Slot::Armor => "Armor",
            Slot::Gloves => "Gloves",
            Slot::Boots => "Boots",
            Slot::Necklace => "Necklace",
            Slot::Bracelet => "Bracelet",
            Slot::Ring => "Ring",
            Slot::Earrings => "Earrings",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Extraction lifecycle of a piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionState {
    Empty,
    Extracting,
    Extracted,
}

/// One equipment slot with its latest OCR text and stat readings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentPiece {
    pub slot: Slot,
    pub raw_text: Option<String>,
    pub stats: StatMap,
    pub state: ExtractionState,
    /// OCR completion, 0-100. Only meaningful while extracting.
    pub progress: u8,
    pub updated_at: Option<DateTime<Utc>>,
}

impl EquipmentPiece {
    pub fn new(slot: Slot) -> Self {
        Self {
            slot,
            raw_text: None,
            stats: StatMap::new(),
            state: ExtractionState::Empty,
            progress: 0,
            updated_at: None,
        }
    }

    pub fn is_extracting(&self) -> bool {
        self.state == ExtractionState::Extracting
    }

    /// Manual correction of a single stat. `None` clears the reading.
    ///
    /// Values keep the stat's unit convention: percentages are plain numbers.
    pub fn set_stat(&mut self, key: StatKey, value: Option<f64>) {
        match value {
            Some(v) => self.stats.set(key, v),
            None => {
                self.stats.remove(key);
            }
        }

        if self.state == ExtractionState::Empty {
            self.state = ExtractionState::Extracted;
        }
        self.updated_at = Some(Utc::now());
    }

    /// Replace text and stats with a finished extraction
    pub fn apply_extraction(&mut self, raw_text: String, stats: StatMap) {
        self.raw_text = Some(raw_text);
        self.stats = stats;
        self.state = ExtractionState::Extracted;
        self.progress = 100;
        self.updated_at = Some(Utc::now());
    }

    pub fn reset(&mut self) {
        *self = EquipmentPiece::new(self.slot);
    }
}

/// One piece per slot, indexed by `Slot::index`
pub type EquipmentSet = [EquipmentPiece; Slot::COUNT];

/// The 8 empty pieces a session starts with, in slot order
pub fn empty_set() -> EquipmentSet {
    Slot::ALL.map(EquipmentPiece::new)
}
