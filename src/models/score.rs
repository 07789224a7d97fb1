use serde::{Deserialize, Serialize};
use std::fmt;

/// Score at or above which a piece is flagged as good for the build
pub const DEFAULT_RECOMMEND_THRESHOLD: u8 = 70;

/// Coarse bucket for a 0-100 score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
}

impl Grade {
    /// Inclusive lower bounds: 85 S, 70 A, 55 B, 40 C
    pub fn from_score(score: u8) -> Self {
        match score {
            85.. => Grade::S,
            70..=84 => Grade::A,
            55..=69 => Grade::B,
            40..=54 => Grade::C,
            _ => Grade::D,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score with its grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: u8,
    pub grade: Grade,
}

impl ScoreResult {
    pub fn new(score: u8) -> Self {
        Self {
            score,
            grade: Grade::from_score(score),
        }
    }

    /// Good for the build at the default threshold
    pub fn is_recommended(&self) -> bool {
        self.meets(DEFAULT_RECOMMEND_THRESHOLD)
    }

    pub fn meets(&self, threshold: u8) -> bool {
        self.score >= threshold
    }
}
