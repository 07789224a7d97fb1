use serde::{Deserialize, Serialize};
use crate::models::build::BuildConfiguration;
use crate::models::score::DEFAULT_RECOMMEND_THRESHOLD;
use crate::models::weights::BenchmarkTable;

/// Text recognition server settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OcrConfig {
    pub server_url: String,
    pub timeout_secs: u64,
    /// Language hint forwarded to the server (Tesseract style, "+"-joined)
    pub languages: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:39835".to_string(),
            timeout_secs: 30,
            languages: "eng+spa".to_string(),
        }
    }
}

/// Scoring presentation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringConfig {
    /// How many priority stats to suggest
    pub top_stats: usize,
    /// Minimum piece score flagged as good for the build
    pub recommend_threshold: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            top_stats: 3,
            recommend_threshold: DEFAULT_RECOMMEND_THRESHOLD,
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Parsed level, falling back to INFO for unknown names
    pub fn max_level(&self) -> tracing::Level {
        self.level
            .trim()
            .parse()
            .unwrap_or(tracing::Level::INFO)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub benchmarks: BenchmarkTable,
    #[serde(default)]
    pub build: BuildConfiguration,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}
