pub mod commands;
pub mod error;
pub mod models;
pub mod services;

pub use error::{ConfigError, OcrError, ParseVariantError};
pub use models::build::BuildConfiguration;
pub use models::config::{AppConfig, LoggingConfig};
pub use models::equipment::{EquipmentPiece, ExtractionState, Slot};
pub use models::score::{Grade, ScoreResult};
pub use models::stat::{StatKey, StatMap};
pub use models::weights::{BenchmarkTable, WeightVector};
pub use services::extraction_session::{ExtractionOutcome, ExtractionSession, SetReport};
pub use services::ocr::{HttpOcrClient, OcrEngine};
pub use services::scoring::ScoringProfile;

/// Install the global fmt subscriber at the configured level.
///
/// Returns false when a subscriber was already installed; the existing one
/// stays in place.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_max_level(config.max_level())
        .with_target(false);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    match installed {
        Ok(()) => {
            tracing::debug!("Logging initialized at {}", config.max_level());
            true
        }
        Err(_) => false,
    }
}
