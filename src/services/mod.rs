pub mod aggregator;
pub mod config;
pub mod extraction_session;
pub mod ocr;
pub mod scoring;
pub mod weighting;
