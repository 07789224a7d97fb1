pub mod build;
pub mod config;
pub mod equipment;
pub mod score;
pub mod stat;
pub mod weights;
