pub mod config;
pub mod extraction;
pub mod grading;

pub use extraction::extract_stats;
pub use grading::{
    build_from_character, compute_weights, parse_build, score_piece, score_set, top_priority_stats,
};
