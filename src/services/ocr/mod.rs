pub mod engine;
pub mod http_ocr;
pub mod parser;
pub mod vocabulary;

// Re-export main types
pub use engine::OcrEngine;
pub use http_ocr::HttpOcrClient;
pub use parser::{extract_stats, normalize_number};
pub use vocabulary::classify_line;
