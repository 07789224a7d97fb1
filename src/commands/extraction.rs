use crate::models::config::OcrConfig;
use crate::models::equipment::Slot;
use crate::models::stat::StatMap;
use crate::services::extraction_session::{ExtractionOutcome, ExtractionSession};
use crate::services::ocr::{self, HttpOcrClient, OcrEngine};
use base64::Engine as _;
use image::DynamicImage;

/// Stats found in OCR text. Unrecognized lines are ignored.
pub fn extract_stats(text: &str) -> StatMap {
    ocr::extract_stats(text)
}

/// Decode a pasted or uploaded image, raw base64 or a `data:` URL
pub fn decode_image_data(image_data: &str) -> Result<DynamicImage, String> {
    let encoded = match image_data.split_once(";base64,") {
        Some((_, payload)) => payload,
        None => image_data,
    };

    let image_bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| format!("Failed to decode base64: {}", e))?;

    image::load_from_memory(&image_bytes).map_err(|e| format!("Failed to decode image: {}", e))
}

/// Check that the text recognition server is reachable
pub async fn check_ocr_server(config: &OcrConfig) -> Result<(), String> {
    let client = HttpOcrClient::new(config).map_err(|e| e.to_string())?;

    client
        .health_check()
        .await
        .map_err(|e| format!("OCR server unavailable at {}: {}", config.server_url, e))
}

/// Extract a slot from base64 image data and wait for the outcome
pub async fn submit_image_data<E: OcrEngine + 'static>(
    session: &ExtractionSession<E>,
    slot: Slot,
    image_data: &str,
) -> Result<ExtractionOutcome, String> {
    let image = decode_image_data(image_data)?;

    session
        .submit(slot, image)
        .await
        .map_err(|e| format!("Extraction task failed: {}", e))
}
