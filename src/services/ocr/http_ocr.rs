use super::engine::OcrEngine;
use crate::error::OcrError;
use crate::models::config::OcrConfig;
use base64::{engine::general_purpose, Engine as _};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP OCR client for an external text recognition server
#[derive(Clone)]
pub struct HttpOcrClient {
    client: reqwest::Client,
    base_url: String,
    languages: String,
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    image_base64: String,
    languages: &'a str,
}

/// Single text box with bounding box coordinates
#[derive(Deserialize, Clone, Debug)]
struct TextBox {
    #[serde(rename = "box")]
    bbox: Vec<Vec<f64>>, // 4 corner points [[x1,y1], [x2,y2], [x3,y3], [x4,y4]]
    text: String,
    #[serde(default)]
    #[allow(dead_code)]
    score: f64,
}

/// OCR response from the server
#[derive(Deserialize)]
struct OcrResponse {
    #[serde(default)]
    boxes: Vec<TextBox>,
    #[serde(default)]
    raw_text: String,
}

impl TextBox {
    /// Get bounding box as (x_min, y_min, x_max, y_max)
    fn get_bbox_rect(&self) -> (f64, f64, f64, f64) {
        let xs = self.bbox.iter().filter_map(|p| p.first().copied());
        let ys = self.bbox.iter().filter_map(|p| p.get(1).copied());

        let x_min = xs.clone().fold(f64::INFINITY, f64::min);
        let x_max = xs.fold(f64::NEG_INFINITY, f64::max);
        let y_min = ys.clone().fold(f64::INFINITY, f64::min);
        let y_max = ys.fold(f64::NEG_INFINITY, f64::max);

        (x_min, y_min, x_max, y_max)
    }

    fn left_x(&self) -> f64 {
        self.get_bbox_rect().0
    }

    fn center_y(&self) -> f64 {
        let (_, y_min, _, y_max) = self.get_bbox_rect();
        (y_min + y_max) / 2.0
    }
}

/// Rebuild panel lines from text boxes.
///
/// Boxes are taken top to bottom; a box joins the current line when its
/// vertical center falls inside the line's vertical span. Each line is then
/// read left to right.
fn assemble_lines(mut boxes: Vec<TextBox>) -> String {
    boxes.retain(|b| !b.text.trim().is_empty() && b.bbox.len() >= 2);
    boxes.sort_by(|a, b| a.center_y().total_cmp(&b.center_y()));

    let mut lines: Vec<(f64, f64, Vec<TextBox>)> = Vec::new();
    for text_box in boxes {
        let (_, y_min, _, y_max) = text_box.get_bbox_rect();
        let center = text_box.center_y();

        match lines.last_mut() {
            Some((top, bottom, members)) if center >= *top && center <= *bottom => {
                *top = top.min(y_min);
                *bottom = bottom.max(y_max);
                members.push(text_box);
            }
            _ => lines.push((y_min, y_max, vec![text_box])),
        }
    }

    lines
        .into_iter()
        .map(|(_, _, mut members)| {
            members.sort_by(|a, b| a.left_x().total_cmp(&b.left_x()));
            members
                .iter()
                .map(|b| b.text.trim())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl HttpOcrClient {
    /// Create a new HTTP OCR client
    pub fn new(config: &OcrConfig) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.server_url.trim_end_matches('/').to_string(),
            languages: config.languages.clone(),
        })
    }

    /// Check if server is healthy
    pub async fn health_check(&self) -> Result<(), OcrError> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(OcrError::Server(format!("health check returned {}", response.status())));
        }
        Ok(())
    }

    /// Encode image to base64 PNG
    fn encode_image(image: &DynamicImage) -> Result<String, OcrError> {
        let mut buffer = Vec::new();
        image.write_to(&mut std::io::Cursor::new(&mut buffer), image::ImageFormat::Png)?;
        Ok(general_purpose::STANDARD.encode(&buffer))
    }

    /// Call the OCR endpoint and return the panel text, one line per row
    pub async fn recognize_text(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let image_base64 = Self::encode_image(image)?;
        let url = format!("{}/ocr", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ImageRequest {
                image_base64,
                languages: &self.languages,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(OcrError::Server(error_text));
        }

        let data: OcrResponse = response.json().await?;

        if data.boxes.is_empty() {
            return Ok(data.raw_text);
        }
        Ok(assemble_lines(data.boxes))
    }
}

impl OcrEngine for HttpOcrClient {
    /// Blocking entry point; must run on a tokio blocking thread
    fn recognize(&self, image: &DynamicImage, progress: &dyn Fn(u8)) -> Result<String, OcrError> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| OcrError::Task(format!("no tokio runtime: {}", e)))?;

        progress(0);
        let text = handle.block_on(self.recognize_text(image))?;
        progress(100);

        Ok(text)
    }
}
