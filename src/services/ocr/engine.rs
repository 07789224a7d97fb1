use crate::error::OcrError;
use image::DynamicImage;

/// OCR Engine trait - abstraction over the external text recognition service
pub trait OcrEngine: Send + Sync {
    /// Recognize the text on an equipment panel.
    ///
    /// `progress` may be called any number of times with completion
    /// percentages (0-100) before the call returns.
    fn recognize(&self, image: &DynamicImage, progress: &dyn Fn(u8)) -> Result<String, OcrError>;
}
