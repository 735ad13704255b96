use std::path::Path;

use image::DynamicImage;
use thiserror::Error;

use crate::config::{PipelineConfig, LOGO_CHAR_WHITELIST};
use crate::pdf::{PdfError, PdfRasterizer};
use crate::preprocess::{self, PreprocessError};
use crate::recognizer::{OcrBackend, OcrError, RecognizeOptions};
use crate::types::{AcquiredText, DocumentKind};

#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("Image preprocessing failed: {0}")]
    Preprocess(#[from] PreprocessError),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
    #[error("PDF rasterization failed: {0}")]
    Pdf(#[from] PdfError),
}

/// Turns a document on disk into OCR transcripts: the full body text and,
/// best-effort, the text of the logo region at the top of the first page.
pub struct TextAcquisition<R: OcrBackend, P: PdfRasterizer> {
    recognizer: R,
    rasterizer: P,
    config: PipelineConfig,
}

impl<R: OcrBackend, P: PdfRasterizer> TextAcquisition<R, P> {
    pub fn new(recognizer: R, rasterizer: P, config: PipelineConfig) -> Self {
        Self { recognizer, rasterizer, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Acquire transcripts for an image or PDF document. Logo-region failures
    /// never abort acquisition; they downgrade to warnings on the result.
    pub fn acquire(&self, path: &Path) -> Result<AcquiredText, AcquireError> {
        match DocumentKind::from_path(path) {
            DocumentKind::Image => self.acquire_image(path),
            DocumentKind::Pdf => self.acquire_pdf(path),
        }
    }

    fn acquire_image(&self, path: &Path) -> Result<AcquiredText, AcquireError> {
        let loaded = preprocess::load_oriented(path)?;
        let mut warnings = loaded.warnings;
        let flat = preprocess::flatten_onto_white(loaded.image);

        let raw_text = self.recognize_page(&flat)?;
        let logo_text = self.logo_text_or_warn(&flat, &mut warnings);

        Ok(AcquiredText { raw_text, logo_text, warnings })
    }

    fn acquire_pdf(&self, path: &Path) -> Result<AcquiredText, AcquireError> {
        let mut warnings = Vec::new();
        let pages = self.rasterizer.rasterize(path, self.config.pdf_dpi)?;

        if pages.is_empty() {
            tracing::warn!(path = %path.display(), "no pages found in PDF");
            warnings.push("no pages found in PDF".to_string());
            return Ok(AcquiredText { raw_text: String::new(), logo_text: None, warnings });
        }

        let mut page_texts = Vec::with_capacity(pages.len());
        for page in &pages {
            let flat = preprocess::flatten_onto_white(page.clone());
            page_texts.push(self.recognize_page(&flat)?);
        }
        let raw_text = page_texts.join("\n");

        let first = preprocess::flatten_onto_white(pages.into_iter().next().expect("non-empty"));
        let logo_text = self.logo_text_or_warn(&first, &mut warnings);

        Ok(AcquiredText { raw_text, logo_text, warnings })
    }

    /// Preprocess one page and run the default recognition pass.
    fn recognize_page(&self, page: &DynamicImage) -> Result<String, AcquireError> {
        let processed = preprocess::preprocess(page, &self.config);
        let png = preprocess::encode_as_png(&processed)?;
        Ok(self.recognizer.recognize(&png, &RecognizeOptions::default())?)
    }

    fn logo_text_or_warn(
        &self,
        first_page: &DynamicImage,
        warnings: &mut Vec<String>,
    ) -> Option<String> {
        match self.logo_text(first_page) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("could not extract text from logo region: {e}");
                warnings.push(format!("could not extract text from logo region: {e}"));
                None
            }
        }
    }

    /// OCR the top slice of the first page with a restricted character set and
    /// a single-block segmentation hint. Returns `None` when the slice is
    /// degenerate or the stripped transcript is too short to be a name.
    fn logo_text(&self, first_page: &DynamicImage) -> Result<Option<String>, AcquireError> {
        let (width, height) = (first_page.width(), first_page.height());
        let logo_height = (height as f32 * self.config.logo_height_ratio) as u32;
        if logo_height == 0 || width == 0 {
            return Ok(None);
        }

        let crop = first_page.crop_imm(0, 0, width, logo_height);
        let processed = preprocess::preprocess(&crop, &self.config);
        let png = preprocess::encode_as_png(&processed)?;
        let text = self
            .recognizer
            .recognize(&png, &RecognizeOptions::logo_region(LOGO_CHAR_WHITELIST))?;

        let trimmed = text.trim();
        if trimmed.len() > self.config.logo_min_chars {
            Ok(Some(trimmed.to_string()))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::MockRasterizer;
    use crate::recognizer::MockRecognizer;
    use image::{GrayImage, ImageBuffer, Luma};
    use std::io::Write;
    use std::path::PathBuf;

    fn blank_page() -> DynamicImage {
        let img: GrayImage = ImageBuffer::from_pixel(200, 400, Luma([220]));
        DynamicImage::ImageLuma8(img)
    }

    fn write_png(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        blank_page().save_with_format(&path, image::ImageFormat::Png).unwrap();
        path
    }

    fn acquisition(
        recognizer: MockRecognizer,
        rasterizer: MockRasterizer,
    ) -> TextAcquisition<MockRecognizer, MockRasterizer> {
        TextAcquisition::new(recognizer, rasterizer, PipelineConfig::default())
    }

    #[test]
    fn image_document_yields_body_and_logo_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, "receipt.png");

        let acq = acquisition(
            MockRecognizer::with_logo("ACME CORP\nTotal $5.00", "ACME CORP"),
            MockRasterizer::empty(),
        );
        let out = acq.acquire(&path).unwrap();
        assert_eq!(out.raw_text, "ACME CORP\nTotal $5.00");
        assert_eq!(out.logo_text.as_deref(), Some("ACME CORP"));
    }

    #[test]
    fn short_logo_text_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, "receipt.png");

        let acq = acquisition(
            MockRecognizer::with_logo("body", "  AB  "),
            MockRasterizer::empty(),
        );
        let out = acq.acquire(&path).unwrap();
        assert_eq!(out.logo_text, None);
    }

    #[test]
    fn pdf_pages_joined_in_order_with_newlines() {
        let acq = acquisition(
            MockRecognizer::new("PAGE TEXT"),
            MockRasterizer::new(vec![blank_page(), blank_page()]),
        );
        let out = acq.acquire(&PathBuf::from("doc.pdf")).unwrap();
        assert_eq!(out.raw_text, "PAGE TEXT\nPAGE TEXT");
    }

    #[test]
    fn empty_pdf_is_nonfatal_with_warning() {
        let acq = acquisition(MockRecognizer::new("unused"), MockRasterizer::empty());
        let out = acq.acquire(&PathBuf::from("doc.pdf")).unwrap();
        assert_eq!(out.raw_text, "");
        assert_eq!(out.logo_text, None);
        assert!(out.warnings.iter().any(|w| w.contains("no pages")));
    }

    #[test]
    fn missing_image_file_is_an_error() {
        let acq = acquisition(MockRecognizer::new(""), MockRasterizer::empty());
        assert!(acq.acquire(&PathBuf::from("/nonexistent/receipt.png")).is_err());
    }
}
