use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("Tesseract not available — build with `tesseract` feature")]
    NotAvailable,
}

/// Layout hint passed to the OCR engine. Small crops (the logo region)
/// recognize far better with an explicit segmentation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Segmentation {
    /// Full automatic page segmentation.
    #[default]
    Auto,
    /// Assume a single uniform block of text.
    SingleBlock,
    /// Treat the image as a single text line.
    SingleLine,
    /// Treat the image as a single word.
    SingleWord,
}

impl Segmentation {
    /// Tesseract page segmentation mode number.
    pub fn psm(self) -> u8 {
        match self {
            Segmentation::Auto => 3,
            Segmentation::SingleBlock => 6,
            Segmentation::SingleLine => 7,
            Segmentation::SingleWord => 8,
        }
    }
}

/// Per-call engine settings.
#[derive(Debug, Clone, Default)]
pub struct RecognizeOptions {
    pub segmentation: Segmentation,
    /// Restrict recognition to these characters, when set.
    pub whitelist: Option<String>,
}

impl RecognizeOptions {
    /// Settings for the logo-region pass: single uniform block, restricted
    /// character set.
    pub fn logo_region(whitelist: &str) -> Self {
        Self {
            segmentation: Segmentation::SingleBlock,
            whitelist: Some(whitelist.to_string()),
        }
    }
}

/// Abstraction over an OCR backend.
/// Implementations accept raw PNG/JPEG image bytes and return the recognized text.
pub trait OcrBackend {
    fn recognize(&self, image_bytes: &[u8], options: &RecognizeOptions) -> Result<String, OcrError>;
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns pre-set strings — useful for unit testing acquisition and
/// extraction without requiring Tesseract to be installed. The whitelisted
/// single-block pass (the logo region) gets its own canned text.
pub struct MockRecognizer {
    pub text: String,
    pub logo_text: Option<String>,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), logo_text: None }
    }

    pub fn with_logo(text: impl Into<String>, logo_text: impl Into<String>) -> Self {
        Self { text: text.into(), logo_text: Some(logo_text.into()) }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8], options: &RecognizeOptions) -> Result<String, OcrError> {
        if options.segmentation == Segmentation::SingleBlock {
            if let Some(logo) = &self.logo_text {
                return Ok(logo.clone());
            }
        }
        Ok(self.text.clone())
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{OcrBackend, OcrError, RecognizeOptions};
    use leptess::{LepTess, Variable};

    pub struct TesseractRecognizer {
        data_path: Option<String>,
        lang: String,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>, lang: &str) -> Self {
            Self { data_path, lang: lang.to_string() }
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(
            &self,
            image_bytes: &[u8],
            options: &RecognizeOptions,
        ) -> Result<String, OcrError> {
            let mut lt = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_variable(Variable::TesseditPagesegMode, &options.segmentation.psm().to_string())
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            if let Some(whitelist) = &options.whitelist {
                lt.set_variable(Variable::TesseditCharWhitelist, whitelist)
                    .map_err(|e| OcrError::Engine(e.to_string()))?;
            }
            lt.set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            lt.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))
        }
    }
}
