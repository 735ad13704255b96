use std::path::Path;

use serde::{Deserialize, Serialize};

/// How a source file is handled by acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    Image,
    Pdf,
}

impl DocumentKind {
    /// Classify by extension, case-insensitive. Anything that is not `.pdf`
    /// is treated as an image; callers validate image formats separately.
    pub fn from_path(path: &Path) -> Self {
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if is_pdf {
            DocumentKind::Pdf
        } else {
            DocumentKind::Image
        }
    }
}

/// OCR transcripts for one document, plus any best-effort degradations that
/// happened along the way. `raw_text` is never mutated after acquisition.
#[derive(Debug, Clone)]
pub struct AcquiredText {
    /// Full transcript, all pages joined by newline. Empty for a zero-page PDF.
    pub raw_text: String,
    /// Transcript of the top slice of the first page, if it yielded anything
    /// longer than the configured minimum.
    pub logo_text: Option<String>,
    /// Human-readable notes about steps that degraded (EXIF read failure,
    /// logo-region failure, empty PDF). Never fatal.
    pub warnings: Vec<String>,
}

/// The three structured fields recovered from a receipt. Built once per
/// document and immutable afterwards.
///
/// Invariants when `Some`:
/// - `date` is `YYYY-MM-DD`
/// - `amount` matches `^\$\d+(\.\d{1,2})?$`
/// - `vendor` is longer than 2 chars and contains at least one letter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub vendor: Option<String>,
    pub date: Option<String>,
    pub amount: Option<String>,
}

impl ExtractedFields {
    /// True when extraction recovered nothing at all.
    pub fn is_empty(&self) -> bool {
        self.vendor.is_none() && self.date.is_none() && self.amount.is_none()
    }
}
