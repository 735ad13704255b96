//! Receipt OCR pipeline: image preparation, text acquisition (Tesseract or a
//! mock backend), field extraction heuristics, and batch renaming.

// Lazily-compiled regex, named like a function. Defined ahead of the modules
// so it is in scope for all of them.
macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static ::regex::Regex {
            static R: ::std::sync::OnceLock<::regex::Regex> = ::std::sync::OnceLock::new();
            R.get_or_init(|| ::regex::Regex::new($pat).expect("invalid regex"))
        }
    };
}

pub mod acquire;
pub mod amount;
pub mod batch;
pub mod config;
pub mod date;
pub mod extract;
pub mod pdf;
pub mod preprocess;
pub mod recognizer;
pub mod types;
pub mod vendor;

pub use acquire::{AcquireError, TextAcquisition};
pub use amount::extract_amount;
pub use batch::{BatchError, BatchOrchestrator, BatchSummary, RenamePlan};
pub use config::{PipelineConfig, LOGO_CHAR_WHITELIST, SUPPORTED_IMAGE_EXTENSIONS};
pub use date::extract_date;
pub use extract::Extractor;
pub use pdf::{MockRasterizer, PdfError, PdfRasterizer};
pub use preprocess::{preprocess, PreprocessError};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError, RecognizeOptions, Segmentation};
pub use types::{AcquiredText, DocumentKind, ExtractedFields};
pub use vendor::{CanonicalTable, VendorHeuristic};
