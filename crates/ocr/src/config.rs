use serde::{Deserialize, Serialize};

/// Image extensions the batch scanner accepts, lowercase, without the dot.
/// PDF is handled as a distinct document kind, not listed here.
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &[
    "jpeg", "jpg", "png", "gif", "bmp", "tiff", "tif", "webp", "ico", "pcx", "dcx", "eps", "pcd",
    "psd", "sgi", "tga", "xbm", "xpm", "ppm", "pgm", "pbm",
];

/// Character whitelist used when OCR-ing the logo region. Keeps Tesseract from
/// hallucinating punctuation out of logo artwork.
pub const LOGO_CHAR_WHITELIST: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789&.,- ";

/// Tunables for the whole pipeline, named instead of buried as literals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Upscale any image whose shorter side is below this many pixels.
    pub min_ocr_dimension: u32,
    /// Fraction of pixels clipped off each histogram tail before stretching.
    pub autocontrast_cutoff: f32,
    /// Fixed contrast multiplier applied after the histogram stretch.
    pub contrast_boost: f32,
    /// Pixels strictly above this value binarize to white.
    pub binarize_threshold: u8,
    /// Fraction of the first page's height treated as the logo region.
    pub logo_height_ratio: f32,
    /// Logo text at or below this length (after trimming) is discarded.
    pub logo_min_chars: usize,
    /// Resolution used when rasterizing PDF pages.
    pub pdf_dpi: f32,
    /// Upper bound on the rename collision suffix loop.
    pub max_rename_attempts: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_ocr_dimension: 800,
            autocontrast_cutoff: 0.02,
            contrast_boost: 1.5,
            binarize_threshold: 128,
            logo_height_ratio: 0.15,
            logo_min_chars: 2,
            pdf_dpi: 300.0,
            max_rename_attempts: 10_000,
        }
    }
}

/// True when `ext` (without the dot, any case) is a supported image extension.
pub fn is_supported_image_extension(ext: &str) -> bool {
    let ext = ext.to_lowercase();
    SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.as_str())
}
