use std::path::Path;

use image::DynamicImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to initialize PDF rasterizer: {0}")]
    Init(String),
    #[error("Failed to load PDF: {0}")]
    Load(String),
    #[error("Failed to render page {page}: {message}")]
    Render { page: usize, message: String },
    #[error("PDF rasterizer not available — build with `pdfium` feature")]
    NotAvailable,
}

/// Abstraction over a PDF-to-bitmap rasterizer. Implementations render every
/// page at the requested resolution, in page order. A PDF with zero pages
/// yields an empty vec, not an error; acquisition decides how to react.
pub trait PdfRasterizer {
    fn rasterize(&self, path: &Path, dpi: f32) -> Result<Vec<DynamicImage>, PdfError>;

    /// Render only the first page (used for the logo region).
    fn rasterize_first(&self, path: &Path, dpi: f32) -> Result<Option<DynamicImage>, PdfError> {
        Ok(self.rasterize(path, dpi)?.into_iter().next())
    }
}

// ── Mock rasterizer (always available, used for tests) ────────────────────────

/// Serves a preset list of page images regardless of the input path.
pub struct MockRasterizer {
    pub pages: Vec<DynamicImage>,
}

impl MockRasterizer {
    pub fn new(pages: Vec<DynamicImage>) -> Self {
        Self { pages }
    }

    /// A rasterizer that produces no pages at all.
    pub fn empty() -> Self {
        Self { pages: Vec::new() }
    }
}

impl PdfRasterizer for MockRasterizer {
    fn rasterize(&self, _path: &Path, _dpi: f32) -> Result<Vec<DynamicImage>, PdfError> {
        Ok(self.pages.clone())
    }
}

// ── PDFium backend (optional, gated behind `pdfium` feature) ──────────────────

#[cfg(feature = "pdfium")]
pub mod pdfium_backend {
    use super::{PdfError, PdfRasterizer};
    use image::DynamicImage;
    use pdfium_render::prelude::*;
    use std::path::Path;

    pub struct PdfiumRasterizer {
        pdfium: Pdfium,
    }

    impl PdfiumRasterizer {
        /// Bind to a system PDFium library.
        pub fn new() -> Result<Self, PdfError> {
            let pdfium = Pdfium::new(
                Pdfium::bind_to_system_library()
                    .map_err(|e| PdfError::Init(format!("could not find PDFium library: {e}")))?,
            );
            Ok(Self { pdfium })
        }
    }

    impl PdfRasterizer for PdfiumRasterizer {
        fn rasterize(&self, path: &Path, dpi: f32) -> Result<Vec<DynamicImage>, PdfError> {
            let document = self
                .pdfium
                .load_pdf_from_file(path, None)
                .map_err(|e| PdfError::Load(e.to_string()))?;

            // PDF page geometry is in points, 72 per inch.
            let scale = dpi / 72.0;
            let mut pages = Vec::with_capacity(document.pages().len() as usize);
            for (index, page) in document.pages().iter().enumerate() {
                let width_px = (page.width().value * scale) as i32;
                let height_px = (page.height().value * scale) as i32;
                let render_config = PdfRenderConfig::new()
                    .set_target_width(width_px)
                    .set_target_height(height_px);
                let bitmap = page
                    .render_with_config(&render_config)
                    .map_err(|e| PdfError::Render { page: index + 1, message: e.to_string() })?;
                pages.push(bitmap.as_image());
            }
            Ok(pages)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageBuffer, Luma};
    use std::path::PathBuf;

    fn page(value: u8) -> DynamicImage {
        let img: GrayImage = ImageBuffer::from_pixel(4, 4, Luma([value]));
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn mock_serves_pages_in_order() {
        let r = MockRasterizer::new(vec![page(10), page(20)]);
        let pages = r.rasterize(&PathBuf::from("any.pdf"), 300.0).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].to_luma8().get_pixel(0, 0)[0], 10);
        assert_eq!(pages[1].to_luma8().get_pixel(0, 0)[0], 20);
    }

    #[test]
    fn rasterize_first_takes_first_page_only() {
        let r = MockRasterizer::new(vec![page(10), page(20)]);
        let first = r.rasterize_first(&PathBuf::from("any.pdf"), 300.0).unwrap().unwrap();
        assert_eq!(first.to_luma8().get_pixel(0, 0)[0], 10);
    }

    #[test]
    fn empty_pdf_yields_no_pages_without_error() {
        let r = MockRasterizer::empty();
        assert!(r.rasterize(&PathBuf::from("a.pdf"), 300.0).unwrap().is_empty());
        assert!(r.rasterize_first(&PathBuf::from("a.pdf"), 300.0).unwrap().is_none());
    }
}
