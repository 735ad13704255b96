use std::path::Path;

use anyhow::{bail, Context, Result};
use recibo_ocr::{
    BatchOrchestrator, DocumentKind, Extractor, OcrBackend, PdfRasterizer, PipelineConfig,
    TextAcquisition,
};

#[cfg(feature = "tesseract")]
fn recognizer() -> impl OcrBackend {
    recibo_ocr::recognizer::tesseract_backend::TesseractRecognizer::new(None, "eng")
}

#[cfg(not(feature = "tesseract"))]
fn recognizer() -> impl OcrBackend {
    recibo_ocr::MockRecognizer::new("")
}

#[cfg(feature = "pdfium")]
fn rasterizer() -> Result<impl PdfRasterizer> {
    Ok(recibo_ocr::pdf::pdfium_backend::PdfiumRasterizer::new()?)
}

#[cfg(not(feature = "pdfium"))]
fn rasterizer() -> Result<impl PdfRasterizer> {
    Ok(recibo_ocr::MockRasterizer::empty())
}

fn acquisition() -> Result<TextAcquisition<impl OcrBackend, impl PdfRasterizer>> {
    Ok(TextAcquisition::new(recognizer(), rasterizer()?, PipelineConfig::default()))
}

pub fn extract(path: &Path, vendor: Option<&str>, debug: bool) -> Result<()> {
    if !path.exists() {
        bail!("File not found: {}", path.display());
    }

    if debug {
        match DocumentKind::from_path(path) {
            DocumentKind::Pdf => eprintln!("File type detected: PDF"),
            DocumentKind::Image => probe_image(path)?,
        }
    }

    let acquired = acquisition()?
        .acquire(path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    for warning in &acquired.warnings {
        tracing::warn!("{warning}");
    }
    let fields = Extractor::default().extract(&acquired, vendor);

    println!("\n--- Receipt Details ---");
    println!("Vendor: {}", fields.vendor.as_deref().unwrap_or("Not found"));
    println!("Transaction Date: {}", fields.date.as_deref().unwrap_or("Not found"));
    println!("Transaction Amount: {}", fields.amount.as_deref().unwrap_or("Not found"));

    if debug {
        println!("\n--- Raw OCR Text ---");
        println!("{}", acquired.raw_text);
    }
    Ok(())
}

/// Report what the image decoder makes of the file. A format the decoder
/// cannot even probe is rejected here with a clear message instead of failing
/// deeper in the pipeline.
fn probe_image(path: &Path) -> Result<()> {
    let reader = image::ImageReader::open(path)?.with_guessed_format()?;
    match reader.format() {
        Some(format) => eprintln!("Image format detected: {format:?}"),
        None => eprintln!("Image format not recognized, attempting to process anyway"),
    }
    let img = reader
        .decode()
        .with_context(|| format!("File appears to be an unsupported format: {}", path.display()))?;
    eprintln!("Image color type: {:?}", img.color());
    eprintln!("Image size: {}x{}", img.width(), img.height());
    Ok(())
}

pub fn batch(folder: &Path, vendor_name: &str, dry_run: bool) -> Result<()> {
    let orchestrator = BatchOrchestrator::new(acquisition()?, Extractor::default());
    let summary = orchestrator.run(folder, Some(vendor_name), dry_run)?;

    if summary.processed == 0 {
        println!("No supported image or PDF files found in {}", folder.display());
        return Ok(());
    }

    println!("\n--- Summary ---");
    println!("Successfully processed: {}", summary.succeeded);
    println!("Errors: {}", summary.failed);
    Ok(())
}
