//! End-to-end batch rename flow through the public API, with mock backends.

use std::path::Path;

use image::{GrayImage, ImageBuffer, Luma};
use recibo_ocr::{
    BatchOrchestrator, Extractor, MockRasterizer, MockRecognizer, PipelineConfig, TextAcquisition,
};

fn write_receipt_png(dir: &Path, name: &str) {
    let img: GrayImage = ImageBuffer::from_pixel(200, 400, Luma([220]));
    image::DynamicImage::ImageLuma8(img)
        .save_with_format(dir.join(name), image::ImageFormat::Png)
        .unwrap();
}

fn orchestrator(recognizer: MockRecognizer) -> BatchOrchestrator<MockRecognizer, MockRasterizer> {
    let acquisition =
        TextAcquisition::new(recognizer, MockRasterizer::empty(), PipelineConfig::default());
    BatchOrchestrator::new(acquisition, Extractor::default())
}

#[test]
fn batch_renames_from_extracted_fields_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    write_receipt_png(dir.path(), "scan_001.png");
    write_receipt_png(dir.path(), "scan_002.png");
    std::fs::write(dir.path().join("notes.txt"), b"not a receipt").unwrap();

    let recognizer = MockRecognizer::with_logo("01/15/2024\nTotal $42.99", "ACME CORP");
    let summary = orchestrator(recognizer).run(dir.path(), None, false).unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 0);

    // Vendor from the logo region, sanitized for the filename; the second
    // file maps to the same name and picks up the collision suffix.
    assert!(dir.path().join("ACME_CORP 2024-01-15 $42.99.png").exists());
    assert!(dir.path().join("ACME_CORP 2024-01-15 $42.99_1.png").exists());
    assert!(!dir.path().join("scan_001.png").exists());
    assert!(!dir.path().join("scan_002.png").exists());
    // Unsupported files are never touched.
    assert!(dir.path().join("notes.txt").exists());
}

#[test]
fn dry_run_reports_plans_but_renames_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write_receipt_png(dir.path(), "scan_001.png");

    let recognizer = MockRecognizer::new("01/15/2024\nTotal $5.00");
    let summary = orchestrator(recognizer).run(dir.path(), Some("Shop"), true).unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.renames.len(), 1);
    assert_eq!(summary.renames[0].target, dir.path().join("Shop 2024-01-15 $5.00.png"));
    assert!(dir.path().join("scan_001.png").exists());
    assert!(!dir.path().join("Shop 2024-01-15 $5.00.png").exists());
}
