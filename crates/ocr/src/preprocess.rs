use std::io::Cursor;
use std::path::Path;

use image::metadata::Orientation;
use image::{
    imageops, DynamicImage, GrayImage, ImageBuffer, ImageDecoder, ImageFormat, Luma, Rgb, RgbImage,
};
use thiserror::Error;

use crate::config::PipelineConfig;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to read image file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

/// A decoded, orientation-corrected document image.
#[derive(Debug)]
pub struct LoadedImage {
    pub image: DynamicImage,
    /// Format detected by the decoder, when identifiable.
    pub format: Option<ImageFormat>,
    /// Non-fatal degradations (e.g. unreadable EXIF orientation).
    pub warnings: Vec<String>,
}

/// Load an image file, applying EXIF auto-rotation best-effort. A failure to
/// read orientation metadata keeps the original orientation and is recorded
/// as a warning rather than an error.
pub fn load_oriented(path: &Path) -> Result<LoadedImage, PreprocessError> {
    let mut warnings = Vec::new();

    let reader = image::ImageReader::open(path)?.with_guessed_format()?;
    let format = reader.format();
    let mut decoder = reader.into_decoder()?;

    let orientation = match decoder.orientation() {
        Ok(o) => o,
        Err(e) => {
            warnings.push(format!("could not read EXIF orientation: {e}"));
            Orientation::NoTransforms
        }
    };

    let mut image = DynamicImage::from_decoder(decoder)?;
    image.apply_orientation(orientation);

    Ok(LoadedImage { image, format, warnings })
}

/// Composite any alpha channel onto an opaque white background. Images without
/// alpha pass through untouched; palette images arrive here already expanded
/// by the decoder.
pub fn flatten_onto_white(img: DynamicImage) -> DynamicImage {
    if !img.color().has_alpha() {
        return img;
    }

    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    let mut out: RgbImage = ImageBuffer::from_pixel(w, h, Rgb([255, 255, 255]));
    for (x, y, p) in rgba.enumerate_pixels() {
        let a = p[3] as u32;
        let blend = |c: u8| (((c as u32) * a + 255 * (255 - a)) / 255) as u8;
        out.put_pixel(x, y, Rgb([blend(p[0]), blend(p[1]), blend(p[2])]));
    }
    DynamicImage::ImageRgb8(out)
}

/// The OCR legibility pipeline: grayscale, conditional upscale, histogram
/// stretch, contrast boost, sharpen, binarize. Pure pixel transformation;
/// cannot fail on a valid bitmap.
///
/// The output is 8-bit grayscale holding only 0/255 — recognition engines
/// handle 8-bit input better than 1-bit even when the content is binary.
pub fn preprocess(img: &DynamicImage, config: &PipelineConfig) -> GrayImage {
    let gray = img.to_luma8();
    let gray = upscale_if_small(gray, config.min_ocr_dimension);
    let gray = autocontrast(&gray, config.autocontrast_cutoff);
    let gray = boost_contrast(&gray, config.contrast_boost);
    let gray = sharpen(&gray);
    binarize(&gray, config.binarize_threshold)
}

/// Uniformly upscale with Lanczos resampling so the shorter dimension becomes
/// exactly `min_dimension`, preserving aspect ratio. Larger images pass
/// through unchanged.
fn upscale_if_small(gray: GrayImage, min_dimension: u32) -> GrayImage {
    let (w, h) = gray.dimensions();
    let shorter = w.min(h);
    if shorter == 0 || shorter >= min_dimension {
        return gray;
    }

    let scale = min_dimension as f32 / shorter as f32;
    let (new_w, new_h) = if w <= h {
        (min_dimension, (h as f32 * scale).round() as u32)
    } else {
        ((w as f32 * scale).round() as u32, min_dimension)
    };
    imageops::resize(&gray, new_w, new_h, imageops::FilterType::Lanczos3)
}

/// Histogram stretch after discarding `cutoff` (a fraction, e.g. 0.02) of the
/// pixel population from each tail.
fn autocontrast(gray: &GrayImage, cutoff: f32) -> GrayImage {
    let mut hist = [0u64; 256];
    for p in gray.pixels() {
        hist[p[0] as usize] += 1;
    }
    let total: u64 = hist.iter().sum();
    if total == 0 {
        return gray.clone();
    }
    let clip = (total as f64 * cutoff as f64) as u64;

    let mut lo = 0usize;
    let mut acc = 0u64;
    while lo < 255 {
        acc += hist[lo];
        if acc > clip {
            break;
        }
        lo += 1;
    }

    let mut hi = 255usize;
    acc = 0;
    while hi > 0 {
        acc += hist[hi];
        if acc > clip {
            break;
        }
        hi -= 1;
    }

    if hi <= lo {
        // Degenerate histogram — nothing to stretch.
        return gray.clone();
    }

    let range = (hi - lo) as f32;
    ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        let p = gray.get_pixel(x, y)[0] as f32;
        let v = ((p - lo as f32) * 255.0 / range).clamp(0.0, 255.0);
        Luma([v as u8])
    })
}

/// Scale pixel deviation from the image mean by `factor`.
fn boost_contrast(gray: &GrayImage, factor: f32) -> GrayImage {
    let total: u64 = gray.pixels().map(|p| p[0] as u64).sum();
    let count = (gray.width() as u64 * gray.height() as u64).max(1);
    let mean = total as f32 / count as f32;

    ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        let p = gray.get_pixel(x, y)[0] as f32;
        let v = (mean + (p - mean) * factor).clamp(0.0, 255.0);
        Luma([v as u8])
    })
}

/// Edge-sharpening convolution (center-heavy 3×3 kernel, normalized by 16).
fn sharpen(gray: &GrayImage) -> GrayImage {
    const KERNEL: [f32; 9] = [
        -2.0 / 16.0, -2.0 / 16.0, -2.0 / 16.0,
        -2.0 / 16.0, 32.0 / 16.0, -2.0 / 16.0,
        -2.0 / 16.0, -2.0 / 16.0, -2.0 / 16.0,
    ];
    imageops::filter3x3(gray, &KERNEL)
}

/// Pixels strictly above `threshold` become white, the rest black.
fn binarize(gray: &GrayImage, threshold: u8) -> GrayImage {
    ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        let p = gray.get_pixel(x, y)[0];
        Luma([if p > threshold { 255 } else { 0 }])
    })
}

/// Encode a processed bitmap as PNG bytes for the OCR backend.
pub fn encode_as_png(gray: &GrayImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    DynamicImage::ImageLuma8(gray.clone())
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}
