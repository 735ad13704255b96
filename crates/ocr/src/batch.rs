use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::acquire::TextAcquisition;
use crate::config::is_supported_image_extension;
use crate::extract::Extractor;
use crate::pdf::PdfRasterizer;
use crate::recognizer::OcrBackend;
use crate::types::ExtractedFields;

re!(re_squeeze, r"[_\s]+");

const MAX_COMPONENT_LEN: usize = 50;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Folder not found: {0}")]
    FolderNotFound(PathBuf),
    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not find a free name for {filename} after {attempts} attempts")]
    CollisionExhausted { filename: String, attempts: u32 },
    #[error(transparent)]
    Acquire(#[from] crate::acquire::AcquireError),
    #[error("No fields extracted")]
    NoFields,
}

/// One planned (or executed) rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    pub source: PathBuf,
    pub target: PathBuf,
}

/// Outcome counts for a batch run. `renames` holds the plans that succeeded
/// (or, in dry-run mode, would have been executed).
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub renames: Vec<RenamePlan>,
}

// ── Filename assembly ─────────────────────────────────────────────────────────

fn is_edge_trim(c: char) -> bool {
    c == '_' || c == '.'
}

/// Make `text` safe as a filename component: illegal characters become `_`,
/// whitespace and underscore runs collapse to a single `_`, leading and
/// trailing `_`/`.` are trimmed, and the result is capped at 50 characters
/// (re-trimmed, so sanitizing is idempotent). An empty survivor becomes
/// `unknown`.
pub fn sanitize_component(text: &str) -> String {
    let replaced: String = text
        .trim()
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            other => other,
        })
        .collect();
    let squeezed = re_squeeze().replace_all(&replaced, "_");
    let mut out = squeezed.trim_matches(is_edge_trim).to_string();
    if out.chars().count() > MAX_COMPONENT_LEN {
        out = out.chars().take(MAX_COMPONENT_LEN).collect();
        out = out.trim_matches(is_edge_trim).to_string();
    }
    if out.is_empty() {
        "unknown".to_string()
    } else {
        out
    }
}

/// Normalize an extracted amount for the filename: drop the `$`, strip
/// commas, verify the remainder is numeric, then put the `$` back. Anything
/// non-numeric becomes `unknown_amount`.
pub fn amount_component(amount: Option<&str>) -> String {
    let Some(raw) = amount else {
        return "unknown_amount".to_string();
    };
    let cleaned = raw.replace('$', "").trim().replace(',', "");
    if Decimal::from_str(&cleaned).is_ok() {
        format!("${cleaned}")
    } else {
        "unknown_amount".to_string()
    }
}

/// Target name: `{vendor} {date} {$amount}{ext}`, with `unknown_*`
/// placeholders for fields extraction could not fill.
pub fn build_filename(source: &Path, fields: &ExtractedFields) -> String {
    let ext = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let vendor = fields
        .vendor
        .as_deref()
        .map(sanitize_component)
        .unwrap_or_else(|| "unknown_vendor".to_string());
    let date = fields
        .date
        .as_deref()
        .map(sanitize_component)
        .unwrap_or_else(|| "unknown_date".to_string());
    let amount = amount_component(fields.amount.as_deref());
    format!("{vendor} {date} {amount}{ext}")
}

/// Enumerate the files a batch run will touch: regular files whose extension
/// is `.pdf` or a supported image format, any case, de-duplicated
/// case-insensitively and path-sorted so processing order is deterministic.
pub fn supported_files(folder: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(folder)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().map(|e| e.to_string_lossy().to_lowercase()) else {
            continue;
        };
        if ext == "pdf" || is_supported_image_extension(&ext) {
            files.push(path);
        }
    }
    files.sort();
    let mut seen = HashSet::new();
    files.retain(|p| seen.insert(p.to_string_lossy().to_lowercase()));
    Ok(files)
}

/// Append `_1`, `_2`, … to the target stem until the name is free. The loop
/// is capped so a pathological directory cannot spin forever.
fn resolve_collision(
    source: &Path,
    target: PathBuf,
    max_attempts: u32,
) -> Result<PathBuf, BatchError> {
    if !target.exists() || target == source {
        return Ok(target);
    }
    let parent = target.parent().map(Path::to_path_buf).unwrap_or_default();
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = target
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    for counter in 1..=max_attempts {
        let candidate = parent.join(format!("{stem}_{counter}{ext}"));
        if !candidate.exists() {
            return Ok(candidate);
        }
    }
    Err(BatchError::CollisionExhausted {
        filename: format!("{stem}{ext}"),
        attempts: max_attempts,
    })
}

// ── The orchestrator ──────────────────────────────────────────────────────────

/// Drives extraction and renaming over every supported file in a folder.
/// Per-file problems are tallied as failures and never abort the run; only a
/// missing or unreadable folder is fatal.
pub struct BatchOrchestrator<R: OcrBackend, P: PdfRasterizer> {
    acquisition: TextAcquisition<R, P>,
    extractor: Extractor,
}

impl<R: OcrBackend, P: PdfRasterizer> BatchOrchestrator<R, P> {
    pub fn new(acquisition: TextAcquisition<R, P>, extractor: Extractor) -> Self {
        Self { acquisition, extractor }
    }

    pub fn run(
        &self,
        folder: &Path,
        vendor_override: Option<&str>,
        dry_run: bool,
    ) -> Result<BatchSummary, BatchError> {
        if !folder.exists() {
            return Err(BatchError::FolderNotFound(folder.to_path_buf()));
        }
        if !folder.is_dir() {
            return Err(BatchError::NotADirectory(folder.to_path_buf()));
        }

        let files = supported_files(folder)?;
        tracing::info!(count = files.len(), folder = %folder.display(), "starting batch run");
        if dry_run {
            tracing::info!("dry run: no files will be renamed");
        }

        let mut summary = BatchSummary::default();
        for path in files {
            summary.processed += 1;
            match self.process_one(&path, folder, vendor_override, dry_run) {
                Ok(Some(plan)) => {
                    summary.succeeded += 1;
                    summary.renames.push(plan);
                }
                Ok(None) => summary.succeeded += 1,
                Err(e) => {
                    tracing::warn!(file = %path.display(), "skipping file: {e}");
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            processed = summary.processed,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "batch run finished"
        );
        Ok(summary)
    }

    /// `Ok(None)` means the file was already correctly named. Extraction that
    /// fills no field at all is treated as a failure: renaming such a file
    /// would only bury it under a fully-unknown name.
    fn process_one(
        &self,
        path: &Path,
        folder: &Path,
        vendor_override: Option<&str>,
        dry_run: bool,
    ) -> Result<Option<RenamePlan>, BatchError> {
        tracing::info!(file = %path.display(), "processing");
        let acquired = self.acquisition.acquire(path)?;
        let fields = self.extractor.extract(&acquired, vendor_override);
        let filename = build_filename(path, &fields);

        if fields.is_empty() {
            tracing::warn!(
                file = %path.display(),
                would_be = %filename,
                "no fields extracted"
            );
            return Err(BatchError::NoFields);
        }

        let target = resolve_collision(
            path,
            folder.join(&filename),
            self.acquisition.config().max_rename_attempts,
        )?;
        if target == path {
            tracing::info!(file = %path.display(), "already named correctly");
            return Ok(None);
        }

        if dry_run {
            tracing::info!(from = %path.display(), to = %target.display(), "would rename");
        } else {
            fs::rename(path, &target)?;
            tracing::info!(from = %path.display(), to = %target.display(), "renamed");
        }
        Ok(Some(RenamePlan { source: path.to_path_buf(), target }))
    }
}
