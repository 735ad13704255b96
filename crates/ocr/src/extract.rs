use crate::types::{AcquiredText, ExtractedFields};
use crate::vendor::VendorHeuristic;
use crate::{amount, date};

/// Runs the three field extractors over an acquired transcript. Each field is
/// independent; any of them may come back `None` without affecting the others.
#[derive(Debug, Default)]
pub struct Extractor {
    vendor: VendorHeuristic,
}

impl Extractor {
    pub fn new(vendor: VendorHeuristic) -> Self {
        Self { vendor }
    }

    /// A caller-supplied vendor name is taken verbatim; the vendor heuristic
    /// never runs in that case, so even a name the filters would reject is
    /// honored.
    pub fn extract(&self, acquired: &AcquiredText, vendor_override: Option<&str>) -> ExtractedFields {
        let vendor = match vendor_override {
            Some(name) => Some(name.to_string()),
            None => self
                .vendor
                .extract(&acquired.raw_text, acquired.logo_text.as_deref()),
        };

        ExtractedFields {
            vendor,
            date: date::extract_date(&acquired.raw_text),
            amount: amount::extract_amount(&acquired.raw_text),
        }
    }
}
