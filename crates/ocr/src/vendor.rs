use regex::Regex;
use serde::Deserialize;

/// Header tokens that are never part of a merchant name.
const STOP_WORDS: &[&str] = &[
    "receipt", "invoice", "transaction", "date", "time", "total", "amount", "due", "balance",
    "charge", "tax", "subtotal", "store", "location", "phone", "tel", "fax", "email", "web",
];

// ── Stop rules: a matching line permanently ends name accumulation ────────────

re!(re_phone, r"\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}");
re!(re_url, r"(?i)https?://|www\.|\.com|\.net|\.org|\.co\.");
re!(re_email, r"@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}");
re!(re_address, r"(?i)\b(street|st|avenue|ave|road|rd|boulevard|blvd|drive|dr|lane|ln|way|court|ct|plaza|plz|suite|ste|unit|apt|apartment)\b");
re!(re_zip, r"\b\d{5}(-\d{4})?\b");
re!(re_store_number, r"(?i)\b(store|location|loc|#)\s*[:#]?\s*\d+");

// ── Soft-skip rules: the line is ignored but scanning continues ───────────────

re!(re_date_or_time, r"\d{1,2}[/-]\d{1,2}[/-]\d{2,4}|\d{1,2}:\d{2}");
re!(re_currency_line, r"\$[\d,]+\.?\d{0,2}|[\d,]+\.?\d{0,2}\s*\$");
re!(re_numeric_only, r"^[\d\s\-/.:]+$");

// ── Cleanup patterns applied to the assembled name ────────────────────────────

re!(re_clean_date_slash, r"\d{1,2}[/-]\d{1,2}[/-]\d{2,4}");
re!(re_clean_date_iso, r"\d{4}[/-]\d{1,2}[/-]\d{1,2}");
re!(re_clean_date_month_first, r"(?i)\w+\s+\d{1,2},?\s+\d{4}");
re!(re_clean_date_day_first, r"(?i)\d{1,2}\s+\w+\s+\d{4}");
re!(re_clean_time, r"(?i)\d{1,2}:\d{2}(?::\d{2})?(?:\s*[AP]M)?");
re!(re_clean_currency, r"\$[\d,]+\.?\d{0,2}");
re!(re_clean_currency_after, r"[\d,]+\.?\d{0,2}\s*\$");
re!(re_clean_labeled_amount,
    r"(?i)(?:total|amount|due|balance|charge|tax|subtotal)[:\s]*\$?\s*[\d,]+\.?\d{0,2}");
re!(re_clean_decimal, r"\d+\.\d{2}");
re!(re_clean_url, r"(?i)https?://\S+|www\.\S+|\S+\.(com|net|org|co)\b");
re!(re_clean_email, r"\S+@\S+");
re!(re_edge_punct, r"^[^\w\s]+|[^\w\s]+$");

fn has_letter(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_alphabetic())
}

fn is_hard_stop(line: &str) -> bool {
    re_phone().is_match(line)
        || re_url().is_match(line)
        || re_email().is_match(line)
        || re_address().is_match(line)
        || re_zip().is_match(line)
        || re_store_number().is_match(line)
}

fn is_soft_skip(line: &str) -> bool {
    re_date_or_time().is_match(line)
        || re_currency_line().is_match(line)
        || re_numeric_only().is_match(line)
}

// ── Canonicalization table ────────────────────────────────────────────────────

/// One raw-pattern → canonical-name rewrite, consulted before the generic
/// heuristics. `context` optionally re-prepends a qualifier (e.g. a city)
/// when it appears anywhere in the surrounding text.
#[derive(Debug)]
pub struct CanonicalRule {
    pattern: Regex,
    canonical: String,
    context: Option<ContextPrefix>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContextPrefix {
    /// Case-insensitive phrase to look for in the document text.
    pub contains: String,
    /// Prefix prepended to the canonical name when the phrase is present.
    pub prefix: String,
}

#[derive(Debug, Deserialize)]
struct RawCanonicalRule {
    pattern: String,
    canonical: String,
    context: Option<ContextPrefix>,
}

#[derive(Debug, Deserialize)]
struct RawCanonicalTable {
    #[serde(default)]
    rules: Vec<RawCanonicalRule>,
}

/// Ordered rewrite rules for merchant names the generic heuristics are known
/// to mangle. First matching rule wins.
#[derive(Debug, Default)]
pub struct CanonicalTable {
    rules: Vec<CanonicalRule>,
}

impl CanonicalTable {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// The built-in table. Currently one entry: the municipal water utility,
    /// whose OCR output arrives in several spellings and orderings.
    pub fn builtin() -> Self {
        let pattern = Regex::new(
            r"(?i)\b(?:dept\.?|department)\s+of\s+water\s*(?:and|&)\s*power\b|\bwater\s+(?:and|&)\s+power\b|\bla\s*dwp\b|\bdwp\b",
        )
        .expect("invalid builtin canonical pattern");
        Self {
            rules: vec![CanonicalRule {
                pattern,
                canonical: "Department of Water and Power".to_string(),
                context: Some(ContextPrefix {
                    contains: "Los Angeles".to_string(),
                    prefix: "Los Angeles".to_string(),
                }),
            }],
        }
    }

    /// Load rules from TOML:
    ///
    /// ```toml
    /// [[rules]]
    /// pattern = "(?i)walmart|wal-mart"
    /// canonical = "Walmart"
    /// ```
    pub fn from_toml(toml_content: &str) -> Result<Self, String> {
        let raw: RawCanonicalTable =
            toml::from_str(toml_content).map_err(|e| format!("Failed to parse TOML: {e}"))?;
        let mut rules = Vec::with_capacity(raw.rules.len());
        for r in raw.rules {
            let pattern = Regex::new(&r.pattern)
                .map_err(|e| format!("Invalid pattern '{}': {e}", r.pattern))?;
            rules.push(CanonicalRule { pattern, canonical: r.canonical, context: r.context });
        }
        Ok(Self { rules })
    }

    /// Match the logo text first, then the body. Returns the canonical name,
    /// context-prefixed when the qualifier phrase appears anywhere in either
    /// text but is not already part of the canonical name.
    fn apply(&self, raw_text: &str, logo_text: Option<&str>) -> Option<String> {
        for rule in &self.rules {
            let hit = logo_text.is_some_and(|t| rule.pattern.is_match(t))
                || rule.pattern.is_match(raw_text);
            if !hit {
                continue;
            }
            let mut name = rule.canonical.clone();
            if let Some(ctx) = &rule.context {
                let needle = ctx.contains.to_lowercase();
                let in_text = logo_text.is_some_and(|t| t.to_lowercase().contains(&needle))
                    || raw_text.to_lowercase().contains(&needle);
                if in_text && !name.to_lowercase().contains(&ctx.prefix.to_lowercase()) {
                    name = format!("{} {}", ctx.prefix, name);
                }
            }
            return Some(name);
        }
        None
    }
}

// ── The heuristic ─────────────────────────────────────────────────────────────

/// Two-tier merchant-name extraction: the logo region when present, the top
/// of the body text otherwise. Behavior differences live in configuration
/// (rule chains, canonical table), not code forks.
#[derive(Debug)]
pub struct VendorHeuristic {
    canonical: CanonicalTable,
    /// Most lines ever accumulated from the logo region.
    max_logo_lines: usize,
    /// How deep into the body text the fallback scan looks.
    body_scan_lines: usize,
}

impl Default for VendorHeuristic {
    fn default() -> Self {
        Self { canonical: CanonicalTable::builtin(), max_logo_lines: 3, body_scan_lines: 10 }
    }
}

impl VendorHeuristic {
    pub fn with_canonical_table(canonical: CanonicalTable) -> Self {
        Self { canonical, ..Self::default() }
    }

    /// Extract the merchant name. Returns `None` when no candidate survives
    /// the filters (result must be longer than 2 chars with at least one
    /// letter).
    pub fn extract(&self, raw_text: &str, logo_text: Option<&str>) -> Option<String> {
        if let Some(canonical) = self.canonical.apply(raw_text, logo_text) {
            return Some(canonical);
        }

        if let Some(logo) = logo_text {
            if let Some(vendor) = self.from_logo(logo) {
                return Some(vendor);
            }
        }

        self.from_body(raw_text)
    }

    /// Tier 1: walk the logo lines accumulating a (possibly multi-line) name.
    /// A hard-stop line ends accumulation for good; soft-skip lines are
    /// passed over. Falls back to the raw first line when nothing qualified.
    fn from_logo(&self, logo_text: &str) -> Option<String> {
        let lines: Vec<&str> = logo_text.trim().split('\n').collect();

        let mut vendor_lines: Vec<&str> = Vec::new();
        for line in &lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if is_hard_stop(line) {
                break;
            }
            if is_soft_skip(line) {
                continue;
            }
            if has_letter(line) && line.len() > 2 {
                vendor_lines.push(line);
                if vendor_lines.len() >= self.max_logo_lines {
                    break;
                }
            }
        }

        let assembled = if vendor_lines.is_empty() {
            lines.first().map(|l| l.trim().to_string()).unwrap_or_default()
        } else {
            vendor_lines.join(" ")
        };

        let cleaned = cleanup(&assembled);
        (cleaned.len() > 2 && has_letter(&cleaned)).then_some(cleaned)
    }

    /// Tier 2: first plausible line near the top of the body text.
    fn from_body(&self, raw_text: &str) -> Option<String> {
        for line in raw_text.lines().take(self.body_scan_lines) {
            let line = line.trim();
            if line.is_empty() || re_numeric_only().is_match(line) || is_hard_stop(line) {
                continue;
            }
            let lower = line.to_lowercase();
            if STOP_WORDS.iter().any(|w| lower.contains(w)) {
                continue;
            }
            if line.len() > 3 && has_letter(line) {
                let cleaned = cleanup(line);
                if cleaned.len() > 2 {
                    return Some(cleaned);
                }
            }
        }
        None
    }
}

/// Strip embedded dates/times, currency, contact info and stop words from an
/// assembled name, then normalize punctuation and whitespace.
fn cleanup(vendor: &str) -> String {
    let mut s = vendor.to_string();
    for pattern in [
        re_clean_date_slash(),
        re_clean_date_iso(),
        re_clean_date_month_first(),
        re_clean_date_day_first(),
        re_clean_time(),
        re_clean_currency(),
        re_clean_currency_after(),
        re_clean_labeled_amount(),
        re_clean_decimal(),
    ] {
        s = pattern.replace_all(&s, "").into_owned();
    }
    s = re_phone().replace_all(&s, "").into_owned();
    s = re_clean_url().replace_all(&s, "").into_owned();
    s = re_clean_email().replace_all(&s, "").into_owned();
    s = re_zip().replace_all(&s, "").into_owned();

    let s: String = s
        .split_whitespace()
        .filter(|w| !STOP_WORDS.contains(&w.to_lowercase().as_str()))
        .collect::<Vec<_>>()
        .join(" ");

    let s = re_edge_punct().replace_all(&s, "").into_owned();
    s.split_whitespace()
        .filter(|w| !re_numeric_only().is_match(w))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heuristic() -> VendorHeuristic {
        VendorHeuristic::default()
    }

    // ── Tier 1 ────────────────────────────────────────────────────────────────

    #[test]
    fn accumulation_stops_at_address_line() {
        let logo = "ACME CORP\n123 Main Street\n(555) 123-4567";
        assert_eq!(heuristic().extract("", Some(logo)).as_deref(), Some("ACME CORP"));
    }

    #[test]
    fn soft_skip_line_does_not_stop_accumulation() {
        let logo = "ACME\n01/15/2024\nHOLDINGS";
        assert_eq!(heuristic().extract("", Some(logo)).as_deref(), Some("ACME HOLDINGS"));
    }

    #[test]
    fn hard_stop_is_permanent_even_for_clean_later_lines() {
        let logo = "(555) 123-4567\nACME CORP";
        // Tier 1 rejects (the raw first line cleans to nothing), tier 2 takes
        // over on the body text.
        let body = "WIDGET EMPORIUM\nthanks";
        assert_eq!(heuristic().extract(body, Some(logo)).as_deref(), Some("WIDGET EMPORIUM"));
    }

    #[test]
    fn at_most_three_lines_accumulated() {
        let logo = "ALPHA\nBETA\nGAMMA\nDELTA";
        assert_eq!(heuristic().extract("", Some(logo)).as_deref(), Some("ALPHA BETA GAMMA"));
    }

    #[test]
    fn embedded_date_stripped_from_single_line() {
        // The lone line is soft-skipped during accumulation, the raw-first-line
        // fallback picks it up, and cleanup strips the date.
        let logo = "ACME CORP 01/15/2024";
        assert_eq!(heuristic().extract("", Some(logo)).as_deref(), Some("ACME CORP"));
    }

    #[test]
    fn stop_words_dropped_from_assembled_name() {
        let logo = "ACME Receipt";
        assert_eq!(heuristic().extract("", Some(logo)).as_deref(), Some("ACME"));
    }

    #[test]
    fn rejects_logo_without_letters() {
        assert_eq!(heuristic().extract("", Some("12345 678")), None);
    }

    // ── Tier 2 ────────────────────────────────────────────────────────────────

    #[test]
    fn body_fallback_without_logo() {
        let body = "123-456\nWIDGET EMPORIUM\nTotal $9.99";
        assert_eq!(heuristic().extract(body, None).as_deref(), Some("WIDGET EMPORIUM"));
    }

    #[test]
    fn body_skips_stop_word_lines() {
        let body = "Receipt of purchase\nWIDGET EMPORIUM";
        assert_eq!(heuristic().extract(body, None).as_deref(), Some("WIDGET EMPORIUM"));
    }

    #[test]
    fn body_skips_contact_lines() {
        let body = "www.example.com\nsupport@example.com\nWIDGET EMPORIUM";
        assert_eq!(heuristic().extract(body, None).as_deref(), Some("WIDGET EMPORIUM"));
    }

    #[test]
    fn body_scan_limited_to_first_ten_lines() {
        let mut lines = vec!["111"; 10];
        lines.push("WIDGET EMPORIUM");
        assert_eq!(heuristic().extract(&lines.join("\n"), None), None);
    }

    #[test]
    fn nothing_usable_yields_none() {
        assert_eq!(heuristic().extract("", None), None);
        assert_eq!(heuristic().extract("12345\n$9.99", None), None);
    }

    // ── Canonicalization ──────────────────────────────────────────────────────

    #[test]
    fn canonical_rewrite_of_utility_variants() {
        for variant in ["DWP", "LADWP", "Dept of Water & Power", "WATER AND POWER"] {
            let got = heuristic().extract("Account 12345", Some(variant));
            assert_eq!(got.as_deref(), Some("Department of Water and Power"), "variant {variant}");
        }
    }

    #[test]
    fn canonical_prefix_prepended_from_context() {
        let body = "City of Los Angeles\nAccount 12345";
        let got = heuristic().extract(body, Some("DWP"));
        assert_eq!(got.as_deref(), Some("Los Angeles Department of Water and Power"));
    }

    #[test]
    fn canonical_table_from_toml() {
        let toml = r#"
            [[rules]]
            pattern = "(?i)wal-?mart"
            canonical = "Walmart"
        "#;
        let table = CanonicalTable::from_toml(toml).unwrap();
        let h = VendorHeuristic::with_canonical_table(table);
        assert_eq!(h.extract("WAL-MART #1234", None).as_deref(), Some("Walmart"));
    }

    #[test]
    fn invalid_toml_pattern_is_an_error() {
        let toml = r#"
            [[rules]]
            pattern = "("
            canonical = "Broken"
        "#;
        assert!(CanonicalTable::from_toml(toml).is_err());
    }

    #[test]
    fn empty_table_skips_canonicalization() {
        let h = VendorHeuristic::with_canonical_table(CanonicalTable::empty());
        assert_eq!(h.extract("", Some("DWP HQ")).as_deref(), Some("DWP HQ"));
    }

    // ── Cleanup invariants ────────────────────────────────────────────────────

    #[test]
    fn result_always_has_letters_and_length() {
        let cases = [
            ("", Some("$$ 12.34 $$")),
            ("", Some("..")),
            ("\n\n", None),
        ];
        for (body, logo) in cases {
            if let Some(v) = heuristic().extract(body, logo) {
                assert!(v.len() > 2 && v.chars().any(|c| c.is_ascii_alphabetic()), "got {v:?}");
            }
        }
    }
}
