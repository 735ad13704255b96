use std::str::FromStr;

use rust_decimal::Decimal;

// Candidate families, scanned in order but pooled: keyword-anchored,
// bare-currency, keyword-anchored with comma grouping. The grouped family
// captures whole thousand groups so `$1,234.56` is not truncated at the
// first comma.
re!(re_keyword_amount, r"(?i)(?:total|amount|due|balance|charge)[:\s]*\$?\s*(\d+\.?\d{0,2})");
re!(re_bare_currency, r"\$\s*(\d+\.?\d{0,2})");
re!(re_keyword_grouped,
    r"(?i)(?:total|amount|due|balance|charge)[:\s]*\$?\s*(\d{1,3}(?:,\d{3})+(?:\.\d{1,2})?)");
re!(re_fallback_currency, r"\$(\d+\.?\d{0,2})");

/// Scan `text` for currency-shaped values and return the numerically largest
/// as `$` + digits. The largest value is used rather than keyword proximity:
/// OCR reliably garbles the word "total", but the grand total is almost always
/// the biggest number on the page.
pub fn extract_amount(text: &str) -> Option<String> {
    let mut best: Option<(Decimal, String)> = None;
    for family in [re_keyword_amount(), re_bare_currency(), re_keyword_grouped()] {
        for cap in family.captures_iter(text) {
            let Some(m) = cap.get(1) else { continue };
            let cleaned = m.as_str().replace(',', "");
            let Ok(value) = Decimal::from_str(&cleaned) else { continue };
            // Strictly greater, so the earliest of equal candidates sticks.
            if best.as_ref().is_none_or(|(b, _)| value > *b) {
                best = Some((value, cleaned));
            }
        }
    }
    if let Some((_, digits)) = best {
        return Some(format!("${digits}"));
    }

    // Last resort: any bare dollar amount, normalized to two decimal places.
    // (The primary path keeps the original precision; this one does not.)
    re_fallback_currency()
        .captures_iter(text)
        .filter_map(|cap| Decimal::from_str(&cap.get(1)?.as_str().replace(',', "")).ok())
        .max()
        .map(|value| format!("${value:.2}"))
}
