use chrono::NaiveDate;

// Shape patterns tried in fixed priority order. The first pattern with a
// match wins, and within it the first match in document order.
re!(re_numeric_sep, r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b");
re!(re_year_first, r"\b\d{4}[/-]\d{1,2}[/-]\d{1,2}\b");
re!(re_month_first, r"\b\w+\s+\d{1,2},?\s+\d{4}\b");
re!(re_day_first, r"\b\d{1,2}\s+\w+\s+\d{4}\b");

/// Scan `text` for the first date-shaped token and normalize it to
/// `YYYY-MM-DD`. A token that matches a shape but parses under none of the
/// format hypotheses yields `None` outright — lower-priority shapes are not
/// retried once a token has been claimed.
pub fn extract_date(text: &str) -> Option<String> {
    let patterns = [re_numeric_sep(), re_year_first(), re_month_first(), re_day_first()];
    for pattern in patterns {
        if let Some(m) = pattern.find(text) {
            return parse_token(m.as_str()).map(|d| d.format("%Y-%m-%d").to_string());
        }
    }
    None
}

fn parse_token(token: &str) -> Option<NaiveDate> {
    if token.contains('/') || token.contains('-') {
        parse_numeric(token)
    } else {
        parse_textual(token)
    }
}

/// Separator-delimited dates. Hypothesis order: year-first when the leading
/// component has 4 digits; otherwise US month-first, then day-first, for both
/// 4-digit and expanded 2-digit years.
fn parse_numeric(token: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = token.split(['/', '-']).collect();
    if parts.len() != 3 {
        return None;
    }

    if parts[0].len() == 4 {
        let y: i32 = parts[0].parse().ok()?;
        let m: u32 = parts[1].parse().ok()?;
        let d: u32 = parts[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(y, m, d);
    }

    let p1: u32 = parts[0].parse().ok()?;
    let p2: u32 = parts[1].parse().ok()?;
    let year: i32 = expand_year(parts[2].parse().ok()?);

    // MM/DD first (US), then DD/MM.
    NaiveDate::from_ymd_opt(year, p1, p2).or_else(|| NaiveDate::from_ymd_opt(year, p2, p1))
}

/// Textual-month dates: "December 15, 2023", "Dec 15 2023", "15 December 2023".
fn parse_textual(token: &str) -> Option<NaiveDate> {
    let cleaned = token.replace(',', " ");
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    if words.len() != 3 {
        return None;
    }

    if words[0].chars().next()?.is_ascii_digit() {
        // DD Month YYYY
        let day: u32 = words[0].parse().ok()?;
        let month = month_to_num(words[1])?;
        let year: i32 = words[2].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    } else {
        // Month DD YYYY
        let month = month_to_num(words[0])?;
        let day: u32 = words[1].parse().ok()?;
        let year: i32 = words[2].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

fn expand_year(y: i32) -> i32 {
    if y < 100 {
        2000 + y
    } else {
        y
    }
}

/// Full month name first, then the 3-letter abbreviation.
fn month_to_num(name: &str) -> Option<u32> {
    match name.to_lowercase().as_str() {
        "january" => Some(1), "february" => Some(2), "march" => Some(3),
        "april" => Some(4), "may" => Some(5), "june" => Some(6),
        "july" => Some(7), "august" => Some(8), "september" => Some(9),
        "october" => Some(10), "november" => Some(11), "december" => Some(12),
        "jan" => Some(1), "feb" => Some(2), "mar" => Some(3), "apr" => Some(4),
        "jun" => Some(6), "jul" => Some(7), "aug" => Some(8),
        "sep" => Some(9), "oct" => Some(10), "nov" => Some(11), "dec" => Some(12),
        _ => None,
    }
}
