//! Shared helpers for upstream value coercion and stored file naming.
//!
//! The NPS API serves coordinates and site counts as strings. Coordinates
//! become `Option<Decimal>` (blank or garbage → `None`), site counts become
//! `i32` (garbage → 0).

use rust_decimal::Decimal;
use std::str::FromStr;

/// Length of the random suffix the record store appends to stored file names.
const STORAGE_SUFFIX_LEN: usize = 10;

/// Parse an upstream coordinate string, returning `None` for blank or invalid input.
pub(crate) fn parse_coordinate(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed).ok()
}

/// Parse an upstream site count. Anything that is not an integer counts as zero.
pub(crate) fn parse_site_count(raw: &str) -> i32 {
    match raw.trim().parse::<i32>() {
        Ok(n) => n,
        Err(e) => {
            if !raw.is_empty() {
                tracing::debug!("Site count '{}' is not an integer ({}), using 0", raw, e);
            }
            0
        }
    }
}

/// Convert a free-form name into lower snake case tokens.
///
/// Splits on every character that is not an ASCII letter or digit, and on
/// lower→upper camel-case boundaries. `"Half-Dome sunset"` → `"half_dome_sunset"`,
/// `"YosemiteValley"` → `"yosemite_valley"`.
pub(crate) fn snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for word in s.split(|c: char| !c.is_ascii_alphanumeric()) {
        if word.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('_');
        }
        let mut prev_upper = true;
        for (i, c) in word.chars().enumerate() {
            let upper = c.is_ascii_uppercase();
            if upper && i > 0 && !prev_upper {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_upper = upper;
        }
    }
    out
}

/// Last path segment of a URL with its extension removed.
///
/// Query strings and fragments are ignored. `https://x/a/b/Old_Faithful.JPG?w=1`
/// → `"Old_Faithful"`.
pub(crate) fn url_file_stem(url: &str) -> &str {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    let file_name = without_query
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(without_query);
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => &file_name[..dot],
        _ => file_name,
    }
}

/// Strip a storage-assigned suffix: everything from the last underscore onward.
/// Names without an underscore are returned unchanged.
pub(crate) fn strip_storage_suffix(name: &str) -> &str {
    match name.rfind('_') {
        Some(idx) => &name[..idx],
        None => name,
    }
}

/// Build the name under which an ingested file is stored:
/// `<snake_case(stem)>_<random suffix>.<extension>`.
pub(crate) fn storage_file_name(original_name: &str, extension: &str) -> String {
    let stem = snake_case(url_file_stem(original_name));
    let suffix: String = uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(STORAGE_SUFFIX_LEN)
        .collect();
    format!("{}_{}.{}", stem, suffix, extension)
}
