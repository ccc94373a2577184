// src/model/coerce.rs
//
// Lenient value coercion. Nothing in here fails: a value that can't be read
// becomes `None`.

use serde::{Deserialize, Deserializer};

/// Earliest plausible release year (first motion picture).
pub const MIN_YEAR: i32 = 1888;
pub const MAX_YEAR: i32 = 2100;

/// IMDb's null marker.
pub const NULL_MARKER: &str = "\\N";

/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    }
}

pub fn is_missing(raw: &str) -> bool {
    let c = clean_str(raw);
    c.is_empty() || c == NULL_MARKER
}

/// Text field, or `None` for blank / `\N`. Non-missing text is kept verbatim.
pub fn text(raw: &str) -> Option<String> {
    if is_missing(raw) {
        None
    } else {
        Some(raw.to_string())
    }
}

/// Parse an integer, also accepting float renderings of whole numbers ("1995.0").
fn whole_number(raw: &str) -> Option<i64> {
    let c = clean_str(raw);
    if let Ok(v) = c.parse::<i64>() {
        return Some(v);
    }
    let f = c.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

pub fn parse_year(raw: &str) -> Option<i32> {
    whole_number(raw).and_then(|v| i32::try_from(v).ok())
}

pub fn parse_rating(raw: &str) -> Option<f64> {
    clean_str(raw).parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_count(raw: &str) -> Option<i64> {
    whole_number(raw)
}

/// Null out implausible release years.
pub fn plausible_year(year: Option<i32>) -> Option<i32> {
    year.filter(|y| (MIN_YEAR..=MAX_YEAR).contains(y))
}

// ─── serde adapters ─────────────────────────────────────────────────────

pub fn de_text<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw.as_deref().and_then(text))
}

pub fn de_year<'de, D>(d: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw.as_deref().and_then(parse_year))
}

pub fn de_rating<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw.as_deref().and_then(parse_rating))
}

pub fn de_count<'de, D>(d: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw.as_deref().and_then(parse_count))
}
