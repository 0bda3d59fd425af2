//! Category rules: color format and title normalization.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;

/// Color assigned to categories created without one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#9e9e9e";

static HEX_COLOR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$")
        .expect("Invalid regex pattern")
});

/// `rgb()`, `rgba()`, `hsl()` and `hsla()` with three or four numeric
/// arguments, comma or space separated, percentages allowed.
static FUNCTIONAL_COLOR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(rgb|rgba|hsl|hsla)\(\s*\d{1,3}(\.\d+)?%?(\s*[,\s]\s*\d{1,3}(\.\d+)?%?){2}(\s*[,/]\s*(0|1|0?\.\d+|\d{1,3}%))?\s*\)$",
    )
    .expect("Invalid regex pattern")
});

static NAMED_COLOR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z]{3,20}$").expect("Invalid regex pattern"));

/// Validates a CSS-like color and returns it trimmed.
pub fn validate_color(raw: &str) -> Result<String, ValidationError> {
    let color = raw.trim();
    let valid = HEX_COLOR_REGEX.is_match(color)
        || FUNCTIONAL_COLOR_REGEX.is_match(&color.to_ascii_lowercase())
        || NAMED_COLOR_REGEX.is_match(color);

    if valid {
        Ok(color.to_string())
    } else {
        Err(ValidationError::InvalidColor(raw.to_string()))
    }
}

/// Trims a category title and rejects blank ones.
pub fn normalize_title(raw: &str) -> Result<String, ValidationError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ValidationError::Blank("title"));
    }
    Ok(title.to_string())
}
