//! Display-text formatting for the values inserted into a deck.
//!
//! Everything here is pure string work: escaping for XML text content,
//! joining channel and region lists, and deriving a safe output file name.

use unicode_normalization::UnicodeNormalization;

use crate::types::Channel;

/// Display text used when no key regions were given.
pub const DEFAULT_REGION_TEXT: &str = "Pan India";

/// File stem used when a brand name has no usable characters.
const FALLBACK_FILE_STEM: &str = "deck";

/// Extension of generated decks.
pub const DECK_EXTENSION: &str = "pptx";

/// Escape the five reserved XML characters.
///
/// An empty input yields an empty string.
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Join the allow-listed channels as upper-case tokens.
///
/// Returns `None` when no token survives filtering; callers reject the
/// request in that case.
pub fn channel_display(tokens: &[String]) -> Option<String> {
    let channels = Channel::parse_all(tokens);

    if channels.is_empty() {
        return None;
    }

    Some(
        channels
            .iter()
            .map(Channel::as_str)
            .collect::<Vec<_>>()
            .join(", "),
    )
}

/// Join regions for display, falling back to [`DEFAULT_REGION_TEXT`].
pub fn region_display(regions: &[String]) -> String {
    let regions: Vec<&str> = regions
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .collect();

    if regions.is_empty() {
        DEFAULT_REGION_TEXT.to_string()
    } else {
        regions.join(", ")
    }
}

/// Reduce a brand name to `[A-Za-z0-9]` for use in a file name.
///
/// Compatibility decomposition runs first so "Café" becomes "Cafe" rather
/// than "Caf".
pub fn sanitize_file_stem(brand_name: &str) -> String {
    let stem: String = brand_name
        .nfkd()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    if stem.is_empty() {
        FALLBACK_FILE_STEM.to_string()
    } else {
        stem
    }
}

/// Build `<sanitized-brand>_<unix-ms>.pptx`.
pub fn output_file_name(brand_name: &str, unix_millis: i64) -> String {
    format!(
        "{}_{}.{}",
        sanitize_file_stem(brand_name),
        unix_millis,
        DECK_EXTENSION
    )
}
