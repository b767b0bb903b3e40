//! Text helpers used when an article is authored.
//!
//! The editor submits rich HTML. Everything derived from it (excerpt,
//! subtitle, reading time, highlight helper) is computed from the
//! tag-stripped text so markup never leaks into summaries.

use regex::Regex;
use std::sync::LazyLock;

/// Words per minute used for reading-time estimates.
pub const WORDS_PER_MINUTE: usize = 120;
/// Shortest reading time ever reported, in minutes.
pub const MIN_READING_MINUTES: u32 = 3;
/// Maximum length of an excerpt, in characters.
pub const EXCERPT_CHARS: usize = 200;

pub const DEFAULT_SUBTITLE: &str = "Matéria interativa publicada pela Habitare.";
pub const DEFAULT_HELPER: &str = "Conteúdo curado pelo estúdio Habitare.";

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

/// Remove anything that looks like an HTML tag and trim the result.
///
/// Entities are left as-is; this is a summary helper, not a sanitizer.
pub fn strip_html(html: &str) -> String {
    TAG.replace_all(html, "").trim().to_string()
}

/// Reading time in whole minutes: `ceil(words / 120)`, never below 3.
pub fn reading_time(text: &str) -> u32 {
    let words = text.split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE) as u32;
    minutes.max(MIN_READING_MINUTES)
}

/// The first [`EXCERPT_CHARS`] characters of `text`.
pub fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_CHARS).collect()
}

/// The first sentence of `text` (everything before the first `.`), or
/// `fallback` when that is blank.
pub fn first_sentence<'a>(text: &'a str, fallback: &'a str) -> &'a str {
    let first = text.split('.').next().unwrap_or_default().trim();
    if first.is_empty() { fallback } else { first }
}

/// Subtitle derived from body text, falling back to the house default.
pub fn subtitle(text: &str) -> String {
    first_sentence(text, DEFAULT_SUBTITLE).to_string()
}

/// The second and third sentences joined with `". "`, used as the helper
/// line under the highlight stat. Falls back to `fallback` when blank.
pub fn helper_text(text: &str, fallback: &str) -> String {
    let joined = text.split('.').skip(1).take(2).collect::<Vec<_>>().join(". ");
    let joined = joined.trim();
    if joined.is_empty() {
        fallback.to_string()
    } else {
        joined.to_string()
    }
}
