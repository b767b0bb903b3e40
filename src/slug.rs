//! URL slugs for articles and product pins.
//!
//! Slugs are derived from human titles written in Portuguese, so accents are
//! the common case rather than the exception:
//!
//! - `"Casa Observatório na Mata Atlântica"` → `"casa-observatorio-na-mata-atlantica"`
//! - `"Poltrona  Jabuticaba (edição 2024)"` → `"poltrona-jabuticaba-edicao-2024"`
//!
//! The transform decomposes to NFD, drops combining marks, lower-cases, and
//! collapses every run of characters outside `[a-z0-9]` into a single `-`.
//! Leading and trailing dashes are trimmed. Input that reduces to nothing
//! (`"!!!"`, `""`) gets a time-based placeholder with a caller-chosen prefix.
//!
//! Slugify is idempotent: `slugify(slugify(x)) == slugify(x)` for any input
//! that produces a non-empty slug. It does not guarantee uniqueness; callers
//! that need unique slugs check the store.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Placeholder prefix used for articles and other generic entries.
pub const ITEM_PREFIX: &str = "item";
/// Placeholder prefix used for product pins.
pub const PIN_PREFIX: &str = "pin";

/// Slugify `value`, falling back to `item-<unix millis>` when empty.
pub fn slugify(value: &str) -> String {
    slugify_or(value, ITEM_PREFIX)
}

/// Slugify `value`, falling back to `<prefix>-<unix millis>` when empty.
pub fn slugify_or(value: &str, prefix: &str) -> String {
    let slug = slug_core(value);
    if slug.is_empty() {
        placeholder(prefix)
    } else {
        slug
    }
}

/// The deterministic part of slugify. Returns an empty string when nothing
/// alphanumeric survives.
pub fn slug_core(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_dash = false;

    for ch in value.nfd().filter(|c| !is_combining_mark(*c)) {
        let lower = ch.to_ascii_lowercase();
        if lower.is_ascii_lowercase() || lower.is_ascii_digit() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(lower);
        } else {
            pending_dash = true;
        }
    }
    out
}

fn placeholder(prefix: &str) -> String {
    format!("{prefix}-{}", chrono::Utc::now().timestamp_millis())
}
