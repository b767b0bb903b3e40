//! Normalization of pin payloads sent by the admin pin editor.
//!
//! The editor posts `{ "pins": [...] }` where every field is optional and
//! coordinates may arrive as numbers, numeric strings, or garbage. This
//! module turns each entry into a [`NewPin`] the store can write without
//! further checks:
//!
//! | Field | Rule |
//! |-------|------|
//! | `slug` | slugify(slug, else name), else `pin-<millis>` |
//! | `name` | trimmed, else `Produto sem nome` |
//! | `description` | trimmed, else empty |
//! | `price_label` | trimmed, else `Sob consulta` |
//! | `x_percent`, `y_percent` | coerced to a number (else 0), clamped to 0–100 |
//! | `cta_path` | trimmed, else the slug |
//! | `tracking_code` | trimmed, else `utm_source=<source>&utm_medium=magazine&utm_content=<slug>` |
//! | `badge` | trimmed, else `Destaque` |

use crate::slug::{PIN_PREFIX, slugify_or};
use crate::types::NewPin;
use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_NAME: &str = "Produto sem nome";
pub const DEFAULT_PRICE: &str = "Sob consulta";
pub const DEFAULT_BADGE: &str = "Destaque";

/// Request body of `POST /admin/articles/{id}/pins`.
#[derive(Debug, Default, Deserialize)]
pub struct PinsPayload {
    #[serde(default)]
    pins: Value,
}

impl PinsPayload {
    /// The submitted pins. Anything other than an array counts as empty;
    /// array entries that are not objects are skipped.
    pub fn into_inputs(self) -> Vec<PinInput> {
        match self.pins {
            Value::Array(items) => items
                .into_iter()
                .filter(Value::is_object)
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// One pin as submitted. Text fields that are not strings are ignored.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PinInput {
    #[serde(deserialize_with = "lenient_string")]
    pub slug: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub price_label: Option<String>,
    pub x_percent: Value,
    pub y_percent: Value,
    #[serde(deserialize_with = "lenient_string")]
    pub cta_path: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub tracking_code: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub badge: Option<String>,
}

fn lenient_string<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(de)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Apply defaults, resolve the slug and clamp coordinates.
pub fn normalize(input: &PinInput, tracking_source: &str) -> NewPin {
    let slug_source = non_blank(&input.slug).or_else(|| non_blank(&input.name)).unwrap_or("");
    let slug = slugify_or(slug_source, PIN_PREFIX);

    let cta_path = non_blank(&input.cta_path)
        .map(str::to_string)
        .unwrap_or_else(|| slug.clone());
    let tracking_code = non_blank(&input.tracking_code)
        .map(str::to_string)
        .unwrap_or_else(|| default_tracking_code(tracking_source, &slug));

    NewPin {
        name: text_or(&input.name, DEFAULT_NAME),
        description: text_or(&input.description, ""),
        price_label: text_or(&input.price_label, DEFAULT_PRICE),
        x_percent: clamp_percent(coerce_number(&input.x_percent)),
        y_percent: clamp_percent(coerce_number(&input.y_percent)),
        badge: text_or(&input.badge, DEFAULT_BADGE),
        cta_path,
        tracking_code,
        slug,
    }
}

/// `utm_source=<source>&utm_medium=magazine&utm_content=<slug>`
pub fn default_tracking_code(source: &str, slug: &str) -> String {
    format!("utm_source={source}&utm_medium=magazine&utm_content={slug}")
}

/// Number-ish coercion: numbers as-is, trimmed numeric strings parsed,
/// booleans as 0/1, everything else (including NaN) is 0.
pub fn coerce_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() { 0.0 } else { s.parse().unwrap_or(0.0) }
        }
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => 0.0,
    };
    if n.is_nan() { 0.0 } else { n }
}

/// Clamp to the 0–100 range of a percentage position.
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 100.0) }
}

/// Make `slug` unique against `taken`, appending `-2`, `-3`, … as needed.
pub fn disambiguate(slug: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(slug) {
        return slug.to_string();
    }
    (2u32..)
        .map(|n| format!("{slug}-{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| slug.to_string())
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn text_or(value: &Option<String>, fallback: &str) -> String {
    non_blank(value).unwrap_or(fallback).to_string()
}
