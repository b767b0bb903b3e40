//! Outbound product links with analytics parameters.
//!
//! Each pin's call-to-action becomes a shop URL carrying UTM parameters:
//!
//! ```text
//! cta_path "poltrona-ilha", slug "poltrona-ilha", source "revista-habitare"
//!   → https://loja.habitare.com/produtos/poltrona-ilha?utm_source=revista-habitare&utm_content=poltrona-ilha
//! ```
//!
//! Parameter precedence, lowest to highest: query already on the base URL,
//! pairs from the pin's `tracking_code`, the default `utm_source` (only when
//! absent), and finally `utm_content`, which is always the pin slug.

use crate::types::ProductPin;
use url::form_urlencoded;

/// Build the tracked URL for `pin`.
pub fn tracked_link(pin: &ProductPin, shop_base_url: &str, source: &str) -> String {
    let cta = pin.cta_path.as_deref().unwrap_or("").trim();
    let base = if cta.starts_with("http") {
        cta.to_string()
    } else {
        let path = if cta.is_empty() { pin.slug.as_str() } else { cta };
        format!(
            "{}/{}",
            shop_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    };

    let (clean_base, base_query) = match base.split_once('?') {
        Some((b, q)) => (b.to_string(), q.to_string()),
        None => (base, String::new()),
    };

    let mut params = QueryPairs::parse(&base_query);
    if let Some(code) = pin.tracking_code.as_deref() {
        for (key, value) in QueryPairs::parse(code).0 {
            params.set(&key, &value);
        }
    }
    if !params.has("utm_source") {
        params.set("utm_source", source);
    }
    params.set("utm_content", &pin.slug);

    format!("{clean_base}?{}", params.encode())
}

/// Ordered query pairs with `URLSearchParams.set` semantics: setting a key
/// replaces its first occurrence in place and drops any later duplicates.
#[derive(Debug, Default)]
struct QueryPairs(Vec<(String, String)>);

impl QueryPairs {
    fn parse(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        Self(
            form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        )
    }

    fn has(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    fn set(&mut self, key: &str, value: &str) {
        match self.0.iter().position(|(k, _)| k == key) {
            Some(first) => {
                self.0[first].1 = value.to_string();
                let mut idx = 0;
                self.0.retain(|(k, _)| {
                    let keep = idx <= first || k != key;
                    idx += 1;
                    keep
                });
            }
            None => self.0.push((key.to_string(), value.to_string())),
        }
    }

    fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish()
    }
}
