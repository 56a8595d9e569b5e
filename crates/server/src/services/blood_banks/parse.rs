//! Parsing generated blood bank listings.
//!
//! Generated text is untrusted. These functions are pure so every quirk seen
//! in model output can be pinned down in a unit test.

use serde_json::{Map, Value};

use crate::models::ProviderEntry;

/// Result of reading a generated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// A JSON array; items that aren't usable entries have been dropped.
    Parsed(Vec<ProviderEntry>),
    /// Anything else, with the raw text for logging.
    Unparseable(String),
}

/// Remove a surrounding markdown code fence (optionally tagged `json`) and
/// whitespace.
#[must_use]
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        text = match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => rest.get(4..).unwrap_or_default(),
            _ => rest,
        };
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

/// Parse generated text into provider entries.
#[must_use]
pub fn parse_provider_entries(raw: &str) -> GenerationOutcome {
    let text = strip_code_fences(raw);
    if text.is_empty() {
        return GenerationOutcome::Unparseable(raw.to_string());
    }

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => GenerationOutcome::Parsed(entries_from_values(&items)),
        _ => GenerationOutcome::Unparseable(raw.to_string()),
    }
}

/// Convert JSON items into provider entries, dropping items without a name.
#[must_use]
pub fn entries_from_values(items: &[Value]) -> Vec<ProviderEntry> {
    items.iter().filter_map(entry_from_value).collect()
}

fn entry_from_value(value: &Value) -> Option<ProviderEntry> {
    let obj = value.as_object()?;

    Some(ProviderEntry {
        name: text_field(obj, "name")?,
        address: text_field(obj, "address"),
        contact: text_field(obj, "contact"),
        hours: text_field(obj, "hours").or_else(|| text_field(obj, "timings")),
        campaign: text_field(obj, "campaign"),
    })
}

/// Strings (non-blank, trimmed) and numbers are accepted; anything else is
/// treated as missing.
fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
