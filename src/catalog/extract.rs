//! JSON recovery from free-form agent output.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::warn;

/// Non-greedy `[...]` or `{...}` fragments, spanning newlines.
static FRAGMENT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)(\[.*?\])|(\{.*?\})").ok());

fn into_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(_) => vec![value],
        _ => Vec::new(),
    }
}

/// Pull a JSON list out of text that should have been only a JSON list.
///
/// Tries, in order: the whole text as an array; the span from the first
/// `[` to the last `]`; the longest non-greedy `[...]` or `{...}` fragment.
/// A lone object is wrapped into a one-element list. Returns an empty list
/// when nothing parses.
pub fn extract_json_array(text: &str) -> Vec<Value> {
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(text) {
        return items;
    }

    if let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) {
        if start < end {
            if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(&text[start..=end]) {
                return items;
            }
        }
    }

    warn!("agent returned non-JSON text, attempting extraction");
    let Some(pattern) = FRAGMENT.as_ref() else {
        return Vec::new();
    };
    let best = pattern
        .find_iter(text)
        .map(|m| m.as_str())
        .fold(None::<&str>, |best, candidate| match best {
            Some(current) if current.len() >= candidate.len() => Some(current),
            _ => Some(candidate),
        });

    let Some(fragment) = best else {
        warn!("no JSON found in agent response");
        return Vec::new();
    };

    match serde_json::from_str::<Value>(fragment) {
        Ok(value) => into_list(value),
        Err(e) => {
            let preview: String = fragment.chars().take(100).collect();
            warn!(error = %e, %preview, "failed to parse extracted JSON");
            Vec::new()
        }
    }
}
