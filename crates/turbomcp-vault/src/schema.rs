//! Minimal schema checks for structured provider entries.

use serde_json::Value;

use turbomcp_core::{Error, Result};

/// Providers whose structured config must carry a string `url` field.
const URL_BEARING_PROVIDERS: &[&str] = &["ollama", "openai-compatible", "custom"];

/// Validate a structured entry for `provider_name` before it is stored.
///
/// # Errors
///
/// Returns [`Error::validation`] if `provider_name` is URL-bearing and
/// `value` is not an object with a string `url` field.
pub fn validate_structured_entry(provider_name: &str, value: &Value) -> Result<()> {
    if !URL_BEARING_PROVIDERS.contains(&provider_name) {
        return Ok(());
    }

    let url = value.get("url");
    match url {
        Some(Value::String(s)) if !s.is_empty() => Ok(()),
        _ => Err(Error::validation(format!(
            "provider '{provider_name}' requires a non-empty string 'url' field"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn url_bearing_provider_requires_url_field() {
        let err = validate_structured_entry("ollama", &json!({"model": "llama3"})).unwrap_err();
        assert!(err.to_string().contains("requires a non-empty string 'url'"));
    }

    #[test]
    fn url_bearing_provider_with_url_passes() {
        validate_structured_entry("ollama", &json!({"url": "http://localhost:11434"})).unwrap();
    }

    #[test]
    fn non_url_bearing_provider_is_unconstrained() {
        validate_structured_entry("anthropic", &json!({"apiKey": "sk-..."})).unwrap();
    }
}
