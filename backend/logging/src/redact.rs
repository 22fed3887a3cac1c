//! Log redaction.
//!
//! Scrubs API keys and bearer tokens from strings prior to logging.

use once_cell::sync::Lazy;
use regex::Regex;

static API_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(sk-[a-zA-Z0-9\-_]{20,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap()
});

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    API_KEY_RE.replace_all(input, "[REDACTED_TOKEN]").to_string()
}

/// Short preview of a secret suitable for logging ("sk-proj-ab...wxyz").
pub fn key_preview(key: &str) -> String {
    if key.len() <= 14 {
        return "***".to_string();
    }
    format!("{}...{}", &key[..10], &key[key.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_api_keys_and_bearer_tokens() {
        let raw = "auth sk-abcdefghijklmnopqrstuvwxyz123456 via Bearer eyJhbGciOiJIUzI1NiJ9";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("sk-abcdefghijklmnop"));
        assert!(!clean.contains("eyJhbGciOiJIUzI1NiJ9"));
        assert!(clean.contains("[REDACTED_TOKEN]"));
    }

    #[test]
    fn preview_keeps_ends_only() {
        let preview = key_preview("sk-abcdefghijklmnopqrstuvwxyz");
        assert_eq!(preview, "sk-abcdefg...wxyz");
        assert_eq!(key_preview("short"), "***");
    }
}
