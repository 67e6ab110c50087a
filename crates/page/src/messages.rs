//! Localized message lookup
//!
//! The facade never hardcodes user-visible text. Fragment builders
//! resolve message keys through this boundary; everything else ignores it.

use std::collections::HashMap;

pub trait MessageSource: Send + Sync {
    fn message(&self, key: &str) -> Option<String>;

    /// Resolve a key, falling back to the key itself so a missing catalog
    /// entry stays visible instead of rendering an empty label.
    fn message_or_key(&self, key: &str) -> String {
        self.message(key).unwrap_or_else(|| key.to_string())
    }
}

/// In-memory catalog. Production code wraps the extension platform's
/// message API instead; tests and demos use this.
#[derive(Debug, Clone, Default)]
pub struct StaticMessages {
    messages: HashMap<String, String>,
}

impl StaticMessages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, text: &str) -> Self {
        self.messages.insert(key.to_string(), text.to_string());
        self
    }
}

impl MessageSource for StaticMessages {
    fn message(&self, key: &str) -> Option<String> {
        self.messages.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_and_fallback() {
        let messages = StaticMessages::new().with("filterToggleLabel", "Filter comments");

        assert_eq!(
            messages.message("filterToggleLabel").as_deref(),
            Some("Filter comments")
        );
        assert_eq!(messages.message("missing"), None);
        assert_eq!(messages.message_or_key("missing"), "missing");
    }
}
