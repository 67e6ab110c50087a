//! Facade configuration
//!
//! Every selector, element id and markup snippet the facade touches comes
//! from here. Loaded once at extension start, immutable afterwards; the
//! rest of the crate reads it through `CommentPage`.

use crate::error::Result;
use dom::Selector;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageConfig {
    /// Host container the comment section streams into.
    pub comment_section_selector: String,
    /// One rendered comment thread (top-level comment plus its replies).
    pub comment_thread_selector: String,
    /// Comment body inside a thread.
    pub comment_body_selector: String,
    /// Author display name inside a thread.
    pub author_selector: String,
    /// Id of the injected toggle container.
    pub filter_toggle_id: String,
    /// Id of the injected status label. Fragment builders create it and
    /// lookups address it, so both sides read the same constant.
    pub filter_status_id: String,
    /// Inline SVG for the toggle icon, inserted verbatim.
    pub filter_icon_svg: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            comment_section_selector: "ytd-comments #contents".to_string(),
            comment_thread_selector: "ytd-comment-thread-renderer".to_string(),
            comment_body_selector: "#content-text".to_string(),
            author_selector: "#author-text span".to_string(),
            filter_toggle_id: "cf-filter-toggle".to_string(),
            filter_status_id: "cf-filter-status".to_string(),
            filter_icon_svg: concat!(
                "<svg viewBox=\"0 0 24 24\" width=\"16\" height=\"16\">",
                "<path d=\"M3 5h18l-7 8v5l-4 2v-7L3 5z\"/>",
                "</svg>"
            )
            .to_string(),
        }
    }
}

impl PageConfig {
    /// Deserialize and validate a JSON config, e.g. the extension's
    /// bundled defaults or a synced user override.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.compile()?;
        Ok(config)
    }

    /// Parse every configured selector. A bad selector is a config bug
    /// surfaced at construction, not at first lookup.
    pub(crate) fn compile(&self) -> Result<CompiledSelectors> {
        Ok(CompiledSelectors {
            section: Selector::parse(&self.comment_section_selector)?,
            thread: Selector::parse(&self.comment_thread_selector)?,
            body: Selector::parse(&self.comment_body_selector)?,
            author: Selector::parse(&self.author_selector)?,
        })
    }
}

/// Pre-parsed selectors, compiled once at facade construction.
#[derive(Debug, Clone)]
pub(crate) struct CompiledSelectors {
    pub section: Selector,
    pub thread: Selector,
    pub body: Selector,
    pub author: Selector,
}
