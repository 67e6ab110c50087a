//! Comment-section page facade
//!
//! Insulates the rest of the extension from the volatile, externally
//! owned DOM of the host video site's comment section. Four
//! responsibilities on one shared primitive:
//!
//! | Component | Responsibility |
//! |---|---|
//! | lookup | query by selector or id, nullable or fail-fast |
//! | discover | poll for a subtree that has not rendered yet |
//! | fragments | build the extension's own injected widgets |
//! | mutate | keep injected widgets in sync with filter state |
//!
//! Callers discover the comment container first; after that succeeds the
//! host content is assumed present and plain lookups suffice. Fragment
//! builders run once at injection, mutation helpers run on every state
//! change afterwards.

pub mod config;
pub mod discover;
pub mod error;
pub mod fragments;
pub mod lookup;
pub mod messages;
pub mod mutate;

pub use config::PageConfig;
pub use discover::PollPolicy;
pub use error::{PageError, Result};
pub use fragments::FilterToggle;
pub use messages::{MessageSource, StaticMessages};
pub use mutate::{clear_children, replace_text};

pub use dom::{Document, ElementRef, Selector};

use config::CompiledSelectors;
use std::sync::Arc;

/// Facade over the host page. Holds a document handle, the immutable
/// config and the message catalog; no other state, so clones are cheap
/// and every call is independent.
#[derive(Clone)]
pub struct CommentPage {
    document: Document,
    config: Arc<PageConfig>,
    messages: Arc<dyn MessageSource>,
    selectors: CompiledSelectors,
}

impl CommentPage {
    /// Build the facade. Fails if any configured selector does not parse.
    pub fn new(
        document: Document,
        config: PageConfig,
        messages: Arc<dyn MessageSource>,
    ) -> Result<Self> {
        let selectors = config.compile()?;
        Ok(Self {
            document,
            config: Arc::new(config),
            messages,
            selectors,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub(crate) fn selectors(&self) -> &CompiledSelectors {
        &self.selectors
    }

    pub(crate) fn messages(&self) -> &dyn MessageSource {
        self.messages.as_ref()
    }
}
