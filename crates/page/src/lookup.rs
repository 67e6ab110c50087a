//! Element lookup
//!
//! Two families, split by failure policy. The `find_*` family treats
//! absence as a normal result: the host page renders asynchronously and
//! incrementally, so most queries against it are legitimately racy. The
//! `get_*` family is for elements the extension itself created or already
//! discovered; absence there is a bug, and it fails loudly with the
//! offending query instead of letting a silent None propagate.

use crate::error::{PageError, Result};
use crate::CommentPage;
use dom::{ElementRef, Selector};

impl CommentPage {
    /// First match in document order, or None while the target has not
    /// rendered yet. Pass a scope to search one subtree only.
    pub fn find_element(
        &self,
        selector: &Selector,
        scope: Option<&ElementRef>,
    ) -> Option<ElementRef> {
        self.document().query_selector(selector, scope)
    }

    /// All matches in document order. Empty is a normal result.
    pub fn find_elements(
        &self,
        selector: &Selector,
        scope: Option<&ElementRef>,
    ) -> Vec<ElementRef> {
        self.document().query_selector_all(selector, scope)
    }

    /// Connected element with the given id attribute, or None.
    pub fn find_by_id(&self, id: &str) -> Option<ElementRef> {
        self.document().element_by_id(id)
    }

    /// First match of a query that must succeed.
    pub fn get_element(
        &self,
        selector: &Selector,
        scope: Option<&ElementRef>,
    ) -> Result<ElementRef> {
        self.find_element(selector, scope)
            .ok_or_else(|| PageError::NotFound {
                query: selector.source().to_string(),
            })
    }

    /// Like [`Self::find_by_id`], for ids the extension itself injected.
    pub fn get_by_id(&self, id: &str) -> Result<ElementRef> {
        self.find_by_id(id).ok_or_else(|| PageError::NotFound {
            query: format!("#{id}"),
        })
    }

    /// The comment container, once the host page has rendered it.
    pub fn comment_section(&self) -> Option<ElementRef> {
        self.find_element(&self.selectors().section, None)
    }

    /// All rendered comment threads, scoped to the comment container.
    /// Empty until discovery has succeeded.
    pub fn comment_threads(&self) -> Vec<ElementRef> {
        match self.comment_section() {
            Some(section) => self.find_elements(&self.selectors().thread, Some(&section)),
            None => Vec::new(),
        }
    }

    /// Text of one thread's comment bodies, newline-joined.
    ///
    /// Known limitation: replies render their own body under the same
    /// thread element, so their text is included as well.
    pub fn comment_text(&self, thread: &ElementRef) -> Option<String> {
        let bodies = self.find_elements(&self.selectors().body, Some(thread));
        if bodies.is_empty() {
            return None;
        }
        Some(
            bodies
                .iter()
                .map(|body| body.text_content())
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }

    /// Author display name of one thread.
    pub fn author_name(&self, thread: &ElementRef) -> Option<String> {
        self.find_element(&self.selectors().author, Some(thread))
            .map(|el| el.text_content())
    }

    /// The injected status label. It must exist once the toggle fragment
    /// is attached; failing here means injection broke.
    pub fn filter_status(&self) -> Result<ElementRef> {
        self.get_by_id(&self.config().filter_status_id)
    }
}
