//! Injected UI fragments
//!
//! Pure constructors: each builder returns freshly created, detached
//! elements with listeners already wired, ready for the caller to attach.
//! Builders never query the host page. The only contract shared with the
//! lookup side is the id constants, which both read from the same config.

use crate::CommentPage;
use dom::ElementRef;

/// Message keys resolved through the configured message source.
pub const MSG_TOGGLE_LABEL: &str = "filterToggleLabel";
pub const MSG_STATUS_ENABLED: &str = "filterStatusEnabled";
pub const MSG_STATUS_DISABLED: &str = "filterStatusDisabled";

/// The pieces of a built filter toggle callers keep touching after
/// injection.
#[derive(Debug, Clone)]
pub struct FilterToggle {
    /// Attach this to the page.
    pub container: ElementRef,
    pub checkbox: ElementRef,
    /// Status label, addressable later through the shared status id.
    pub status: ElementRef,
}

impl CommentPage {
    /// The main filter switch: checkbox, icon, label and a status line.
    pub fn build_filter_toggle<F>(&self, enabled: bool, on_change: F) -> FilterToggle
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let document = self.document();
        let config = self.config();

        let container = document.create_element("div");
        container.set_attribute("id", &config.filter_toggle_id);
        container.set_attribute("class", "cf-toggle");

        let label = document.create_element("label");
        label.set_attribute("class", "cf-toggle-label");

        let checkbox = self.build_bare_checkbox(enabled, on_change);

        let icon = document.create_element("span");
        icon.set_attribute("class", "cf-toggle-icon");
        icon.append_child(&document.create_raw(&config.filter_icon_svg));

        let text = document.create_element("span");
        text.set_attribute("class", "cf-toggle-text");
        text.append_child(
            &document.create_text_node(&self.messages().message_or_key(MSG_TOGGLE_LABEL)),
        );

        let status = document.create_element("span");
        status.set_attribute("id", &config.filter_status_id);
        status.set_attribute("class", "cf-toggle-status");
        status.append_child(&document.create_text_node(&self.status_text(enabled)));

        label.append_child(&checkbox);
        label.append_child(&icon);
        label.append_child(&text);
        container.append_child(&label);
        container.append_child(&status);

        FilterToggle {
            container,
            checkbox,
            status,
        }
    }

    /// Localized status line for a filter state.
    pub fn status_text(&self, enabled: bool) -> String {
        let key = if enabled {
            MSG_STATUS_ENABLED
        } else {
            MSG_STATUS_DISABLED
        };
        self.messages().message_or_key(key)
    }

    /// Labelled checkbox for one filter option.
    pub fn build_checkbox<F>(
        &self,
        id: &str,
        label_key: &str,
        checked: bool,
        on_change: F,
    ) -> ElementRef
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let document = self.document();
        let wrapper = document.create_element("label");
        wrapper.set_attribute("class", "cf-option");

        let input = self.build_bare_checkbox(checked, on_change);
        input.set_attribute("id", id);

        let text = document.create_element("span");
        text.append_child(&document.create_text_node(&self.messages().message_or_key(label_key)));

        wrapper.append_child(&input);
        wrapper.append_child(&text);
        wrapper
    }

    /// Push button with a click handler.
    pub fn build_button<F>(&self, label_key: &str, on_click: F) -> ElementRef
    where
        F: Fn() + Send + Sync + 'static,
    {
        let document = self.document();
        let button = document.create_element("button");
        button.set_attribute("type", "button");
        button.set_attribute("class", "cf-button");
        button.append_child(&document.create_text_node(&self.messages().message_or_key(label_key)));
        button.add_listener("click", move |_| on_click());
        button
    }

    /// Empty form container for grouped controls.
    pub fn build_form(&self, id: &str) -> ElementRef {
        let form = self.document().create_element("form");
        form.set_attribute("id", id);
        form.set_attribute("class", "cf-form");
        form
    }

    /// Plain link.
    pub fn build_anchor(&self, href: &str, label_key: &str) -> ElementRef {
        let document = self.document();
        let anchor = document.create_element("a");
        anchor.set_attribute("href", href);
        anchor.set_attribute("class", "cf-link");
        anchor.append_child(&document.create_text_node(&self.messages().message_or_key(label_key)));
        anchor
    }

    fn build_bare_checkbox<F>(&self, checked: bool, on_change: F) -> ElementRef
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let input = self.document().create_element("input");
        input.set_attribute("type", "checkbox");
        if checked {
            input.set_attribute("checked", "checked");
        }
        input.add_listener("change", move |el| on_change(el.is_checked()));
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageConfig;
    use crate::messages::StaticMessages;
    use dom::Document;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    fn page() -> CommentPage {
        let messages = StaticMessages::new()
            .with(MSG_TOGGLE_LABEL, "Filter comments")
            .with(MSG_STATUS_ENABLED, "Filter on")
            .with(MSG_STATUS_DISABLED, "Filter off");
        CommentPage::new(Document::new(), PageConfig::default(), Arc::new(messages)).unwrap()
    }

    #[test]
    fn test_filter_toggle_is_detached_and_carries_shared_ids() {
        let page = page();
        let toggle = page.build_filter_toggle(false, |_| {});

        assert!(toggle.container.parent().is_none());
        assert_eq!(
            toggle.container.attribute("id").as_deref(),
            Some(page.config().filter_toggle_id.as_str())
        );
        assert_eq!(
            toggle.status.attribute("id").as_deref(),
            Some(page.config().filter_status_id.as_str())
        );
        assert_eq!(toggle.status.text_content(), "Filter off");
        assert!(!toggle.checkbox.is_checked());
        assert_eq!(toggle.container.text_content(), "Filter commentsFilter off");
    }

    #[test]
    fn test_toggle_checkbox_reports_new_state() {
        let page = page();
        let states = Arc::new(Mutex::new(Vec::new()));
        let seen = states.clone();
        let toggle = page.build_filter_toggle(false, move |on| {
            seen.lock().unwrap().push(on);
        });

        toggle.checkbox.click();
        toggle.checkbox.click();

        assert_eq!(*states.lock().unwrap(), vec![true, false]);
    }

    #[test]
    fn test_enabled_toggle_starts_checked() {
        let page = page();
        let toggle = page.build_filter_toggle(true, |_| {});
        assert!(toggle.checkbox.is_checked());
        assert_eq!(toggle.status.text_content(), "Filter on");
    }

    #[test]
    fn test_checkbox_resolves_label_and_falls_back_to_key() {
        let page = page();
        let labelled = page.build_checkbox("cf-hide-spam", MSG_TOGGLE_LABEL, true, |_| {});
        assert_eq!(labelled.text_content(), "Filter comments");

        let unlabelled = page.build_checkbox("cf-other", "unknownKey", false, |_| {});
        assert_eq!(unlabelled.text_content(), "unknownKey");
    }

    #[test]
    fn test_button_fires_click_handler() {
        let page = page();
        let clicked = Arc::new(AtomicBool::new(false));
        let seen = clicked.clone();
        let button = page.build_button("unknownKey", move || {
            seen.store(true, Ordering::SeqCst);
        });

        button.click();
        assert!(clicked.load(Ordering::SeqCst));
    }

    #[test]
    fn test_form_and_anchor_shapes() {
        let page = page();

        let form = page.build_form("cf-options");
        assert_eq!(form.name(), "form");
        assert_eq!(form.child_count(), 0);

        let anchor = page.build_anchor("https://example.com/help", "unknownKey");
        assert_eq!(anchor.name(), "a");
        assert_eq!(
            anchor.attribute("href").as_deref(),
            Some("https://example.com/help")
        );
    }
}
