//! Injected-widget mutation helpers
//!
//! Small, idempotent edits the extension applies repeatedly to keep its
//! widgets in sync with filter state. Both helpers treat the element as
//! borrowed: they reshape children, never the element itself.

use dom::ElementRef;

/// Set `element`'s text without disturbing its other children.
///
/// With no children, appends a fresh text node. Otherwise the first
/// child's node value is overwritten in place, so decorative siblings (an
/// icon next to a label, say) survive repeated calls and at most one
/// child ever carries the text.
pub fn replace_text(element: &ElementRef, text: &str) {
    match element.first_child() {
        Some(first) => first.set_value(text),
        None => {
            let node = element.document().create_text_node(text);
            element.append_child(&node);
        }
    }
}

/// Detach every child, last first, leaving the element present but empty.
/// Calling on an already empty element is a no-op.
pub fn clear_children(element: &ElementRef) {
    while element.remove_last_child().is_some() {}
}
