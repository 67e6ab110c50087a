//! Live page-tree model
//!
//! Stand-in for the browser DOM as seen by an injected extension script:
//! a shared mutable tree the host page grows on its own schedule, queried
//! and patched by extension code.
//!
//! ## Core Design
//!
//! ```text
//! host page → mutates → Document (arena + RwLock) ← queries ← facade
//!                              ↑
//!                        ElementRef (NodeId)
//! ```
//!
//! - Arena storage, `u32` indices instead of pointers
//! - Handles borrow, the document owns; nothing is ever deallocated
//! - A selector subset compiled once, matched without allocation

pub mod document;
pub mod error;
pub mod node;
pub mod selector;

pub use document::{Document, ElementRef, Listener};
pub use error::{DomError, Result};
pub use node::{NodeId, NodeKind};
pub use selector::Selector;
