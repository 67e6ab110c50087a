//! Error types for the facade
//!
//! Absence is not an error here. The nullable lookup family and the
//! discovery timeout path return `None`/empty instead; `NotFound` is
//! reserved for queries the caller asserted must succeed.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PageError>;

#[derive(Debug, Error)]
pub enum PageError {
    /// A must-exist query matched nothing. Carries the query text so the
    /// failure names the selector or id that broke.
    #[error("No element matched required query: {query}")]
    NotFound { query: String },

    #[error("Page tree error: {0}")]
    Dom(#[from] dom::DomError),

    #[error("Invalid config: {0}")]
    Config(#[from] serde_json::Error),
}
