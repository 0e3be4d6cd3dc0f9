//! Error types for the query layer.

use heliodata::ScrapeError;

use crate::attrs::AttrKind;

/// All errors surfaced by routing and listing.
///
/// Routing outcomes are expected run-time results: no client and
/// ambiguous-route are both reported to the caller, never resolved
/// silently. Pattern errors only occur while constructing clients.
#[derive(thiserror::Error, Debug)]
pub enum NetError {
    #[error("No registered client can answer a query with attribute kinds {kinds:?}")]
    NoClient { kinds: Vec<AttrKind> },

    #[error("Ambiguous route: {candidates:?} are equally specific for this query")]
    AmbiguousRoute { candidates: Vec<String> },

    #[error("Directory listing failed: {0}")]
    List(String),

    #[error("Unsupported query value: {0}")]
    UnsupportedValue(String),

    #[error("Pattern error: {0}")]
    Pattern(#[from] ScrapeError),
}

/// Convenience result type.
pub type NetResult<T> = Result<T, NetError>;
