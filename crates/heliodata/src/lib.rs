//! Heliodata — core scraper library for time-indexed web archives.
//!
//! Compiles declarative URL templates into time-bucket enumerators,
//! validating matchers, and metadata extractors. Everything here is
//! pure and synchronous; directory listing and download are external
//! collaborators.

pub mod error;
pub mod extract;
pub mod pattern;
pub mod timerange;

pub use error::{ScrapeError, ScrapeResult};
pub use extract::{
    collect_records, ExtractedField, ExtractorPattern, FieldKind, FieldSpec, FieldValue, Record,
    RecordField, StaticMeta,
};
pub use pattern::{Candidate, UrlPattern};
pub use timerange::{Buckets, Resolution, TimeRange};
