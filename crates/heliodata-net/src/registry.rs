//! Declarative per-client accepted-value tables.
//!
//! These tables are pure data: they advertise what an archive publishes
//! and canonicalize extracted values, but they never reject anything.

use serde::Serialize;

use crate::attrs::AttrKind;

/// One advertised value for an attribute kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegistryEntry {
    pub kind: AttrKind,
    pub value: &'static str,
    pub description: &'static str,
}

/// A client's accepted-value table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttrRegistry {
    pub entries: &'static [RegistryEntry],
}

impl AttrRegistry {
    pub const EMPTY: AttrRegistry = AttrRegistry { entries: &[] };

    /// Case-insensitive canonicalization of a raw extracted value.
    /// `None` means the value is not registered, not that it is invalid.
    pub fn canonical(&self, kind: AttrKind, raw: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|e| e.kind == kind && e.value.eq_ignore_ascii_case(raw))
            .map(|e| e.value)
    }

    /// All registered values for one kind.
    pub fn values(&self, kind: AttrKind) -> impl Iterator<Item = &'static str> + '_ {
        self.entries
            .iter()
            .filter(move |e| e.kind == kind)
            .map(|e| e.value)
    }
}
