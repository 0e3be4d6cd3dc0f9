//! Typed query attributes.
//!
//! A query is a set of attributes, each one axis of what the caller
//! wants: a time range, an instrument, a processing level, and so on.
//! The set of kinds is closed; clients declare which subset they accept
//! through their descriptors.

use heliodata::TimeRange;
use serde::Serialize;

/// One axis of a structured archive query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "attr", content = "value", rename_all = "snake_case")]
pub enum QueryAttribute {
    Time(TimeRange),
    Instrument(String),
    Level(LevelValue),
    Detector(String),
    Resolution(String),
    Wavelength(Wavelength),
    SatelliteNumber(i64),
}

/// The kind of a query attribute, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrKind {
    Time,
    Instrument,
    Level,
    Detector,
    Resolution,
    Wavelength,
    SatelliteNumber,
}

impl QueryAttribute {
    pub fn kind(&self) -> AttrKind {
        match self {
            QueryAttribute::Time(_) => AttrKind::Time,
            QueryAttribute::Instrument(_) => AttrKind::Instrument,
            QueryAttribute::Level(_) => AttrKind::Level,
            QueryAttribute::Detector(_) => AttrKind::Detector,
            QueryAttribute::Resolution(_) => AttrKind::Resolution,
            QueryAttribute::Wavelength(_) => AttrKind::Wavelength,
            QueryAttribute::SatelliteNumber(_) => AttrKind::SatelliteNumber,
        }
    }

    pub fn instrument(name: &str) -> Self {
        QueryAttribute::Instrument(name.to_string())
    }

    pub fn detector(name: &str) -> Self {
        QueryAttribute::Detector(name.to_string())
    }

    pub fn resolution(name: &str) -> Self {
        QueryAttribute::Resolution(name.to_string())
    }

    pub fn level_num(value: f64) -> Self {
        QueryAttribute::Level(LevelValue::Num(value))
    }

    pub fn level_text(value: &str) -> Self {
        QueryAttribute::Level(LevelValue::Text(value.to_string()))
    }
}

/// Find the time range in a query, if present.
pub fn query_time(query: &[QueryAttribute]) -> Option<&TimeRange> {
    query.iter().find_map(|a| match a {
        QueryAttribute::Time(range) => Some(range),
        _ => None,
    })
}

/// Find the wavelength in a query, if present.
pub fn query_wavelength(query: &[QueryAttribute]) -> Option<Wavelength> {
    query.iter().find_map(|a| match a {
        QueryAttribute::Wavelength(w) => Some(*w),
        _ => None,
    })
}

/// A data processing level. Archives publish both numeric levels and
/// coded ones such as `"0CS"` or `"1b"`, so the payload is either.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LevelValue {
    Num(f64),
    Text(String),
}

/// A point or inclusive range of wavelength values.
///
/// Values are raw numbers in whatever unit the archive documents; unit
/// conversion belongs to the caller's quantity system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Wavelength {
    pub min: f64,
    pub max: f64,
}

impl Wavelength {
    /// A single wavelength.
    pub fn point(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// An inclusive band; endpoints may be given in either order.
    pub fn band(a: f64, b: f64) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}
