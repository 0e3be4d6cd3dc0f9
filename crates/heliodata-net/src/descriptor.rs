//! Client descriptors and capability predicates.
//!
//! A descriptor is everything the router needs to decide whether a
//! client can answer a query: required and optional attribute kinds,
//! per-kind value predicates, and static metadata. Predicates are a
//! closed data enum so the router stays generic, with no per-client
//! code anywhere in the routing path.

use heliodata::StaticMeta;

use crate::attrs::{AttrKind, LevelValue, QueryAttribute};
use crate::registry::AttrRegistry;

/// Per-kind acceptance predicate.
///
/// A value that fails coercion (for example a non-numeric level) fails
/// the predicate; coercion problems are capability rejections, never
/// errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttrPredicate {
    /// Always passes.
    Any,
    /// Case-insensitive name membership (Instrument, Detector, Resolution).
    NameIn(&'static [&'static str]),
    /// Alias-normalized numeric level equality.
    LevelIs(i64),
    /// Alias-normalized numeric level inequality.
    LevelIsNot(i64),
    /// Alias-normalized level membership.
    LevelIn(&'static [i64]),
    /// Case-insensitive membership of a coded, non-numeric level.
    LevelTextIn(&'static [&'static str]),
    /// At least one supported value inside the query's point or band.
    WavelengthIn(&'static [f64]),
    /// Satellite number membership.
    SatelliteIn(&'static [i64]),
    /// Satellite number lower bound.
    SatelliteAtLeast(i64),
}

/// Immutable description of what one client can answer.
#[derive(Debug, Clone, Copy)]
pub struct ClientDescriptor {
    pub name: &'static str,
    pub required: &'static [AttrKind],
    pub optional: &'static [AttrKind],
    pub predicates: &'static [(AttrKind, AttrPredicate)],
    /// Coded level names and the integer they stand for, per archive.
    pub level_aliases: &'static [(&'static str, i64)],
    pub meta: StaticMeta,
    pub registry: AttrRegistry,
}

impl ClientDescriptor {
    /// Whether this client can service the query.
    ///
    /// Rejects when a query kind is neither required nor optional, when
    /// a required kind is absent, or when any present attribute fails
    /// its predicate. Monotone in the query: adding an attribute can
    /// only flip acceptance to rejection, never the reverse.
    pub fn can_handle(&self, query: &[QueryAttribute]) -> bool {
        for attr in query {
            let kind = attr.kind();
            if !self.required.contains(&kind) && !self.optional.contains(&kind) {
                tracing::debug!(client = self.name, ?kind, "query kind not supported");
                return false;
            }
        }
        for kind in self.required {
            if !query.iter().any(|a| a.kind() == *kind) {
                tracing::debug!(client = self.name, ?kind, "required kind missing");
                return false;
            }
        }
        for attr in query {
            if !self.predicate_for(attr.kind()).accepts(attr, self) {
                tracing::debug!(client = self.name, kind = ?attr.kind(), "predicate rejected value");
                return false;
            }
        }
        true
    }

    /// How many query attributes match this client's optional kinds;
    /// the router's specificity measure.
    pub fn optional_matches(&self, query: &[QueryAttribute]) -> usize {
        query
            .iter()
            .filter(|a| self.optional.contains(&a.kind()))
            .count()
    }

    /// Alias-normalize a level payload to an integer.
    ///
    /// Text goes through the alias table case-insensitively, then plain
    /// integer parsing. `None` when coercion fails: a non-integer number
    /// or an unknown non-numeric string matches no numeric predicate.
    pub fn normalize_level(&self, level: &LevelValue) -> Option<i64> {
        match level {
            LevelValue::Num(v) => (v.fract() == 0.0).then_some(*v as i64),
            LevelValue::Text(s) => self
                .level_aliases
                .iter()
                .find(|(alias, _)| alias.eq_ignore_ascii_case(s))
                .map(|(_, n)| *n)
                .or_else(|| s.trim().parse::<i64>().ok()),
        }
    }

    fn predicate_for(&self, kind: AttrKind) -> AttrPredicate {
        self.predicates
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, p)| *p)
            .unwrap_or(AttrPredicate::Any)
    }
}

impl AttrPredicate {
    fn accepts(self, attr: &QueryAttribute, descriptor: &ClientDescriptor) -> bool {
        match (self, attr) {
            (AttrPredicate::Any, _) => true,
            (
                AttrPredicate::NameIn(names),
                QueryAttribute::Instrument(value)
                | QueryAttribute::Detector(value)
                | QueryAttribute::Resolution(value),
            ) => names.iter().any(|n| n.eq_ignore_ascii_case(value)),
            (AttrPredicate::LevelIs(n), QueryAttribute::Level(value)) => {
                descriptor.normalize_level(value) == Some(n)
            }
            (AttrPredicate::LevelIsNot(n), QueryAttribute::Level(value)) => {
                descriptor.normalize_level(value).is_some_and(|v| v != n)
            }
            (AttrPredicate::LevelIn(levels), QueryAttribute::Level(value)) => descriptor
                .normalize_level(value)
                .is_some_and(|v| levels.contains(&v)),
            (
                AttrPredicate::LevelTextIn(codes),
                QueryAttribute::Level(LevelValue::Text(value)),
            ) => codes.iter().any(|c| c.eq_ignore_ascii_case(value)),
            (AttrPredicate::WavelengthIn(values), QueryAttribute::Wavelength(w)) => {
                values.iter().any(|v| w.contains(*v))
            }
            (AttrPredicate::SatelliteIn(values), QueryAttribute::SatelliteNumber(n)) => {
                values.contains(n)
            }
            (AttrPredicate::SatelliteAtLeast(min), QueryAttribute::SatelliteNumber(n)) => *n >= min,
            // A predicate keyed under one kind but handed another
            // attribute is a configuration slip; reject.
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use heliodata::TimeRange;

    use super::*;
    use crate::attrs::Wavelength;

    const META: StaticMeta = StaticMeta {
        source: "TEST",
        provider: "TEST",
        instrument: "test",
        physobs: "flux",
    };

    const SUVI_LIKE: ClientDescriptor = ClientDescriptor {
        name: "suvi-like",
        required: &[AttrKind::Time, AttrKind::Instrument],
        optional: &[AttrKind::Wavelength, AttrKind::Level],
        predicates: &[(AttrKind::Instrument, AttrPredicate::NameIn(&["suvi"]))],
        level_aliases: &[],
        meta: META,
        registry: AttrRegistry::EMPTY,
    };

    const EVE_LIKE: ClientDescriptor = ClientDescriptor {
        name: "eve-like",
        required: &[AttrKind::Time, AttrKind::Instrument, AttrKind::Level],
        optional: &[],
        predicates: &[
            (AttrKind::Instrument, AttrPredicate::NameIn(&["eve"])),
            (AttrKind::Level, AttrPredicate::LevelIs(0)),
        ],
        level_aliases: &[("0cs", 0)],
        meta: META,
        registry: AttrRegistry::EMPTY,
    };

    fn time() -> QueryAttribute {
        let day = NaiveDate::from_ymd_opt(2016, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        QueryAttribute::Time(TimeRange::new(day, day).unwrap())
    }

    #[test]
    fn test_optional_attributes_accepted_unknown_rejected() {
        let query = vec![
            time(),
            QueryAttribute::instrument("suvi"),
            QueryAttribute::Wavelength(Wavelength::point(171.0)),
        ];
        assert!(SUVI_LIKE.can_handle(&query));

        let mut extended = query.clone();
        extended.push(QueryAttribute::detector("n5"));
        assert!(!SUVI_LIKE.can_handle(&extended));
    }

    #[test]
    fn test_missing_required_kind_rejected() {
        assert!(!SUVI_LIKE.can_handle(&[QueryAttribute::instrument("suvi")]));
        assert!(!SUVI_LIKE.can_handle(&[time()]));
    }

    #[test]
    fn test_adding_attributes_never_flips_to_accept() {
        // Rejected queries stay rejected under any extension.
        let rejected = vec![time(), QueryAttribute::instrument("norh")];
        assert!(!SUVI_LIKE.can_handle(&rejected));
        let mut extended = rejected.clone();
        extended.push(QueryAttribute::Wavelength(Wavelength::point(171.0)));
        assert!(!SUVI_LIKE.can_handle(&extended));
    }

    #[test]
    fn test_level_alias_equivalence() {
        let base = vec![time(), QueryAttribute::instrument("eve")];
        for accepted in [
            QueryAttribute::level_text("0cs"),
            QueryAttribute::level_text("0CS"),
            QueryAttribute::level_num(0.0),
            QueryAttribute::level_text("0"),
        ] {
            let mut query = base.clone();
            query.push(accepted.clone());
            assert!(EVE_LIKE.can_handle(&query), "{accepted:?} should be accepted");
        }
        for rejected in [
            QueryAttribute::level_text("wibble"),
            QueryAttribute::level_num(0.5),
            QueryAttribute::level_num(1.0),
        ] {
            let mut query = base.clone();
            query.push(rejected.clone());
            assert!(!EVE_LIKE.can_handle(&query), "{rejected:?} should be rejected");
        }
    }

    #[test]
    fn test_coded_level_membership() {
        let descriptor = ClientDescriptor {
            name: "bbso-like",
            required: &[AttrKind::Level],
            optional: &[],
            predicates: &[(AttrKind::Level, AttrPredicate::LevelTextIn(&["fl", "fr"]))],
            level_aliases: &[],
            meta: META,
            registry: AttrRegistry::EMPTY,
        };
        assert!(descriptor.can_handle(&[QueryAttribute::level_text("fr")]));
        assert!(descriptor.can_handle(&[QueryAttribute::level_text("FL")]));
        assert!(!descriptor.can_handle(&[QueryAttribute::level_text("fx")]));
        // Coded levels are not numbers; a numeric payload fails.
        assert!(!descriptor.can_handle(&[QueryAttribute::level_num(1.0)]));
    }

    #[test]
    fn test_optional_matches_counts_specificity() {
        let query = vec![
            time(),
            QueryAttribute::instrument("suvi"),
            QueryAttribute::Wavelength(Wavelength::point(304.0)),
            QueryAttribute::level_num(2.0),
        ];
        assert_eq!(SUVI_LIKE.optional_matches(&query), 2);
        assert_eq!(EVE_LIKE.optional_matches(&query), 0);
    }

    #[test]
    fn test_wavelength_band_containment() {
        let descriptor = ClientDescriptor {
            predicates: &[(AttrKind::Wavelength, AttrPredicate::WavelengthIn(&[17.0, 34.0]))],
            required: &[AttrKind::Wavelength],
            optional: &[],
            ..SUVI_LIKE
        };
        let accepts = |w: Wavelength| descriptor.can_handle(&[QueryAttribute::Wavelength(w)]);
        assert!(accepts(Wavelength::point(17.0)));
        assert!(accepts(Wavelength::band(10.0, 20.0)));
        assert!(!accepts(Wavelength::point(21.0)));
        assert!(!accepts(Wavelength::band(18.0, 33.0)));
    }
}
