//! Capability-based routing of queries to registered clients.

use std::sync::Arc;

use crate::attrs::QueryAttribute;
use crate::client::ArchiveClient;
use crate::clients;
use crate::error::{NetError, NetResult};

/// Read-only registry of archive clients.
///
/// Built once during initialization and never mutated afterwards;
/// routing is a pure function of the registry and the query, so a
/// shared `Router` may be used from any number of threads.
#[derive(Default)]
pub struct Router {
    clients: Vec<Arc<dyn ArchiveClient>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, client: Arc<dyn ArchiveClient>) {
        tracing::info!(client = client.descriptor().name, "registered archive client");
        self.clients.push(client);
    }

    pub fn clients(&self) -> impl Iterator<Item = &Arc<dyn ArchiveClient>> {
        self.clients.iter()
    }

    /// Select the client that owns a query.
    ///
    /// When several descriptors accept, the one matching the most
    /// optional attributes wins as the most specific. A tie at the top
    /// is a configuration ambiguity and is surfaced to the caller
    /// rather than resolved silently.
    pub fn route(&self, query: &[QueryAttribute]) -> NetResult<Arc<dyn ArchiveClient>> {
        let eligible: Vec<&Arc<dyn ArchiveClient>> = self
            .clients
            .iter()
            .filter(|c| c.descriptor().can_handle(query))
            .collect();

        if eligible.is_empty() {
            return Err(NetError::NoClient {
                kinds: query.iter().map(|a| a.kind()).collect(),
            });
        }

        let best = eligible
            .iter()
            .map(|c| c.descriptor().optional_matches(query))
            .max()
            .unwrap_or(0);
        let top: Vec<&Arc<dyn ArchiveClient>> = eligible
            .into_iter()
            .filter(|c| c.descriptor().optional_matches(query) == best)
            .collect();

        if top.len() > 1 {
            return Err(NetError::AmbiguousRoute {
                candidates: top
                    .iter()
                    .map(|c| c.descriptor().name.to_string())
                    .collect(),
            });
        }
        let chosen = top[0];
        tracing::debug!(
            client = chosen.descriptor().name,
            specificity = best,
            "routed query"
        );
        Ok(Arc::clone(chosen))
    }
}

/// Build a router with every built-in archive client registered.
///
/// Construction is explicit: descriptors are compiled here, once, and
/// the returned router is immutable. Fails only on a malformed built-in
/// template, which is a configuration bug caught at startup.
pub fn default_router() -> NetResult<Router> {
    let mut router = Router::new();
    router.register(Arc::new(clients::eve::client()?));
    router.register(Arc::new(clients::lyra::client()?));
    router.register(Arc::new(clients::fermi_gbm::client()?));
    router.register(Arc::new(clients::norh::NorhClient::new()?));
    router.register(Arc::new(clients::goes::xrs_client()?));
    router.register(Arc::new(clients::goes::SuviClient::new()?));
    router.register(Arc::new(clients::ace::swepam_client()?));
    router.register(Arc::new(clients::ace::epam_client()?));
    router.register(Arc::new(clients::ace::mag_client()?));
    router.register(Arc::new(clients::ace::sis_client()?));
    router.register(Arc::new(clients::bbso::BbsoClient::new()?));
    router.register(Arc::new(clients::kanzelhohe::KanzelhoheClient::new()?));
    Ok(router)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use heliodata::{Record, StaticMeta, TimeRange};

    use super::*;
    use crate::attrs::AttrKind;
    use crate::client::DirectoryLister;
    use crate::descriptor::{AttrPredicate, ClientDescriptor};
    use crate::registry::AttrRegistry;

    const META: StaticMeta = StaticMeta {
        source: "TEST",
        provider: "TEST",
        instrument: "test",
        physobs: "flux",
    };

    /// Descriptor-only client for routing tests.
    struct StubClient(ClientDescriptor);

    impl ArchiveClient for StubClient {
        fn descriptor(&self) -> &ClientDescriptor {
            &self.0
        }

        fn list_and_extract(
            &self,
            _lister: &dyn DirectoryLister,
            _range: &TimeRange,
            _filters: &[QueryAttribute],
        ) -> NetResult<Vec<Record>> {
            Ok(vec![])
        }
    }

    fn time() -> QueryAttribute {
        let day = NaiveDate::from_ymd_opt(2016, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        QueryAttribute::Time(TimeRange::new(day, day).unwrap())
    }

    fn level_pair_router() -> Router {
        // Two clients sharing an instrument, split on level 0 vs non-0.
        let base = ClientDescriptor {
            name: "",
            required: &[AttrKind::Time, AttrKind::Instrument, AttrKind::Level],
            optional: &[],
            predicates: &[],
            level_aliases: &[("0cs", 0)],
            meta: META,
            registry: AttrRegistry::EMPTY,
        };
        let mut router = Router::new();
        router.register(Arc::new(StubClient(ClientDescriptor {
            name: "quicklook",
            predicates: &[
                (AttrKind::Instrument, AttrPredicate::NameIn(&["shared"])),
                (AttrKind::Level, AttrPredicate::LevelIs(0)),
            ],
            ..base
        })));
        router.register(Arc::new(StubClient(ClientDescriptor {
            name: "science",
            predicates: &[
                (AttrKind::Instrument, AttrPredicate::NameIn(&["shared"])),
                (AttrKind::Level, AttrPredicate::LevelIsNot(0)),
            ],
            ..base
        })));
        router
    }

    #[test]
    fn test_level_split_never_ambiguous() {
        let router = level_pair_router();
        let query = |level: QueryAttribute| {
            vec![time(), QueryAttribute::instrument("shared"), level]
        };

        let zero = router.route(&query(QueryAttribute::level_num(0.0))).unwrap();
        assert_eq!(zero.descriptor().name, "quicklook");
        let alias = router
            .route(&query(QueryAttribute::level_text("0cs")))
            .unwrap();
        assert_eq!(alias.descriptor().name, "quicklook");

        for other in [
            QueryAttribute::level_num(1.0),
            QueryAttribute::level_num(3.0),
            QueryAttribute::level_text("2"),
        ] {
            let chosen = router.route(&query(other)).unwrap();
            assert_eq!(chosen.descriptor().name, "science");
        }

        // A level neither side can coerce matches no one.
        let err = router
            .route(&query(QueryAttribute::level_text("wibble")))
            .unwrap_err();
        assert!(matches!(err, NetError::NoClient { .. }));
    }

    #[test]
    fn test_no_client_reports_query_kinds() {
        let router = level_pair_router();
        let err = router
            .route(&[time(), QueryAttribute::detector("n5")])
            .unwrap_err();
        match err {
            NetError::NoClient { kinds } => {
                assert_eq!(kinds, vec![AttrKind::Time, AttrKind::Detector]);
            }
            other => panic!("expected NoClient, got {other:?}"),
        }
    }

    #[test]
    fn test_specificity_prefers_more_optional_matches() {
        // Both accept {Time, Instrument, SatelliteNumber}; only one
        // counts the satellite number as an optional match.
        let broad = ClientDescriptor {
            name: "broad",
            required: &[AttrKind::Time, AttrKind::Instrument, AttrKind::SatelliteNumber],
            optional: &[],
            predicates: &[(AttrKind::Instrument, AttrPredicate::NameIn(&["xrs"]))],
            level_aliases: &[],
            meta: META,
            registry: AttrRegistry::EMPTY,
        };
        let specific = ClientDescriptor {
            name: "specific",
            required: &[AttrKind::Time, AttrKind::Instrument],
            optional: &[AttrKind::SatelliteNumber],
            ..broad
        };
        let mut router = Router::new();
        router.register(Arc::new(StubClient(broad)));
        router.register(Arc::new(StubClient(specific)));

        let query = vec![
            time(),
            QueryAttribute::instrument("xrs"),
            QueryAttribute::SatelliteNumber(15),
        ];
        let chosen = router.route(&query).unwrap();
        assert_eq!(chosen.descriptor().name, "specific");
    }

    #[test]
    fn test_equally_specific_clients_are_ambiguous() {
        let descriptor = ClientDescriptor {
            name: "first",
            required: &[AttrKind::Time, AttrKind::Instrument],
            optional: &[],
            predicates: &[(AttrKind::Instrument, AttrPredicate::NameIn(&["xrs"]))],
            level_aliases: &[],
            meta: META,
            registry: AttrRegistry::EMPTY,
        };
        let mut router = Router::new();
        router.register(Arc::new(StubClient(descriptor)));
        router.register(Arc::new(StubClient(ClientDescriptor {
            name: "second",
            ..descriptor
        })));

        let err = router
            .route(&[time(), QueryAttribute::instrument("xrs")])
            .unwrap_err();
        match err {
            NetError::AmbiguousRoute { candidates } => {
                assert_eq!(candidates, vec!["first", "second"]);
            }
            other => panic!("expected AmbiguousRoute, got {other:?}"),
        }
    }

    #[test]
    fn test_default_router_registers_builtin_clients() {
        let router = default_router().unwrap();
        let names: Vec<_> = router
            .clients()
            .map(|c| c.descriptor().name)
            .collect();
        assert!(names.contains(&"EVEClient"));
        assert!(names.contains(&"GBMClient"));
        assert!(names.contains(&"SUVIClient"));
        assert!(names.contains(&"SWEPAMClient"));
        assert!(names.contains(&"BBSOClient"));
        assert!(names.contains(&"KanzelhoheClient"));
        assert_eq!(names.len(), 12);
    }
}
