//! Big Bear Solar Observatory full-disk H-alpha archive.
//!
//! Files come in two processing codes, `fl` and `fr`, substituted into
//! the filename per query, and each image may exist both plain and
//! gzip-compressed, so every search scans two templates.

use chrono::{NaiveDate, NaiveDateTime};
use heliodata::{collect_records, ExtractorPattern, Record, StaticMeta, TimeRange, UrlPattern};

use crate::attrs::{AttrKind, LevelValue, QueryAttribute};
use crate::client::{scrape_archive, ArchiveClient, DirectoryLister};
use crate::descriptor::{AttrPredicate, ClientDescriptor};
use crate::error::{NetError, NetResult};
use crate::registry::{AttrRegistry, RegistryEntry};

const BASEURL: &str = "http://www.bbso.njit.edu/pub/archive/%Y/%m/%d/bbso_halph_{level}_%Y%m%d_%H%M%S.fts";
const BASEURL_GZ: &str = "http://www.bbso.njit.edu/pub/archive/%Y/%m/%d/bbso_halph_{level}_%Y%m%d_%H%M%S.fts.gz";
const EXTRACTOR: &str = "{}/bbso_halph_{Level:2w}_{8d}_{6d}.fts{}";

const LEVELS: &[&str] = &["fl", "fr"];

fn archive_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2000, 11, 6)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

pub const DESCRIPTOR: ClientDescriptor = ClientDescriptor {
    name: "BBSOClient",
    required: &[AttrKind::Time, AttrKind::Instrument, AttrKind::Level],
    optional: &[],
    predicates: &[
        (AttrKind::Instrument, AttrPredicate::NameIn(&["bbso"])),
        (AttrKind::Level, AttrPredicate::LevelTextIn(LEVELS)),
    ],
    level_aliases: &[],
    meta: StaticMeta {
        source: "Global Halpha Network",
        provider: "NJIT",
        instrument: "BBSO",
        physobs: "irradiance",
    },
    registry: AttrRegistry {
        entries: &[
            RegistryEntry {
                kind: AttrKind::Instrument,
                value: "BBSO",
                description: "Big Bear Solar Observatory full-disk H-alpha imager.",
            },
            RegistryEntry {
                kind: AttrKind::Level,
                value: "fl",
                description: "H-alpha image, fl processing.",
            },
            RegistryEntry {
                kind: AttrKind::Level,
                value: "fr",
                description: "H-alpha image, fr processing.",
            },
        ],
    },
};

/// Client for the BBSO archive.
pub struct BbsoClient {
    descriptor: ClientDescriptor,
    extractor: ExtractorPattern,
}

impl BbsoClient {
    /// Compile-checks the built-in templates so a malformed one fails
    /// here, not on a query.
    pub fn new() -> NetResult<Self> {
        Self::pattern_for(BASEURL, "fr")?;
        Self::pattern_for(BASEURL_GZ, "fr")?;
        Ok(Self {
            descriptor: DESCRIPTOR,
            extractor: ExtractorPattern::compile(EXTRACTOR)?,
        })
    }

    fn pattern_for(template: &str, level: &str) -> NetResult<UrlPattern> {
        Ok(UrlPattern::compile_with(template, &[("level", level)])?)
    }
}

impl ArchiveClient for BbsoClient {
    fn descriptor(&self) -> &ClientDescriptor {
        &self.descriptor
    }

    fn list_and_extract(
        &self,
        lister: &dyn DirectoryLister,
        range: &TimeRange,
        filters: &[QueryAttribute],
    ) -> NetResult<Vec<Record>> {
        if range.start() < archive_start() {
            return Err(NetError::UnsupportedValue(format!(
                "BBSO archive begins {}; requested range starts {}",
                archive_start().date(),
                range.start().date()
            )));
        }
        let level = filters
            .iter()
            .find_map(|a| match a {
                QueryAttribute::Level(LevelValue::Text(s)) => Some(s.to_ascii_lowercase()),
                _ => None,
            })
            .unwrap_or_else(|| "fr".to_string());

        let mut records = Vec::new();
        for template in [BASEURL, BASEURL_GZ] {
            let pattern = Self::pattern_for(template, &level)?;
            records.extend(scrape_archive(
                &self.descriptor,
                &pattern,
                &self.extractor,
                lister,
                range,
                filters,
            )?);
        }
        Ok(collect_records(records))
    }
}
