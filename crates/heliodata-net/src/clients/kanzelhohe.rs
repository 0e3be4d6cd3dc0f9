//! Kanzelhohe Observatory full-disk patrol archive.
//!
//! Three data types keyed on wavelength: H-alpha 2k, Ca-II K, and white
//! light continuum. Each one lives under its own directory tree and
//! filename code, and only H-alpha skips the dated `processed/`
//! subdirectory, so the URL pattern is compiled per requested
//! wavelength from a lookup table.

use chrono::{NaiveDate, NaiveDateTime};
use heliodata::{
    collect_records, ExtractorPattern, FieldValue, Record, RecordField, StaticMeta, TimeRange,
    UrlPattern,
};

use crate::attrs::{query_wavelength, AttrKind, QueryAttribute};
use crate::client::{scrape_archive, ArchiveClient, DirectoryLister};
use crate::descriptor::{AttrPredicate, ClientDescriptor};
use crate::error::{NetError, NetResult};
use crate::registry::{AttrRegistry, RegistryEntry};

const BASEURL: &str =
    "http://cesar.kso.ac.at/{datatype}/%Y/{subdir}kanz_{code}_%Y%m%d_%H%M%S.fts.gz";
const EXTRACTOR: &str = "{}/kanz_{}_{8d}_{6d}.fts.gz";

const DATED_SUBDIR: &str = "%Y%m%d/processed/";

/// Wavelength (angstrom), directory, filename code, and whether files
/// sit under a dated `processed/` subdirectory.
const DATATYPES: &[(f64, &str, &str, bool)] = &[
    (6563.0, "halpha2k/recent", "halph_fr", false),
    (32768.0, "caiia", "caiik_fi", true),
    (5460.0, "phokada", "bband_fi", true),
];

const WAVELENGTHS: &[f64] = &[6563.0, 32768.0, 5460.0];

fn archive_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2000, 7, 20)
        .and_then(|d| d.and_hms_opt(7, 45, 46))
        .unwrap_or_default()
}

pub const DESCRIPTOR: ClientDescriptor = ClientDescriptor {
    name: "KanzelhoheClient",
    required: &[AttrKind::Time, AttrKind::Instrument, AttrKind::Wavelength],
    optional: &[],
    predicates: &[
        (AttrKind::Instrument, AttrPredicate::NameIn(&["kanzelhohe"])),
        (AttrKind::Wavelength, AttrPredicate::WavelengthIn(WAVELENGTHS)),
    ],
    level_aliases: &[],
    meta: StaticMeta {
        source: "Global Halpha Network",
        provider: "Kanzelhohe",
        instrument: "Kanzelhohe HA2",
        physobs: "irradiance",
    },
    registry: AttrRegistry {
        entries: &[
            RegistryEntry {
                kind: AttrKind::Instrument,
                value: "Kanzelhohe HA2",
                description: "Kanzelhohe Observatory full-disk patrol instrument.",
            },
            RegistryEntry {
                kind: AttrKind::Wavelength,
                value: "6563",
                description: "H-alpha 2k images.",
            },
            RegistryEntry {
                kind: AttrKind::Wavelength,
                value: "32768",
                description: "Ca-II K images.",
            },
            RegistryEntry {
                kind: AttrKind::Wavelength,
                value: "5460",
                description: "White light continuum images.",
            },
        ],
    },
};

/// Client for the Kanzelhohe archive.
pub struct KanzelhoheClient {
    descriptor: ClientDescriptor,
    extractor: ExtractorPattern,
}

impl KanzelhoheClient {
    /// Compile-checks the built-in template for every data type so a
    /// malformed one fails here, not on a query.
    pub fn new() -> NetResult<Self> {
        for (_, datatype, code, dated) in DATATYPES {
            pattern_for(datatype, code, *dated)?;
        }
        Ok(Self {
            descriptor: DESCRIPTOR,
            extractor: ExtractorPattern::compile(EXTRACTOR)?,
        })
    }
}

fn pattern_for(datatype: &str, code: &str, dated: bool) -> NetResult<UrlPattern> {
    let subdir = if dated { DATED_SUBDIR } else { "" };
    Ok(UrlPattern::compile_with(
        BASEURL,
        &[("datatype", datatype), ("subdir", subdir), ("code", code)],
    )?)
}

impl ArchiveClient for KanzelhoheClient {
    fn descriptor(&self) -> &ClientDescriptor {
        &self.descriptor
    }

    fn list_and_extract(
        &self,
        lister: &dyn DirectoryLister,
        range: &TimeRange,
        filters: &[QueryAttribute],
    ) -> NetResult<Vec<Record>> {
        let Some(wavelength) = query_wavelength(filters) else {
            return Err(NetError::UnsupportedValue(
                "Kanzelhohe queries must specify a Wavelength".to_string(),
            ));
        };
        if range.start() < archive_start() {
            return Err(NetError::UnsupportedValue(format!(
                "Kanzelhohe archive begins {}; requested range starts {}",
                archive_start().date(),
                range.start().date()
            )));
        }

        let mut records = Vec::new();
        let mut matched = false;
        for (value, datatype, code, dated) in DATATYPES {
            if !wavelength.contains(*value) {
                continue;
            }
            matched = true;
            let pattern = pattern_for(datatype, code, *dated)?;
            let mut found = scrape_archive(
                &self.descriptor,
                &pattern,
                &self.extractor,
                lister,
                range,
                filters,
            )?;
            // The wavelength is not in the URL; attach the registered
            // value for the data type that produced each record.
            for record in &mut found {
                record.fields.push(RecordField {
                    name: "Wavelength".to_string(),
                    value: FieldValue::Text {
                        value: format!("{}", *value as i64),
                    },
                    validated: true,
                });
            }
            records.extend(found);
        }

        if !matched {
            return Err(NetError::UnsupportedValue(format!(
                "Kanzelhohe data exists at 6563, 32768 or 5460 angstrom, not {:?}",
                wavelength
            )));
        }
        Ok(collect_records(records))
    }
}
