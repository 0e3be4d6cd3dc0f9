//! Real-time lists from the Advanced Composition Explorer (ACE) at the
//! NOAA Space Weather Prediction Center.
//!
//! Four instruments publish daily text files into one flat directory,
//! differing only in the instrument token and cadence of the filename.
//! The archive begins on 2015-07-29; earlier ranges are rejected before
//! any listing happens.

use chrono::{NaiveDate, NaiveDateTime};
use heliodata::{Record, StaticMeta, TimeRange};

use crate::attrs::{AttrKind, QueryAttribute};
use crate::client::{ArchiveClient, DirectoryLister, GenericClient};
use crate::descriptor::{AttrPredicate, ClientDescriptor};
use crate::error::{NetError, NetResult};
use crate::registry::{AttrRegistry, RegistryEntry};

const BASEURL: &str = "ftp://ftp.swpc.noaa.gov/pub/lists/ace/%Y%m%d_ace_{instrument}_{cadence}.txt";
const EXTRACTOR: &str = "{}/{4d}{2d}{2d}_ace_{Instrument:w}_{}";

fn archive_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2015, 7, 29)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

pub const SWEPAM_DESCRIPTOR: ClientDescriptor = ClientDescriptor {
    name: "SWEPAMClient",
    required: &[AttrKind::Time, AttrKind::Instrument],
    optional: &[],
    predicates: &[(AttrKind::Instrument, AttrPredicate::NameIn(&["swepam"]))],
    level_aliases: &[],
    meta: StaticMeta {
        source: "ACE",
        provider: "SWPC",
        instrument: "swepam",
        physobs: "particle_flux",
    },
    registry: AttrRegistry {
        entries: &[RegistryEntry {
            kind: AttrKind::Instrument,
            value: "swepam",
            description: "Solar Wind Electron Proton Alpha Monitor, 1 minute averages.",
        }],
    },
};

pub const EPAM_DESCRIPTOR: ClientDescriptor = ClientDescriptor {
    name: "EPAMClient",
    predicates: &[(AttrKind::Instrument, AttrPredicate::NameIn(&["epam"]))],
    meta: StaticMeta {
        source: "ACE",
        provider: "SWPC",
        instrument: "epam",
        physobs: "particle_flux",
    },
    registry: AttrRegistry {
        entries: &[RegistryEntry {
            kind: AttrKind::Instrument,
            value: "epam",
            description: "Electron, Proton and Alpha Monitor, 5 minute averages.",
        }],
    },
    ..SWEPAM_DESCRIPTOR
};

pub const MAG_DESCRIPTOR: ClientDescriptor = ClientDescriptor {
    name: "MAGClient",
    predicates: &[(AttrKind::Instrument, AttrPredicate::NameIn(&["mag"]))],
    meta: StaticMeta {
        source: "ACE",
        provider: "SWPC",
        instrument: "mag",
        physobs: "magnetic_field",
    },
    registry: AttrRegistry {
        entries: &[RegistryEntry {
            kind: AttrKind::Instrument,
            value: "mag",
            description: "Magnetometer interplanetary field, 1 minute averages.",
        }],
    },
    ..SWEPAM_DESCRIPTOR
};

pub const SIS_DESCRIPTOR: ClientDescriptor = ClientDescriptor {
    name: "SISClient",
    predicates: &[(AttrKind::Instrument, AttrPredicate::NameIn(&["sis"]))],
    meta: StaticMeta {
        source: "ACE",
        provider: "SWPC",
        instrument: "sis",
        physobs: "particle_flux",
    },
    registry: AttrRegistry {
        entries: &[RegistryEntry {
            kind: AttrKind::Instrument,
            value: "sis",
            description: "Solar Isotope Spectrometer high energy particle fluxes, 5 minute averages.",
        }],
    },
    ..SWEPAM_DESCRIPTOR
};

/// Client for one ACE instrument's daily files. Wraps the generic flow
/// with the archive's start-date cutoff.
pub struct AceClient {
    inner: GenericClient,
}

impl AceClient {
    fn build(descriptor: ClientDescriptor, instrument: &str, cadence: &str) -> NetResult<Self> {
        Ok(Self {
            inner: GenericClient::with_substitutions(
                descriptor,
                BASEURL,
                EXTRACTOR,
                &[("instrument", instrument), ("cadence", cadence)],
            )?,
        })
    }
}

pub fn swepam_client() -> NetResult<AceClient> {
    AceClient::build(SWEPAM_DESCRIPTOR, "swepam", "1m")
}

pub fn epam_client() -> NetResult<AceClient> {
    AceClient::build(EPAM_DESCRIPTOR, "epam", "5m")
}

pub fn mag_client() -> NetResult<AceClient> {
    AceClient::build(MAG_DESCRIPTOR, "mag", "1m")
}

pub fn sis_client() -> NetResult<AceClient> {
    AceClient::build(SIS_DESCRIPTOR, "sis", "5m")
}

impl ArchiveClient for AceClient {
    fn descriptor(&self) -> &ClientDescriptor {
        self.inner.descriptor()
    }

    fn list_and_extract(
        &self,
        lister: &dyn DirectoryLister,
        range: &TimeRange,
        filters: &[QueryAttribute],
    ) -> NetResult<Vec<Record>> {
        if range.start() < archive_start() {
            return Err(NetError::UnsupportedValue(format!(
                "ACE archive begins {}; requested range starts {}",
                archive_start().date(),
                range.start().date()
            )));
        }
        self.inner.list_and_extract(lister, range, filters)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    struct EmptyLister;

    impl DirectoryLister for EmptyLister {
        fn list(&self, _url: &str) -> NetResult<Vec<String>> {
            Ok(vec![])
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_matcher_and_extractor_agree() {
        let client = swepam_client().unwrap();
        let url = "ftp://ftp.swpc.noaa.gov/pub/lists/ace/20160518_ace_swepam_1m.txt";
        assert!(client.inner.pattern().matches(url));
        let fields = client.inner.extractor().extract(url).unwrap();
        let instrument = fields
            .iter()
            .find(|f| f.name.as_deref() == Some("Instrument"))
            .unwrap();
        assert_eq!(instrument.value.as_text(), "swepam");
    }

    #[test]
    fn test_instrument_token_substituted_per_client() {
        let mag = mag_client().unwrap();
        assert_eq!(
            mag.inner.pattern().render(day(2016, 5, 18)),
            "ftp://ftp.swpc.noaa.gov/pub/lists/ace/20160518_ace_mag_1m.txt"
        );
        let sis = sis_client().unwrap();
        assert_eq!(
            sis.inner.pattern().render(day(2016, 5, 18)),
            "ftp://ftp.swpc.noaa.gov/pub/lists/ace/20160518_ace_sis_5m.txt"
        );
    }

    struct FlatLister;

    impl DirectoryLister for FlatLister {
        fn list(&self, _url: &str) -> NetResult<Vec<String>> {
            Ok(vec![
                "ftp://ftp.swpc.noaa.gov/pub/lists/ace/20160518_ace_swepam_1m.txt".to_string(),
                "ftp://ftp.swpc.noaa.gov/pub/lists/ace/20160519_ace_swepam_1m.txt".to_string(),
            ])
        }
    }

    #[test]
    fn test_flat_directory_yields_each_file_once() {
        // Every daily bucket lists the same flat directory, so a file
        // must only count toward its own day.
        let client = swepam_client().unwrap();
        let range = TimeRange::new(day(2016, 5, 18), day(2016, 5, 20)).unwrap();
        let records = client.list_and_extract(&FlatLister, &range, &[]).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].bucket, day(2016, 5, 18));
        assert_eq!(records[1].bucket, day(2016, 5, 19));
    }

    #[test]
    fn test_range_before_archive_start_rejected() {
        let client = epam_client().unwrap();
        let range = TimeRange::new(day(2015, 1, 1), day(2015, 1, 2)).unwrap();
        let err = client
            .list_and_extract(&EmptyLister, &range, &[])
            .unwrap_err();
        assert!(matches!(err, NetError::UnsupportedValue(_)));

        let supported = TimeRange::new(day(2016, 5, 18), day(2016, 5, 19)).unwrap();
        assert!(client
            .list_and_extract(&EmptyLister, &supported, &[])
            .unwrap()
            .is_empty());
    }
}
