//! Nobeyama RadioHeliograph (NoRH) averaged correlation time series.
//!
//! The archive keys its filenames on observing frequency, not date
//! directories alone: 17 GHz data lives under a `tca` prefix and 34 GHz
//! under `tcz`. The URL template is compiled per query with the prefix
//! substituted in, so Wavelength is a required attribute here.

use heliodata::{
    collect_records, ExtractorPattern, FieldValue, Record, StaticMeta, TimeRange, UrlPattern,
};

use crate::attrs::{query_wavelength, AttrKind, QueryAttribute};
use crate::client::{scrape_archive, ArchiveClient, DirectoryLister};
use crate::descriptor::{AttrPredicate, ClientDescriptor};
use crate::error::{NetError, NetResult};
use crate::registry::{AttrRegistry, RegistryEntry};

const BASEURL: &str = "ftp://solar-pub.nao.ac.jp/pub/nsro/norh/data/tcx/%Y/%m/{freq}%y%m%d";
const EXTRACTOR: &str = "ftp://solar-pub.nao.ac.jp/pub/nsro/norh/data/tcx/{4d}/{2d}/{Wavelength}{:6d}";

/// Observing frequencies: raw GHz value, filename prefix, canonical label.
const FREQUENCIES: &[(f64, &str, &str)] = &[(17.0, "tca", "17GHz"), (34.0, "tcz", "34GHz")];

pub const DESCRIPTOR: ClientDescriptor = ClientDescriptor {
    name: "NoRHClient",
    required: &[AttrKind::Time, AttrKind::Instrument, AttrKind::Wavelength],
    optional: &[],
    predicates: &[
        (AttrKind::Instrument, AttrPredicate::NameIn(&["norh"])),
        (AttrKind::Wavelength, AttrPredicate::WavelengthIn(&[17.0, 34.0])),
    ],
    level_aliases: &[],
    meta: StaticMeta {
        source: "NAOJ",
        provider: "NRO",
        instrument: "NORH",
        physobs: "",
    },
    registry: AttrRegistry {
        entries: &[
            RegistryEntry {
                kind: AttrKind::Instrument,
                value: "NORH",
                description: "Nobeyama Radio Heliograph, an imaging radio telescope at 17 or 34 GHz at the Nobeyama Solar Radio Observatory.",
            },
            RegistryEntry {
                kind: AttrKind::Wavelength,
                value: "17GHz",
                description: "Averaged correlation at 17 GHz (tca files).",
            },
            RegistryEntry {
                kind: AttrKind::Wavelength,
                value: "34GHz",
                description: "Averaged correlation at 34 GHz (tcz files).",
            },
            RegistryEntry {
                kind: AttrKind::Wavelength,
                value: "tca",
                description: "Filename prefix for 17 GHz data.",
            },
            RegistryEntry {
                kind: AttrKind::Wavelength,
                value: "tcz",
                description: "Filename prefix for 34 GHz data.",
            },
        ],
    },
};

/// Client for the NoRH tcx archive.
pub struct NorhClient {
    descriptor: ClientDescriptor,
    extractor: ExtractorPattern,
}

impl NorhClient {
    pub fn new() -> NetResult<Self> {
        Ok(Self {
            descriptor: DESCRIPTOR,
            extractor: ExtractorPattern::compile(EXTRACTOR)?,
        })
    }

    /// The URL pattern for one observing frequency prefix.
    pub fn pattern_for(freq: &str) -> NetResult<UrlPattern> {
        Ok(UrlPattern::compile_with(BASEURL, &[("freq", freq)])?)
    }
}

impl ArchiveClient for NorhClient {
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
                "NoRH queries must specify 17 or 34 (GHz) as a Wavelength".to_string(),
            ));
        };

        let mut records = Vec::new();
        let mut matched = false;
        for (value, freq, label) in FREQUENCIES {
            if !wavelength.contains(*value) {
                continue;
            }
            matched = true;
            let pattern = Self::pattern_for(freq)?;
            let mut found =
                scrape_archive(&self.descriptor, &pattern, &self.extractor, lister, range, filters)?;
            // The filename prefix is the frequency; report it as the
            // canonical registered label instead.
            for record in &mut found {
                for field in &mut record.fields {
                    if field.name == "Wavelength" {
                        field.value = FieldValue::Text {
                            value: (*label).to_string(),
                        };
                        field.validated = true;
                    }
                }
            }
            records.extend(found);
        }

        if !matched {
            return Err(NetError::UnsupportedValue(format!(
                "NoRH data exists only at 17 or 34 GHz, not {:?}",
                wavelength
            )));
        }
        Ok(collect_records(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_prefix_substitution() {
        let pattern = NorhClient::pattern_for("tca").unwrap();
        let bucket = chrono::NaiveDate::from_ymd_opt(2016, 5, 4)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            pattern.render(bucket),
            "ftp://solar-pub.nao.ac.jp/pub/nsro/norh/data/tcx/2016/05/tca160504"
        );
        assert_eq!(
            pattern.prefix(bucket),
            "ftp://solar-pub.nao.ac.jp/pub/nsro/norh/data/tcx/2016/05/"
        );
    }

    #[test]
    fn test_matcher_and_extractor_agree() {
        let client = NorhClient::new().unwrap();
        let pattern = NorhClient::pattern_for("tcz").unwrap();
        let url = "ftp://solar-pub.nao.ac.jp/pub/nsro/norh/data/tcx/2016/05/tcz160504";
        assert!(pattern.matches(url));
        let fields = client.extractor.extract(url).unwrap();
        let wavelength = fields
            .iter()
            .find(|f| f.name.as_deref() == Some("Wavelength"))
            .unwrap();
        assert_eq!(wavelength.value.as_text(), "tcz");
    }
}
