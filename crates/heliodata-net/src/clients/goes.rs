//! GOES archives: the XRS fits archive at SDAC and the SUVI imager at
//! NOAA.

use chrono::{NaiveDate, NaiveDateTime};
use heliodata::{collect_records, ExtractorPattern, Record, StaticMeta, TimeRange, UrlPattern};

use crate::attrs::{query_wavelength, AttrKind, QueryAttribute};
use crate::client::{scrape_archive, ArchiveClient, DirectoryLister, GenericClient};
use crate::descriptor::{AttrPredicate, ClientDescriptor};
use crate::error::{NetError, NetResult};
use crate::registry::{AttrRegistry, RegistryEntry};

const XRS_BASEURL: &str = r"https://umbra.nascom.nasa.gov/goes/fits/%Y/go(\d){2}(\d){2,4}%m%d.fits";
const XRS_EXTRACTOR: &str =
    "https://umbra.nascom.nasa.gov/goes/fits/{year:4d}/go{SatelliteNumber:02d}{}{month:2d}{day:2d}.fits";

const XRS_SATELLITES: &[i64] = &[2, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15];

pub const XRS_DESCRIPTOR: ClientDescriptor = ClientDescriptor {
    name: "XRSClient",
    required: &[AttrKind::Time, AttrKind::Instrument],
    optional: &[AttrKind::SatelliteNumber],
    predicates: &[
        (AttrKind::Instrument, AttrPredicate::NameIn(&["xrs", "goes"])),
        (AttrKind::SatelliteNumber, AttrPredicate::SatelliteIn(XRS_SATELLITES)),
    ],
    level_aliases: &[],
    meta: StaticMeta {
        source: "nasa",
        provider: "sdac",
        instrument: "goes",
        physobs: "irradiance",
    },
    registry: AttrRegistry {
        entries: &[
            RegistryEntry {
                kind: AttrKind::Instrument,
                value: "GOES",
                description: "The Geostationary Operational Environmental Satellite Program.",
            },
            RegistryEntry {
                kind: AttrKind::Instrument,
                value: "XRS",
                description: "GOES X-ray flux.",
            },
            RegistryEntry { kind: AttrKind::SatelliteNumber, value: "2", description: "GOES satellite number 2." },
            RegistryEntry { kind: AttrKind::SatelliteNumber, value: "5", description: "GOES satellite number 5." },
            RegistryEntry { kind: AttrKind::SatelliteNumber, value: "6", description: "GOES satellite number 6." },
            RegistryEntry { kind: AttrKind::SatelliteNumber, value: "7", description: "GOES satellite number 7." },
            RegistryEntry { kind: AttrKind::SatelliteNumber, value: "8", description: "GOES satellite number 8." },
            RegistryEntry { kind: AttrKind::SatelliteNumber, value: "9", description: "GOES satellite number 9." },
            RegistryEntry { kind: AttrKind::SatelliteNumber, value: "10", description: "GOES satellite number 10." },
            RegistryEntry { kind: AttrKind::SatelliteNumber, value: "11", description: "GOES satellite number 11." },
            RegistryEntry { kind: AttrKind::SatelliteNumber, value: "12", description: "GOES satellite number 12." },
            RegistryEntry { kind: AttrKind::SatelliteNumber, value: "13", description: "GOES satellite number 13." },
            RegistryEntry { kind: AttrKind::SatelliteNumber, value: "14", description: "GOES satellite number 14." },
            RegistryEntry { kind: AttrKind::SatelliteNumber, value: "15", description: "GOES satellite number 15." },
        ],
    },
};

pub fn xrs_client() -> NetResult<GenericClient> {
    GenericClient::new(XRS_DESCRIPTOR, XRS_BASEURL, XRS_EXTRACTOR)
}

// ── SUVI ────────────────────────────────────────────────────────────────

const SUVI_L2_BASEURL: &str = r"https://data.ngdc.noaa.gov/platforms/solar-space-observing-satellites/goes/goes{sat}/l2/data/suvi-l2-ci{wave}/%Y/%m/%d/dr_suvi-l2-ci{wave}_g{sat}_s%Y%m%dT%H%M%SZ_.*\.fits";
const SUVI_L1B_BASEURL: &str = r"https://data.ngdc.noaa.gov/platforms/solar-space-observing-satellites/goes/goes{sat}/l1b/suvi-l1b-{band}{wave}/%Y/%m/%d/OR_SUVI-L1b-{Band}{fwave}_G{sat}_s%Y%j%H%M%S.*\.fits.gz";

const SUVI_L2_EXTRACTOR: &str =
    "{}/goes{SatelliteNumber:2d}/l{Level:w}/data/suvi-l2-ci{Wavelength:3d}/{4d}/{2d}/{2d}/{}";
const SUVI_L1B_EXTRACTOR: &str =
    "{}/goes{SatelliteNumber:2d}/l{Level:w}/suvi-l1b-{:.2w}{Wavelength:3d}/{4d}/{2d}/{2d}/{}";

/// Level-1b bands: wavelength, band code, capitalized code, and the
/// wavelength the archive writes into the filename. The filename value
/// is off by one for the 94 and 304 bands; whether that is an archive
/// quirk or an upstream defect is unknown, so it stays an explicit
/// table rather than a rule.
const SUVI_L1B_BANDS: &[(i64, &str, &str, i64)] = &[
    (94, "fe", "Fe", 93),
    (131, "fe", "Fe", 131),
    (171, "fe", "Fe", 171),
    (195, "fe", "Fe", 195),
    (284, "fe", "Fe", 284),
    (304, "he", "He", 303),
];

const SUVI_WAVELENGTHS: &[f64] = &[94.0, 131.0, 171.0, 195.0, 284.0, 304.0];

/// The SUVI imager operational at a given instant, newest first.
/// GOES-17 never served regular level-2 data and is not listed;
/// GOES-16's start is the first day of regular level-1b availability.
fn operational_satellite(start: NaiveDateTime) -> Option<i64> {
    let goes16 = NaiveDate::from_ymd_opt(2018, 6, 1)?.and_hms_opt(0, 0, 0)?;
    (start >= goes16).then_some(16)
}

pub const SUVI_DESCRIPTOR: ClientDescriptor = ClientDescriptor {
    name: "SUVIClient",
    required: &[AttrKind::Time, AttrKind::Instrument],
    optional: &[AttrKind::Wavelength, AttrKind::Level, AttrKind::SatelliteNumber],
    predicates: &[
        (AttrKind::Instrument, AttrPredicate::NameIn(&["suvi"])),
        (AttrKind::Level, AttrPredicate::LevelIn(&[1, 2])),
        (AttrKind::Wavelength, AttrPredicate::WavelengthIn(SUVI_WAVELENGTHS)),
        (AttrKind::SatelliteNumber, AttrPredicate::SatelliteAtLeast(16)),
    ],
    level_aliases: &[("1b", 1)],
    meta: StaticMeta {
        source: "GOES",
        provider: "NOAA",
        instrument: "SUVI",
        physobs: "flux",
    },
    registry: AttrRegistry {
        entries: &[
            RegistryEntry {
                kind: AttrKind::Instrument,
                value: "SUVI",
                description: "Solar Ultraviolet Imager, first flown on GOES-16.",
            },
            RegistryEntry {
                kind: AttrKind::Level,
                value: "2",
                description: "Weighted average of level-1b files; higher dynamic range.",
            },
            RegistryEntry {
                kind: AttrKind::Level,
                value: "1b",
                description: "Individual exposures, 1 s down to 0.005 s.",
            },
            RegistryEntry { kind: AttrKind::Wavelength, value: "094", description: "Fe 94 angstrom band." },
            RegistryEntry { kind: AttrKind::Wavelength, value: "131", description: "Fe 131 angstrom band." },
            RegistryEntry { kind: AttrKind::Wavelength, value: "171", description: "Fe 171 angstrom band." },
            RegistryEntry { kind: AttrKind::Wavelength, value: "195", description: "Fe 195 angstrom band." },
            RegistryEntry { kind: AttrKind::Wavelength, value: "284", description: "Fe 284 angstrom band." },
            RegistryEntry { kind: AttrKind::Wavelength, value: "304", description: "He 304 angstrom band." },
            RegistryEntry { kind: AttrKind::SatelliteNumber, value: "16", description: "GOES-16, launched 2016." },
            RegistryEntry { kind: AttrKind::SatelliteNumber, value: "17", description: "GOES-17, launched 2018." },
            RegistryEntry { kind: AttrKind::SatelliteNumber, value: "18", description: "GOES-18, launched 2022." },
            RegistryEntry { kind: AttrKind::SatelliteNumber, value: "19", description: "GOES-19, launched 2024." },
        ],
    },
};

/// Client for the SUVI archive. Unlike the generic clients, the URL
/// pattern depends on the query: one pattern per requested wavelength
/// and level.
pub struct SuviClient {
    descriptor: ClientDescriptor,
    l2_extractor: ExtractorPattern,
    l1b_extractor: ExtractorPattern,
}

impl SuviClient {
    /// Compile-checks both built-in templates so a malformed one fails
    /// at construction, not on a query.
    pub fn new() -> NetResult<Self> {
        suvi_pattern(2, 171, 16)?;
        suvi_pattern(1, 304, 16)?;
        Ok(Self {
            descriptor: SUVI_DESCRIPTOR,
            l2_extractor: ExtractorPattern::compile(SUVI_L2_EXTRACTOR)?,
            l1b_extractor: ExtractorPattern::compile(SUVI_L1B_EXTRACTOR)?,
        })
    }
}

fn suvi_pattern(level: i64, wave: i64, sat: i64) -> NetResult<UrlPattern> {
    let sat = sat.to_string();
    let padded = format!("{wave:03}");
    if level == 2 {
        return Ok(UrlPattern::compile_with(
            SUVI_L2_BASEURL,
            &[("sat", &sat), ("wave", &padded)],
        )?);
    }
    let &(_, band, band_cap, fname_wave) = SUVI_L1B_BANDS
        .iter()
        .find(|(w, _, _, _)| *w == wave)
        .ok_or_else(|| NetError::UnsupportedValue(format!("SUVI has no {wave} angstrom band")))?;
    let fname_wave = format!("{fname_wave:03}");
    Ok(UrlPattern::compile_with(
        SUVI_L1B_BASEURL,
        &[
            ("sat", &sat),
            ("wave", &padded),
            ("fwave", &fname_wave),
            ("band", band),
            ("Band", band_cap),
        ],
    )?)
}

impl ArchiveClient for SuviClient {
    fn descriptor(&self) -> &ClientDescriptor {
        &self.descriptor
    }

    fn list_and_extract(
        &self,
        lister: &dyn DirectoryLister,
        range: &TimeRange,
        filters: &[QueryAttribute],
    ) -> NetResult<Vec<Record>> {
        let level = match filters.iter().find_map(|a| match a {
            QueryAttribute::Level(v) => Some(v),
            _ => None,
        }) {
            // Default to the highest level of data.
            None => 2,
            Some(v) => self.descriptor.normalize_level(v).ok_or_else(|| {
                NetError::UnsupportedValue(format!("SUVI level {v:?} is not 2 or 1b"))
            })?,
        };
        let satellite = match filters.iter().find_map(|a| match a {
            QueryAttribute::SatelliteNumber(n) => Some(*n),
            _ => None,
        }) {
            Some(n) => n,
            None => operational_satellite(range.start()).ok_or_else(|| {
                NetError::UnsupportedValue(format!(
                    "no SUVI imager was operational at {}",
                    range.start()
                ))
            })?,
        };
        if satellite < 16 {
            return Err(NetError::UnsupportedValue(format!(
                "SUVI flies on GOES-16 and later, not GOES-{satellite}"
            )));
        }

        let waves: Vec<i64> = match query_wavelength(filters) {
            Some(band) => SUVI_WAVELENGTHS
                .iter()
                .filter(|w| band.contains(**w))
                .map(|w| *w as i64)
                .collect(),
            None => SUVI_WAVELENGTHS.iter().map(|w| *w as i64).collect(),
        };
        if waves.is_empty() {
            return Err(NetError::UnsupportedValue(
                "no supported SUVI wavelength in the requested band".to_string(),
            ));
        }

        let extractor = if level == 2 {
            &self.l2_extractor
        } else {
            &self.l1b_extractor
        };

        let mut records = Vec::new();
        for wave in waves {
            let pattern = suvi_pattern(level, wave, satellite)?;
            records.extend(scrape_archive(
                &self.descriptor,
                &pattern,
                extractor,
                lister,
                range,
                filters,
            )?);
        }
        Ok(collect_records(records))
    }
}
