//! Daily spectra from the Gamma-Ray Burst Monitor (GBM) on board Fermi.
//!
//! Each day carries one file per detector (`n0`–`n11`) in two
//! accumulations: CSPEC (128 channels / 4.096 s) and CTIME (8 channels
//! / 0.256 s). Detector and Resolution therefore arrive as optional
//! query attributes and as extracted record fields.

use heliodata::StaticMeta;

use crate::attrs::AttrKind;
use crate::client::GenericClient;
use crate::descriptor::{AttrPredicate, ClientDescriptor};
use crate::error::NetResult;
use crate::registry::{AttrRegistry, RegistryEntry};

const BASEURL: &str = r"https://heasarc.gsfc.nasa.gov/FTP/fermi/data/gbm/daily/%Y/%m/%d/current/glg_(\w){5}_(\w){2,3}_%y%m%d_v00.pha";
// Detector is variable width: n0-n9 are two characters, n10 and n11 three.
const EXTRACTOR: &str = "https://heasarc.gsfc.nasa.gov/FTP/fermi/data/gbm/daily/{4d}/{2d}/{2d}/current/glg_{Resolution:5w}_{Detector:w}_{}_v00.pha";

const DETECTORS: &[&str] = &[
    "n0", "n1", "n2", "n3", "n4", "n5", "n6", "n7", "n8", "n9", "n10", "n11",
];

pub const DESCRIPTOR: ClientDescriptor = ClientDescriptor {
    name: "GBMClient",
    required: &[AttrKind::Time, AttrKind::Instrument],
    optional: &[AttrKind::Detector, AttrKind::Resolution],
    predicates: &[
        (AttrKind::Instrument, AttrPredicate::NameIn(&["gbm"])),
        (AttrKind::Detector, AttrPredicate::NameIn(DETECTORS)),
        (
            AttrKind::Resolution,
            AttrPredicate::NameIn(&["cspec", "ctime"]),
        ),
    ],
    level_aliases: &[],
    meta: StaticMeta {
        source: "FERMI",
        provider: "NASA",
        instrument: "GBM",
        physobs: "flux",
    },
    registry: AttrRegistry {
        entries: &[
            RegistryEntry {
                kind: AttrKind::Instrument,
                value: "GBM",
                description: "Gamma-Ray Burst Monitor on board the Fermi satellite.",
            },
            RegistryEntry {
                kind: AttrKind::Resolution,
                value: "CSPEC",
                description: "128 channel spectra every 4.096 seconds.",
            },
            RegistryEntry {
                kind: AttrKind::Resolution,
                value: "CTIME",
                description: "8 channel spectra every 0.256 seconds.",
            },
            RegistryEntry { kind: AttrKind::Detector, value: "n0", description: "NaI detector 0." },
            RegistryEntry { kind: AttrKind::Detector, value: "n1", description: "NaI detector 1." },
            RegistryEntry { kind: AttrKind::Detector, value: "n2", description: "NaI detector 2." },
            RegistryEntry { kind: AttrKind::Detector, value: "n3", description: "NaI detector 3." },
            RegistryEntry { kind: AttrKind::Detector, value: "n4", description: "NaI detector 4." },
            RegistryEntry { kind: AttrKind::Detector, value: "n5", description: "NaI detector 5." },
            RegistryEntry { kind: AttrKind::Detector, value: "n6", description: "NaI detector 6." },
            RegistryEntry { kind: AttrKind::Detector, value: "n7", description: "NaI detector 7." },
            RegistryEntry { kind: AttrKind::Detector, value: "n8", description: "NaI detector 8." },
            RegistryEntry { kind: AttrKind::Detector, value: "n9", description: "NaI detector 9." },
            RegistryEntry { kind: AttrKind::Detector, value: "n10", description: "NaI detector 10." },
            RegistryEntry { kind: AttrKind::Detector, value: "n11", description: "NaI detector 11." },
        ],
    },
};

pub fn client() -> NetResult<GenericClient> {
    GenericClient::new(DESCRIPTOR, BASEURL, EXTRACTOR)
}
