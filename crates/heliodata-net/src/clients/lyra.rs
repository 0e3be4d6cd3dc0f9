//! LYRA radiometer daily FITS files from the Proba2 Science Center.

use heliodata::StaticMeta;

use crate::attrs::AttrKind;
use crate::client::GenericClient;
use crate::descriptor::{AttrPredicate, ClientDescriptor};
use crate::error::NetResult;
use crate::registry::{AttrRegistry, RegistryEntry};

const BASEURL: &str =
    r"http://proba2.oma.be/lyra/data/bsd/%Y/%m/%d/lyra_%Y%m%d-000000_lev(\w){1}_std.fits";
const EXTRACTOR: &str =
    "http://proba2.oma.be/lyra/data/bsd/{4d}/{2d}/{2d}/lyra_{}-000000_lev{Level:d}_std.fits";

pub const DESCRIPTOR: ClientDescriptor = ClientDescriptor {
    name: "LYRAClient",
    required: &[AttrKind::Time, AttrKind::Instrument],
    optional: &[AttrKind::Level],
    predicates: &[(AttrKind::Instrument, AttrPredicate::NameIn(&["lyra"]))],
    level_aliases: &[],
    meta: StaticMeta {
        source: "Proba2",
        provider: "esa",
        instrument: "lyra",
        physobs: "irradiance",
    },
    registry: AttrRegistry {
        entries: &[
            RegistryEntry {
                kind: AttrKind::Instrument,
                value: "LYRA",
                description: "Lyman Alpha Radiometer, the solar UV radiometer on board Proba-2.",
            },
            RegistryEntry {
                kind: AttrKind::Level,
                value: "1",
                description: "Metadata and uncalibrated data, daily fits.",
            },
            RegistryEntry {
                kind: AttrKind::Level,
                value: "2",
                description: "Calibrated data, provided as daily fits.",
            },
            RegistryEntry {
                kind: AttrKind::Level,
                value: "3",
                description: "Level 2 averaged over one minute.",
            },
        ],
    },
};

pub fn client() -> NetResult<GenericClient> {
    GenericClient::new(DESCRIPTOR, BASEURL, EXTRACTOR)
}
