//! Level 0CS quicklook data from the Extreme ultraviolet Variability
//! Experiment (EVE) on board SDO, hosted by LASP.
//!
//! Only level 0CS is served from this archive; any other level belongs
//! to a different provider, so Level is a required attribute here.

use heliodata::StaticMeta;

use crate::attrs::AttrKind;
use crate::client::GenericClient;
use crate::descriptor::{AttrPredicate, ClientDescriptor};
use crate::error::NetResult;
use crate::registry::{AttrRegistry, RegistryEntry};

const BASEURL: &str = r"http://lasp.colorado.edu/eve/data_access/evewebdata/quicklook/L0CS/SpWx/%Y/%Y%m%d_EVE_L0CS_DIODES_1m.txt";
const EXTRACTOR: &str = "http://lasp.colorado.edu/eve/data_access/evewebdata/quicklook/L0CS/SpWx/{}/{:8d}_EVE_L{Level:w}_DIODES_1m.txt";

pub const DESCRIPTOR: ClientDescriptor = ClientDescriptor {
    name: "EVEClient",
    required: &[AttrKind::Time, AttrKind::Instrument, AttrKind::Level],
    optional: &[],
    predicates: &[
        (AttrKind::Instrument, AttrPredicate::NameIn(&["eve"])),
        (AttrKind::Level, AttrPredicate::LevelIs(0)),
    ],
    level_aliases: &[("0cs", 0)],
    meta: StaticMeta {
        source: "SDO",
        provider: "LASP",
        instrument: "eve",
        physobs: "irradiance",
    },
    registry: AttrRegistry {
        entries: &[
            RegistryEntry {
                kind: AttrKind::Instrument,
                value: "EVE",
                description: "Extreme ultraviolet Variability Experiment, part of the NASA Solar Dynamics Observatory mission.",
            },
            RegistryEntry {
                kind: AttrKind::Level,
                value: "0CS",
                description: "Level 0CS quicklook space-weather diodes, the only level this archive serves.",
            },
        ],
    },
};

pub fn client() -> NetResult<GenericClient> {
    GenericClient::new(DESCRIPTOR, BASEURL, EXTRACTOR)
}
