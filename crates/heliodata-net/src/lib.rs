//! Heliodata Net — query attributes, archive clients, and routing.
//!
//! A query is a list of [`QueryAttribute`]s. The [`Router`] matches it
//! against each registered client's [`ClientDescriptor`] and hands the
//! query to the single most specific client, which scrapes its archive
//! through a caller-supplied [`DirectoryLister`].

pub mod attrs;
pub mod client;
pub mod clients;
pub mod descriptor;
pub mod error;
pub mod registry;
pub mod router;

pub use attrs::{AttrKind, LevelValue, QueryAttribute, Wavelength};
pub use client::{ArchiveClient, DirectoryLister, GenericClient};
pub use descriptor::{AttrPredicate, ClientDescriptor};
pub use error::{NetError, NetResult};
pub use registry::{AttrRegistry, RegistryEntry};
pub use router::{default_router, Router};
