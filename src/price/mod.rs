//! Price registry and loader pipeline.
//!
//! Startup spawns one background build (three source kinds merged in a
//! fixed order), callers block on [`PriceRegistry::get`] until the build
//! seals, and a second background pass sweeps out entries for items the
//! host no longer registers once its catalog freezes. Runtime changes go
//! through [`RegistryModifier`], which writes through to a user override
//! file the pipeline re-ingests on the next startup.

pub mod builder;
pub mod cleaner;
pub mod definition;
pub mod errors;
pub mod loaders;
pub mod modifier;
pub mod record;
pub mod registry;
pub mod report;

pub use builder::RegistryBuilder;
pub use cleaner::Cleaner;
pub use definition::record_from_definition;
pub use errors::PriceError;
pub use loaders::{
    discover_external, BuiltinLoader, ExternalFileLoader, LoadOrder, LoadedSource,
    PackCatalogLoader, SourceLoader, OVERRIDE_FILE_NAME,
};
pub use modifier::RegistryModifier;
pub use record::{PriceRecord, DEFAULT_FLUCTUATION};
pub use registry::{PriceRegistry, RegistryState};
pub use report::{BuildReport, SourceReport};
