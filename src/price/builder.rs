//! The ordered multi-source build.
//!
//! The builder owns the configured loaders, runs them bucket by bucket on a
//! dedicated background thread, and merges each non-failed source into the
//! registry as soon as it loads. One source failing never aborts the build;
//! its report is kept for the summary and its records are discarded. When
//! the last source is merged the registry seals to `BuiltUnclean` and every
//! blocked reader wakes.
//!
//! Loaders (and whatever parse buffers they still hold) are consumed by the
//! run and dropped as it finishes — nothing outlives the build thread's
//! stack frame.

use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use crate::pack::PackSet;
use crate::price::loaders::{
    discover_external, BuiltinLoader, PackCatalogLoader, SourceLoader,
};
use crate::price::registry::PriceRegistry;
use crate::price::report::BuildReport;
use crate::price::PriceError;

pub struct RegistryBuilder {
    registry: Arc<PriceRegistry>,
    loaders: Vec<Box<dyn SourceLoader>>,
}

impl RegistryBuilder {
    pub fn new(registry: Arc<PriceRegistry>) -> Self {
        Self {
            registry,
            loaders: Vec::new(),
        }
    }

    /// The stock pipeline: bundled catalog, then installed pack catalogs,
    /// then every file in the external directory.
    pub fn standard(
        registry: Arc<PriceRegistry>,
        packs: Arc<PackSet>,
        external_dir: &Path,
    ) -> Self {
        let mut builder = Self::new(registry)
            .with_loader(BuiltinLoader::new(Arc::clone(&packs)))
            .with_loader(PackCatalogLoader::new(Arc::clone(&packs)));
        for file_loader in discover_external(external_dir, packs) {
            builder = builder.with_loader(file_loader);
        }
        builder
    }

    /// Append a loader. List position is the sub-order inside its bucket.
    pub fn with_loader(mut self, loader: impl SourceLoader + 'static) -> Self {
        self.loaders.push(Box::new(loader));
        self
    }

    /// Run the build on a dedicated background thread. The startup thread
    /// never waits on catalog or archive IO; readers block in
    /// [`PriceRegistry::get`] instead.
    pub fn spawn(self) -> Result<JoinHandle<BuildReport>, PriceError> {
        let handle = std::thread::Builder::new()
            .name("price-registry-build".to_string())
            .spawn(move || self.run())?;
        Ok(handle)
    }

    /// Run the build on the calling thread. `spawn` is the production path;
    /// this is for tests and the CLI, where blocking is the point.
    pub fn run(mut self) -> BuildReport {
        self.registry.begin_build();
        let started = Instant::now();

        // first bucket, then unordered, then last; stable within a bucket
        self.loaders.sort_by_key(|l| l.order());

        let mut reports = Vec::with_capacity(self.loaders.len());
        for mut loader in self.loaders {
            let mut loaded = loader.load();
            if loaded.report.failed {
                log::warn!(
                    "price source {} failed, discarding its records: {}",
                    loaded.report.name,
                    loaded.report.errors.join("; ")
                );
            } else {
                let (added, replaced) = self.registry.merge(loaded.records);
                loaded.report.added = added;
                loaded.report.replaced = replaced;
                log::debug!(
                    "price source {} merged {} entries ({} replacing)",
                    loaded.report.name,
                    added,
                    replaced
                );
            }
            reports.push(loaded.report);
            // loader drops here, releasing its parsed source data
        }

        let report = BuildReport {
            total_entries: self.registry.len(),
            elapsed: started.elapsed(),
            sources: reports,
        };
        for line in report.format_summary().lines() {
            log::info!("{line}");
        }

        self.registry.seal_unclean();
        report
    }
}
