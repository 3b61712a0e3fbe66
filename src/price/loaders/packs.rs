//! Loader for catalogs embedded inside installed content packs.

use std::sync::Arc;

use crate::pack::PackSet;
use crate::price::loaders::{parse_catalog_document, LoadedSource, SourceLoader};
use crate::price::report::SourceReport;

/// Scans every installed pack for an embedded price catalog — the default
/// `prices.json`, or whatever path the pack's manifest declares — and parses
/// each with the shared grammar. A pack whose catalog cannot be read is
/// recorded as an error but never blocks the other packs.
pub struct PackCatalogLoader {
    packs: Arc<PackSet>,
}

impl PackCatalogLoader {
    pub fn new(packs: Arc<PackSet>) -> Self {
        Self { packs }
    }
}

impl SourceLoader for PackCatalogLoader {
    fn name(&self) -> &str {
        "packs"
    }

    fn load(&mut self) -> LoadedSource {
        let mut report = SourceReport::new(self.name());
        let mut records = Vec::new();

        for pack in self.packs.packs() {
            let contents = match pack.read_catalog() {
                Ok(Some(contents)) => contents,
                Ok(None) => continue,
                Err(e) => {
                    report.errors.push(format!("{}: {}", pack.namespace(), e));
                    continue;
                }
            };
            match serde_json::from_str(&contents) {
                Ok(doc) => {
                    records.extend(parse_catalog_document(&doc, &self.packs, &mut report));
                }
                Err(e) => {
                    report
                        .errors
                        .push(format!("{}: corrupt embedded catalog: {}", pack.namespace(), e));
                }
            }
        }
        LoadedSource { records, report }
    }
}
