//! The bundled default catalog, compiled into the binary.

use std::sync::Arc;

use crate::pack::PackSet;
use crate::price::loaders::{parse_catalog_document, LoadedSource, SourceLoader};
use crate::price::report::SourceReport;

/// Default catalog shipped with the crate.
const BUNDLED_CATALOG: &str = include_str!("../../../data/default_prices.json");

/// Loads the bundled default catalog. Runs unordered; external overrides
/// marked `last` win over it, `first` files lose to it.
pub struct BuiltinLoader {
    packs: Arc<PackSet>,
    source: String,
}

impl BuiltinLoader {
    pub fn new(packs: Arc<PackSet>) -> Self {
        Self {
            packs,
            source: BUNDLED_CATALOG.to_string(),
        }
    }

    /// Use a caller-supplied catalog body instead of the bundled one.
    pub fn from_source(source: impl Into<String>, packs: Arc<PackSet>) -> Self {
        Self {
            packs,
            source: source.into(),
        }
    }
}

impl SourceLoader for BuiltinLoader {
    fn name(&self) -> &str {
        "builtin"
    }

    fn load(&mut self) -> LoadedSource {
        let mut report = SourceReport::new(self.name());
        let records = match serde_json::from_str(&self.source) {
            Ok(doc) => parse_catalog_document(&doc, &self.packs, &mut report),
            Err(e) => {
                report.fail(format!("bundled catalog is corrupt: {e}"));
                Vec::new()
            }
        };
        LoadedSource { records, report }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalog_parses_cleanly() {
        let packs = Arc::new(PackSet::new("core"));
        let loaded = BuiltinLoader::new(packs).load();
        assert!(!loaded.report.failed);
        assert!(loaded.report.invalid.is_empty(), "{:?}", loaded.report.invalid);
        assert!(!loaded.records.is_empty());
    }

    #[test]
    fn corrupt_source_fails_with_empty_records() {
        let packs = Arc::new(PackSet::new("core"));
        let loaded = BuiltinLoader::from_source("{not json", packs).load();
        assert!(loaded.report.failed);
        assert!(loaded.records.is_empty());
    }
}
