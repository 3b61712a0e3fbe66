//! Catalog source loaders.
//!
//! Each loader scans one configuration source and emits parsed price records
//! plus a [`SourceReport`]. Loaders never fail past their own boundary: a
//! fatal problem marks the report failed and the builder discards the
//! records; per-entry problems skip just that entry. All three sources share
//! one document shape — top-level keys are pack namespaces, values map local
//! item names to price definitions — parsed here.

use serde_json::Value;

use crate::catalog::ItemId;
use crate::logutil::escape_log;
use crate::pack::PackSet;
use crate::price::definition::record_from_definition;
use crate::price::record::PriceRecord;
use crate::price::report::SourceReport;

mod builtin;
mod external;
mod packs;

pub use builtin::BuiltinLoader;
pub use external::{discover_external, ExternalFileLoader, OVERRIDE_FILE_NAME};
pub use packs::PackCatalogLoader;

/// Merge precedence bucket. The builder runs `First` loaders, then
/// unordered ones, then `Last`; within a bucket, configured order holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LoadOrder {
    First,
    #[default]
    None,
    Last,
}

/// What a loader hands the builder.
#[derive(Debug)]
pub struct LoadedSource {
    pub records: Vec<PriceRecord>,
    pub report: SourceReport,
}

/// One catalog source.
///
/// `load` consumes whatever backing data the loader holds; loaders are run
/// once and dropped by the builder when their merge completes.
pub trait SourceLoader: Send {
    fn name(&self) -> &str;

    /// Merge precedence. Stock loaders are unordered; external files may
    /// carry a marker.
    fn order(&self) -> LoadOrder {
        LoadOrder::None
    }

    fn load(&mut self) -> LoadedSource;
}

/// Top-level key external files may carry ahead of their namespaces.
pub(crate) const METADATA_KEY: &str = "metadata";

/// Parse a whole catalog document against the installed pack set.
///
/// Namespaces without an installed pack are recorded unaffected and
/// skipped — that is configuration for content the user simply does not
/// have, not an error. Bad entries are skipped with a diagnostic.
pub(crate) fn parse_catalog_document(
    doc: &Value,
    packs: &PackSet,
    report: &mut SourceReport,
) -> Vec<PriceRecord> {
    let Some(namespaces) = doc.as_object() else {
        report.fail("catalog root is not an object");
        return Vec::new();
    };

    let mut records = Vec::new();
    for (namespace, entries) in namespaces {
        if namespace == METADATA_KEY {
            continue;
        }
        if !packs.is_installed(namespace) {
            report.record_unaffected(namespace);
            continue;
        }
        let Some(entries) = entries.as_object() else {
            report.record_invalid(format!(
                "{}: namespace value is not an object",
                escape_log(namespace)
            ));
            continue;
        };
        for (name, definition) in entries {
            let id = match ItemId::new(namespace, name) {
                Ok(id) => id,
                Err(e) => {
                    report.record_invalid(e.to_string());
                    continue;
                }
            };
            match record_from_definition(&id, definition) {
                Ok(record) => {
                    report.record_affected(namespace);
                    records.push(record);
                }
                Err(diagnostic) => {
                    log::warn!("{}: skipping entry: {}", report.name, escape_log(&diagnostic));
                    report.record_invalid(diagnostic);
                }
            }
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn packs() -> PackSet {
        PackSet::new("core")
    }

    #[test]
    fn uninstalled_namespace_is_unaffected_not_an_error() {
        let doc = json!({
            "core": {"gem": 10},
            "ghostpack": {"phantom": 5},
        });
        let mut report = SourceReport::new("test");
        let records = parse_catalog_document(&doc, &packs(), &mut report);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id.to_string(), "core:gem");
        assert_eq!(report.unaffected, vec!["ghostpack"]);
        assert_eq!(report.affected, vec!["core"]);
        assert!(!report.failed);
        assert!(report.invalid.is_empty());
    }

    #[test]
    fn bad_entries_skip_without_failing_the_source() {
        let doc = json!({
            "core": {
                "gem": 10,
                "junk": {},
                "weird": [1, 2],
            }
        });
        let mut report = SourceReport::new("test");
        let records = parse_catalog_document(&doc, &packs(), &mut report);

        assert_eq!(records.len(), 1);
        assert_eq!(report.invalid.len(), 2);
        assert!(!report.failed);
    }

    #[test]
    fn non_object_root_fails_the_source() {
        let mut report = SourceReport::new("test");
        let records = parse_catalog_document(&json!([1, 2, 3]), &packs(), &mut report);
        assert!(records.is_empty());
        assert!(report.failed);
    }

    #[test]
    fn metadata_key_is_not_a_namespace() {
        let doc = json!({
            "metadata": {"load order": "last"},
            "core": {"gem": 10},
        });
        let mut report = SourceReport::new("test");
        let records = parse_catalog_document(&doc, &packs(), &mut report);
        assert_eq!(records.len(), 1);
        assert!(report.unaffected.is_empty());
    }
}
