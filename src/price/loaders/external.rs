//! Loader for the user-writable catalog directory.
//!
//! Every `.json` file in the directory is its own source: files parse
//! independently, one corrupt file never blocks another, and each may carry
//! a `metadata` block choosing its merge bucket. The runtime price modifier
//! writes its overrides into this directory too (as `user_prices.json`,
//! marked `last`), so they re-ingest through this loader on the next
//! startup.

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::pack::PackSet;
use crate::price::loaders::{
    parse_catalog_document, LoadOrder, LoadedSource, SourceLoader, METADATA_KEY,
};
use crate::price::report::SourceReport;

/// File the runtime price modifier persists into, inside the same directory.
pub const OVERRIDE_FILE_NAME: &str = "user_prices.json";

/// Extension external catalog files must carry.
const CATALOG_EXTENSION: &str = "json";

/// One external catalog file, discovered and parsed ahead of the build so
/// its merge bucket is known before any loader runs.
pub struct ExternalFileLoader {
    name: String,
    order: LoadOrder,
    parsed: Result<Value, String>,
    packs: Arc<PackSet>,
}

impl ExternalFileLoader {
    fn open(path: &Path, packs: Arc<PackSet>) -> Self {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("<non-utf8>")
            .to_string();
        let name = format!("external:{file_name}");

        let parsed = std::fs::read_to_string(path)
            .map_err(|e| format!("unreadable: {e}"))
            .and_then(|contents| {
                serde_json::from_str::<Value>(&contents).map_err(|e| format!("corrupt: {e}"))
            });

        let order = match &parsed {
            Ok(doc) => file_order(&name, doc),
            Err(_) => LoadOrder::None,
        };
        Self {
            name,
            order,
            parsed,
            packs,
        }
    }
}

/// Read the `metadata` block's load-order marker. Anything that is not the
/// string `first` or `last` — including the array form some hand-edited
/// files have carried — means unordered.
fn file_order(name: &str, doc: &Value) -> LoadOrder {
    let Some(metadata) = doc.get(METADATA_KEY).and_then(Value::as_object) else {
        return LoadOrder::None;
    };
    if let Some(cache) = metadata.get("cache").and_then(Value::as_bool) {
        // accepted for compatibility with existing files; nothing here
        // re-reads catalogs after startup, so there is nothing to cache
        log::debug!("{name}: cache flag {cache} ignored");
    }
    match metadata.get("load order") {
        None => LoadOrder::None,
        Some(Value::String(s)) if s.eq_ignore_ascii_case("first") => LoadOrder::First,
        Some(Value::String(s)) if s.eq_ignore_ascii_case("last") => LoadOrder::Last,
        Some(other) => {
            log::debug!("{name}: unrecognized load order {other}, treating as unordered");
            LoadOrder::None
        }
    }
}

impl SourceLoader for ExternalFileLoader {
    fn name(&self) -> &str {
        &self.name
    }

    fn order(&self) -> LoadOrder {
        self.order
    }

    fn load(&mut self) -> LoadedSource {
        let mut report = SourceReport::new(self.name.clone());
        let records = match &self.parsed {
            Ok(doc) => parse_catalog_document(doc, &self.packs, &mut report),
            Err(reason) => {
                report.fail(reason.clone());
                Vec::new()
            }
        };
        LoadedSource { records, report }
    }
}

/// Scan `dir` for catalog files, one loader per file, in file-name order (the
/// configured sub-order inside each merge bucket). A missing directory is an
/// empty result, not an error.
pub fn discover_external(dir: &Path, packs: Arc<PackSet>) -> Vec<ExternalFileLoader> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("no external catalog directory at {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.eq_ignore_ascii_case(CATALOG_EXTENSION))
                    .unwrap_or(false)
        })
        .collect();
    paths.sort();

    paths
        .iter()
        .map(|path| ExternalFileLoader::open(path, Arc::clone(&packs)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn packs() -> Arc<PackSet> {
        Arc::new(PackSet::new("core"))
    }

    #[test]
    fn discovery_is_filename_ordered_and_json_only() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("b.json"), r#"{"core": {"gem": 1}}"#).unwrap();
        fs::write(tmp.path().join("a.json"), r#"{"core": {"gem": 2}}"#).unwrap();
        fs::write(tmp.path().join("notes.txt"), "not a catalog").unwrap();

        let loaders = discover_external(tmp.path(), packs());
        let names: Vec<&str> = loaders.iter().map(|l| l.name()).collect();
        assert_eq!(names, vec!["external:a.json", "external:b.json"]);
    }

    #[test]
    fn metadata_selects_the_merge_bucket() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("base.json"),
            r#"{"metadata": {"load order": "first"}, "core": {"gem": 1}}"#,
        )
        .unwrap();
        fs::write(
            tmp.path().join("win.json"),
            r#"{"metadata": {"load order": "LAST"}, "core": {"gem": 2}}"#,
        )
        .unwrap();
        fs::write(tmp.path().join("mid.json"), r#"{"core": {"gem": 3}}"#).unwrap();

        let loaders = discover_external(tmp.path(), packs());
        let orders: Vec<(&str, LoadOrder)> =
            loaders.iter().map(|l| (l.name(), l.order())).collect();
        assert!(orders.contains(&("external:base.json", LoadOrder::First)));
        assert!(orders.contains(&("external:win.json", LoadOrder::Last)));
        assert!(orders.contains(&("external:mid.json", LoadOrder::None)));
    }

    #[test]
    fn non_scalar_load_order_means_unordered() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("odd.json"),
            r#"{"metadata": {"load order": ["first"]}, "core": {"gem": 1}}"#,
        )
        .unwrap();

        let loaders = discover_external(tmp.path(), packs());
        assert_eq!(loaders[0].order(), LoadOrder::None);
    }

    #[test]
    fn corrupt_file_fails_alone() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("bad.json"), "{nope").unwrap();
        fs::write(tmp.path().join("good.json"), r#"{"core": {"gem": 7}}"#).unwrap();

        let mut loaders = discover_external(tmp.path(), packs());
        let bad = loaders
            .iter_mut()
            .find(|l| l.name() == "external:bad.json")
            .unwrap()
            .load();
        assert!(bad.report.failed);
        assert!(bad.records.is_empty());

        let good = loaders
            .iter_mut()
            .find(|l| l.name() == "external:good.json")
            .unwrap()
            .load();
        assert!(!good.report.failed);
        assert_eq!(good.records.len(), 1);
    }

    #[test]
    fn missing_directory_is_empty_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let loaders = discover_external(&tmp.path().join("nope"), packs());
        assert!(loaders.is_empty());
    }
}
