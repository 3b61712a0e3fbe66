//! Per-source and whole-build diagnostics.
//!
//! Reports are write-once bookkeeping: loaders and the builder fill them in,
//! the summary log and the CLI read them. Nothing in the pipeline branches
//! on a report.

use std::collections::BTreeSet;
use std::time::Duration;

/// Outcome of one source loader invocation.
#[derive(Debug, Clone, Default)]
pub struct SourceReport {
    /// Loader name, e.g. `builtin` or `external:prices/user_prices.json`.
    pub name: String,
    /// Entries merged into the registry from this source.
    pub added: usize,
    /// Of those, entries that overwrote a key an earlier source had written.
    pub replaced: usize,
    /// Per-entry rejection diagnostics (entry skipped, source continues).
    pub invalid: Vec<String>,
    /// Pack namespaces this source contributed entries for.
    pub affected: Vec<String>,
    /// Namespaces this source listed but which are not installed.
    pub unaffected: Vec<String>,
    /// Fatal errors (missing/corrupt file, archive failure).
    pub errors: Vec<String>,
    /// When set, the source's records were discarded entirely.
    pub failed: bool,
}

impl SourceReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Record a skipped entry. The source keeps loading.
    pub fn record_invalid(&mut self, diagnostic: impl Into<String>) {
        self.invalid.push(diagnostic.into());
    }

    /// Record a fatal error and mark the whole source failed.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.failed = true;
    }

    pub fn record_affected(&mut self, namespace: &str) {
        if !self.affected.iter().any(|n| n == namespace) {
            self.affected.push(namespace.to_string());
        }
    }

    pub fn record_unaffected(&mut self, namespace: &str) {
        if !self.unaffected.iter().any(|n| n == namespace) {
            self.unaffected.push(namespace.to_string());
        }
    }
}

/// Aggregated outcome of a full registry build.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub sources: Vec<SourceReport>,
    /// Entries in the registry when the build sealed.
    pub total_entries: usize,
    pub elapsed: Duration,
}

impl BuildReport {
    /// Union of affected pack namespaces across all sources, sorted.
    pub fn affected_packs(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self
            .sources
            .iter()
            .flat_map(|s| s.affected.iter().map(String::as_str))
            .collect();
        set.into_iter().map(str::to_string).collect()
    }

    pub fn failed_sources(&self) -> usize {
        self.sources.iter().filter(|s| s.failed).count()
    }

    pub fn invalid_entries(&self) -> usize {
        self.sources.iter().map(|s| s.invalid.len()).sum()
    }

    /// One human-readable block, used verbatim by the summary log and the
    /// CLI `build` command.
    pub fn format_summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "price registry built: {} entries from {} sources in {:.0?}\n",
            self.total_entries,
            self.sources.len(),
            self.elapsed
        ));
        for source in &self.sources {
            if source.failed {
                out.push_str(&format!(
                    "  {} FAILED: {}\n",
                    source.name,
                    source.errors.join("; ")
                ));
            } else {
                out.push_str(&format!(
                    "  {}: {} added ({} replacing earlier entries), {} invalid\n",
                    source.name,
                    source.added,
                    source.replaced,
                    source.invalid.len()
                ));
            }
        }
        let affected = self.affected_packs();
        if !affected.is_empty() {
            out.push_str(&format!("  packs affected: {}\n", affected.join(", ")));
        }
        if self.failed_sources() > 0 {
            out.push_str(&format!("  {} source(s) failed\n", self.failed_sources()));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affected_union_is_sorted_and_deduped() {
        let mut a = SourceReport::new("a");
        a.record_affected("farmcraft");
        a.record_affected("core");
        let mut b = SourceReport::new("b");
        b.record_affected("core");

        let report = BuildReport {
            sources: vec![a, b],
            total_entries: 3,
            elapsed: Duration::from_millis(5),
        };
        assert_eq!(report.affected_packs(), vec!["core", "farmcraft"]);
    }

    #[test]
    fn fail_marks_source_and_keeps_error_text() {
        let mut report = SourceReport::new("builtin");
        report.fail("no such file");
        assert!(report.failed);
        assert_eq!(report.errors, vec!["no such file"]);
    }

    #[test]
    fn summary_mentions_failures() {
        let mut bad = SourceReport::new("packs:broken");
        bad.fail("archive truncated");
        let report = BuildReport {
            sources: vec![SourceReport::new("builtin"), bad],
            total_entries: 10,
            elapsed: Duration::from_millis(1),
        };
        let summary = report.format_summary();
        assert!(summary.contains("packs:broken FAILED"));
        assert!(summary.contains("1 source(s) failed"));
    }
}
