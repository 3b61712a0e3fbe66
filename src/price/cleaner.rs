//! The post-freeze clean pass.
//!
//! Catalog sources routinely carry prices for items the host no longer
//! registers (stale pack content, typos, removed blocks). Those entries stay
//! in the registry through the unclean window — early readers may see them —
//! and are swept out here once the host signals that its item catalog is
//! frozen. The sweep only removes; it never adds or rewrites.

use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::catalog::ItemIndex;
use crate::price::registry::PriceRegistry;
use crate::price::PriceError;

/// Pause between per-entry catalog checks, bounding the sweep's impact on
/// concurrent gameplay threads.
const DEFAULT_PACE: Duration = Duration::from_millis(1);

/// Runs the clean pass exactly once per process.
pub struct Cleaner {
    registry: Arc<PriceRegistry>,
    triggered: AtomicBool,
    pace: Duration,
}

impl Cleaner {
    pub fn new(registry: Arc<PriceRegistry>) -> Self {
        Self {
            registry,
            triggered: AtomicBool::new(false),
            pace: DEFAULT_PACE,
        }
    }

    /// Override the inter-check pause (tests use zero).
    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    /// Start the clean pass on its own background thread, reacting to the
    /// host's catalog-freeze signal. Returns `None` on any trigger after the
    /// first — a repeat is a no-op, not an error.
    ///
    /// The thread waits for the registry to seal (`BuiltUnclean`) before
    /// sweeping, so the host may signal the freeze while the build is still
    /// running.
    pub fn trigger(
        &self,
        index: Arc<dyn ItemIndex>,
    ) -> Result<Option<JoinHandle<usize>>, PriceError> {
        if self.triggered.swap(true, Ordering::SeqCst) {
            debug!("price registry clean already triggered, ignoring");
            return Ok(None);
        }

        let registry = Arc::clone(&self.registry);
        let pace = self.pace;
        let handle = std::thread::Builder::new()
            .name("price-registry-clean".to_string())
            .spawn(move || run_clean(&registry, index.as_ref(), pace))?;
        Ok(Some(handle))
    }
}

fn run_clean(registry: &PriceRegistry, index: &dyn ItemIndex, pace: Duration) -> usize {
    registry.wait_until_built();

    let ids = registry.keys();
    let checked = ids.len();
    let mut removed = 0;
    for id in ids {
        if index.resolve(&id).is_none() && registry.remove(&id) {
            info!("price registry clean: dropped {id}, no such item or block");
            removed += 1;
        }
        if !pace.is_zero() {
            std::thread::sleep(pace);
        }
    }

    info!("price registry clean: {checked} entries checked, {removed} removed");
    registry.seal_clean();
    removed
}
