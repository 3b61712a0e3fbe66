//! Runtime price changes and their persistence.
//!
//! Once the registry is sealed, price changes arrive here (from admin
//! commands, typically). A change is validated against the live item
//! catalog, applied to the in-memory registry, then written through to the
//! user override file so it survives restarts — the external-directory
//! loader re-ingests that file on the next full startup, in the `last`
//! bucket so it wins over shipped catalogs.
//!
//! Persistence is write-behind: a disk failure is logged and reported to
//! the caller, but the in-memory change stays. Registry and file may
//! diverge until the next successful write.

use chrono::Utc;
use fs2::FileExt;
use serde_json::{json, Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::catalog::{ItemIndex, ItemKind};
use crate::price::loaders::OVERRIDE_FILE_NAME;
use crate::price::record::PriceRecord;
use crate::price::registry::PriceRegistry;
use crate::price::PriceError;

pub struct RegistryModifier {
    registry: Arc<PriceRegistry>,
    index: Arc<dyn ItemIndex>,
    override_path: PathBuf,
}

impl RegistryModifier {
    /// `external_dir` is the same directory the external loader scans; the
    /// override file lives there as `user_prices.json`.
    pub fn new(
        registry: Arc<PriceRegistry>,
        index: Arc<dyn ItemIndex>,
        external_dir: &Path,
    ) -> Self {
        Self {
            registry,
            index,
            override_path: external_dir.join(OVERRIDE_FILE_NAME),
        }
    }

    pub fn override_path(&self) -> &Path {
        &self.override_path
    }

    /// Apply a price change. Returns false when the change is rejected
    /// (unknown item, currency item) or when it applied in memory but could
    /// not be persisted.
    pub fn set_price(&self, record: PriceRecord) -> bool {
        match self.index.resolve(&record.id) {
            None => {
                log::warn!(
                    "rejecting price change for {}: no such item or block",
                    record.id
                );
                return false;
            }
            Some(ItemKind::Currency) => {
                log::warn!(
                    "rejecting price change for {}: money itself cannot be priced",
                    record.id
                );
                return false;
            }
            Some(_) => {}
        }

        self.registry.put(record.clone());

        match self.persist(&record) {
            Ok(()) => {
                log::debug!("persisted price change for {}", record.id);
                true
            }
            Err(e) => {
                // in-memory change stays; disk is stale until the next write
                log::error!("price change for {} applied but not persisted: {e}", record.id);
                false
            }
        }
    }

    /// Rewrite the override file with this record folded in, under an
    /// exclusive lock. Prior entries are preserved; a corrupt or missing
    /// file starts a blank slate.
    fn persist(&self, record: &PriceRecord) -> Result<(), PriceError> {
        if let Some(dir) = self.override_path.parent() {
            fs::create_dir_all(dir)?;
        }

        let mut doc = match fs::read_to_string(&self.override_path) {
            Ok(contents) => match serde_json::from_str::<Value>(&contents) {
                Ok(Value::Object(map)) => map,
                Ok(_) | Err(_) => {
                    log::warn!(
                        "override file {} is corrupt, starting over",
                        self.override_path.display()
                    );
                    Map::new()
                }
            },
            Err(_) => Map::new(),
        };

        doc.insert(
            "metadata".to_string(),
            json!({
                "load order": "last",
                "updated": Utc::now().to_rfc3339(),
            }),
        );

        let group = doc
            .entry(record.id.namespace().to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(group) = group.as_object_mut() else {
            return Err(PriceError::Persist(format!(
                "override group {} is not an object",
                record.id.namespace()
            )));
        };
        group.insert(record.id.name().to_string(), entry_value(record));

        let data = serde_json::to_string_pretty(&Value::Object(doc))?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.override_path)?;
        file.lock_exclusive()?;
        let outcome = file
            .write_all(data.as_bytes())
            .and_then(|_| file.flush())
            .and_then(|_| file.sync_all());
        let _ = file.unlock();
        outcome?;
        Ok(())
    }
}

/// Override-file form of a record: prohibited sides become `false`.
fn entry_value(record: &PriceRecord) -> Value {
    let side = |price: f64, prohibited: bool| {
        if prohibited {
            Value::Bool(false)
        } else {
            json!(price)
        }
    };
    json!({
        "buy": side(record.buy, record.prohibit_buy),
        "sell": side(record.sell, record.prohibit_sell),
        "fluctuation": record.fluctuation,
    })
}
