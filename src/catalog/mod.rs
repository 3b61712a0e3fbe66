//! Host item-catalog boundary.
//!
//! The price registry never owns the authoritative list of items — the host
//! game does, and that list only freezes late in startup. This module holds
//! the small surface the registry needs from it: namespaced item ids, the
//! item kind (blocks, items, currency), and an [`ItemIndex`] lookup trait the
//! cleaner and the runtime price modifier consult. [`FixedItemIndex`] is the
//! in-memory implementation used by the CLI and tests; a real host supplies
//! its own.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::price::PriceError;

/// Two-part namespaced identifier for a tradable item or block.
///
/// Rendered as `namespace:name`, e.g. `core:gem` or `farmcraft:wheat`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId {
    namespace: String,
    name: String,
}

impl ItemId {
    /// Build an id from its two parts. Parts must be non-empty and must not
    /// contain the `:` separator.
    pub fn new(namespace: &str, name: &str) -> Result<Self, PriceError> {
        if namespace.is_empty() || name.is_empty() || namespace.contains(':') || name.contains(':')
        {
            return Err(PriceError::InvalidItemId(format!("{namespace}:{name}")));
        }
        Ok(Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

impl FromStr for ItemId {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((ns, name)) => ItemId::new(ns, name),
            None => Err(PriceError::InvalidItemId(s.to_string())),
        }
    }
}

impl TryFrom<String> for ItemId {
    type Error = PriceError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> String {
        id.to_string()
    }
}

/// What an item id resolves to in the host catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// A placeable block.
    Block,
    /// An ordinary inventory item.
    Item,
    /// Coins, notes and other money items. Never priceable.
    Currency,
}

/// Read-only view of the host's live item catalog.
///
/// Implementations must be callable from the cleaner and modifier threads.
pub trait ItemIndex: Send + Sync {
    /// Resolve an id to its kind, or `None` if no live item/block carries it.
    fn resolve(&self, id: &ItemId) -> Option<ItemKind>;
}

/// In-memory [`ItemIndex`] built from explicit registrations or an
/// `items.json` listing (`{"namespace": {"name": "item"|"block"|"currency"}}`).
#[derive(Debug, Default, Clone)]
pub struct FixedItemIndex {
    items: HashMap<ItemId, ItemKind>,
}

impl FixedItemIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one item. Later registrations overwrite earlier ones.
    pub fn insert(&mut self, id: ItemId, kind: ItemKind) {
        self.items.insert(id, kind);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Load an index from an `items.json` file. Unknown kind strings are
    /// skipped with a warning rather than failing the whole file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PriceError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let listing: HashMap<String, HashMap<String, String>> = serde_json::from_str(&contents)?;

        let mut index = Self::new();
        for (namespace, names) in listing {
            for (name, kind_str) in names {
                let kind = match kind_str.as_str() {
                    "item" => ItemKind::Item,
                    "block" => ItemKind::Block,
                    "currency" => ItemKind::Currency,
                    other => {
                        log::warn!(
                            "items listing: unknown kind {:?} for {}:{}, skipping",
                            other,
                            namespace,
                            name
                        );
                        continue;
                    }
                };
                index.insert(ItemId::new(&namespace, &name)?, kind);
            }
        }
        Ok(index)
    }
}

impl ItemIndex for FixedItemIndex {
    fn resolve(&self, id: &ItemId) -> Option<ItemKind> {
        self.items.get(id).copied()
    }
}
