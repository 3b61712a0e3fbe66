//! # Tradepost - Item Price Registry for Game Servers
//!
//! Tradepost maintains the mapping from tradable-item identifiers to price
//! records (buy, sell, fluctuation, per-side prohibition), merged at startup
//! from several independent, untrusted configuration sources and kept
//! consistent with the host's authoritative item catalog.
//!
//! ## Features
//!
//! - **Multi-Source Merge**: Bundled defaults, per-pack embedded catalogs,
//!   and a user-writable override directory, merged in a deterministic
//!   first/unordered/last order with replacement accounting.
//! - **Background Build**: All catalog and archive IO runs on a dedicated
//!   thread; early callers block in `get` until the registry seals, never
//!   on file IO.
//! - **Two-Phase Consistency**: The registry is readable as soon as the
//!   merge finishes (unclean) and is swept against the host's frozen item
//!   catalog later (clean); removal-only, exactly once.
//! - **Runtime Changes**: Validated price changes apply in memory and write
//!   through to an override file that wins the merge on the next startup.
//! - **Fault Isolation**: A corrupt source never aborts the build; bad
//!   entries skip with diagnostics collected per source.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tradepost::catalog::FixedItemIndex;
//! use tradepost::pack::PackSet;
//! use tradepost::price::{Cleaner, PriceRegistry, RegistryBuilder};
//!
//! fn main() -> anyhow::Result<()> {
//!     let registry = Arc::new(PriceRegistry::new());
//!     let packs = Arc::new(PackSet::discover("core", "data/packs".as_ref()));
//!
//!     // startup: build in the background, play on
//!     let build = RegistryBuilder::standard(
//!         Arc::clone(&registry),
//!         packs,
//!         "data/prices".as_ref(),
//!     )
//!     .spawn()?;
//!
//!     // blocks until the build seals, then answers
//!     let gem = registry.get(&"core:gem".parse()?);
//!     println!("{gem:?}");
//!
//!     // once the host's item catalog freezes:
//!     let index = Arc::new(FixedItemIndex::load("data/items.json")?);
//!     Cleaner::new(Arc::clone(&registry)).trigger(index)?;
//!
//!     build.join().expect("build thread panicked");
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`price`] - The registry, loader pipeline, cleaner and modifier
//! - [`pack`] - Installed content packs (directories or `.tar.gz` archives)
//! - [`catalog`] - The host item-catalog boundary the pipeline validates against
//! - [`config`] - TOML deployment configuration for the CLI
//! - [`logutil`] - Log sanitization for untrusted catalog text

pub mod catalog;
pub mod config;
pub mod logutil;
pub mod pack;
pub mod price;
