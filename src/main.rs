//! Binary entrypoint for the tradepost CLI.
//!
//! Commands:
//! - `init` - create a starter `config.toml`, data directories and sample listings
//! - `build` - run the full loader pipeline and print the merge summary
//! - `query <item>` - build, then look up one item and print a fluctuated quote
//! - `set-price <item>` - apply and persist a runtime price change
//!
//! See the library crate docs for module-level details: `tradepost::`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tradepost::catalog::{FixedItemIndex, ItemId, ItemIndex};
use tradepost::config::Config;
use tradepost::pack::PackSet;
use tradepost::price::{
    Cleaner, PriceRecord, PriceRegistry, RegistryBuilder, RegistryModifier, DEFAULT_FLUCTUATION,
};

#[derive(Parser)]
#[command(name = "tradepost")]
#[command(about = "Item price registry and catalog loader for game servers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a starter configuration and data directories
    Init,
    /// Build the registry from every configured source and print the summary
    Build {
        /// Also run the clean pass against the items listing
        #[arg(long)]
        clean: bool,
    },
    /// Build, then look up one item id (e.g. core:gem)
    Query {
        /// Item id to look up
        item: String,
    },
    /// Apply a runtime price change and persist it to the override file
    SetPrice {
        /// Item id to change
        item: String,
        /// New buy price; omit to prohibit buying
        #[arg(long)]
        buy: Option<f64>,
        /// New sell price; omit to prohibit selling
        #[arg(long)]
        sell: Option<f64>,
        /// Fluctuation percentage
        #[arg(long, default_value_t = DEFAULT_FLUCTUATION)]
        fluctuation: f64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.command {
        Commands::Init => None,
        _ => Some(Config::load(&cli.config)?),
    };
    init_logging(&config, cli.verbose);

    match cli.command {
        Commands::Init => init_workspace(&cli.config),
        Commands::Build { clean } => {
            let config = config.expect("config loaded above");
            let (registry, index) = build_registry(&config)?;
            if clean {
                let cleaner = Cleaner::new(Arc::clone(&registry))
                    .with_pace(Duration::from_millis(config.cleaner.pace_ms));
                if let Some(handle) = cleaner.trigger(index)? {
                    let removed = handle.join().map_err(|_| anyhow!("clean pass panicked"))?;
                    info!("clean pass removed {removed} entries");
                }
            }
            for record in registry.snapshot() {
                println!("{}", format_record(&record));
            }
            Ok(())
        }
        Commands::Query { item } => {
            let config = config.expect("config loaded above");
            let (registry, _) = build_registry(&config)?;
            let id: ItemId = item.parse()?;
            match registry.get(&id) {
                Some(record) => {
                    println!("{}", format_record(&record));
                    if record.buyable() || record.sellable() {
                        println!(
                            "quote now: buy {:.2} / sell {:.2}",
                            record.buy_quote(),
                            record.sell_quote()
                        );
                    }
                }
                None => println!("{id}: no price entry"),
            }
            Ok(())
        }
        Commands::SetPrice {
            item,
            buy,
            sell,
            fluctuation,
        } => {
            let config = config.expect("config loaded above");
            if buy.is_some_and(|b| b < 0.0)
                || sell.is_some_and(|s| s < 0.0)
                || fluctuation < 0.0
            {
                return Err(anyhow!("prices and fluctuation must be non-negative"));
            }
            let (registry, index) = build_registry(&config)?;
            let id: ItemId = item.parse()?;
            let record = PriceRecord::new(
                id.clone(),
                buy.unwrap_or(0.0),
                sell.unwrap_or(0.0),
                fluctuation,
                buy.is_none(),
                sell.is_none(),
            );
            let modifier = RegistryModifier::new(registry, index, &config.prices.directory);
            if modifier.set_price(record) {
                println!("price for {id} updated");
                Ok(())
            } else {
                Err(anyhow!("price change for {id} rejected"))
            }
        }
    }
}

/// Run the standard pipeline synchronously; the CLI has nothing else to do
/// while it builds.
fn build_registry(config: &Config) -> Result<(Arc<PriceRegistry>, Arc<dyn ItemIndex>)> {
    let index: Arc<dyn ItemIndex> = Arc::new(
        FixedItemIndex::load(&config.catalog.items_file)
            .map_err(|e| anyhow!("items listing: {e}"))?,
    );
    let packs = Arc::new(PackSet::discover(
        config.packs.host_namespace.clone(),
        &config.packs.directory,
    ));
    let registry = Arc::new(PriceRegistry::new());
    RegistryBuilder::standard(Arc::clone(&registry), packs, &config.prices.directory).run();
    Ok((registry, index))
}

fn format_record(record: &PriceRecord) -> String {
    let side = |price: f64, prohibited: bool| {
        if prohibited {
            "-".to_string()
        } else {
            format!("{price:.2}")
        }
    };
    format!(
        "{}: buy {} / sell {} (±{}%)",
        record.id,
        side(record.buy, record.prohibit_buy),
        side(record.sell, record.prohibit_sell),
        record.fluctuation
    )
}

/// Create `config.toml` plus the directories and sample listings it points
/// at. Never overwrites an existing config.
fn init_workspace(config_path: &str) -> Result<()> {
    if Path::new(config_path).exists() {
        return Err(anyhow!("{config_path} already exists, refusing to overwrite"));
    }
    Config::create_default(config_path)?;
    let config = Config::load(config_path)?;

    std::fs::create_dir_all(&config.prices.directory)?;
    std::fs::create_dir_all(&config.packs.directory)?;
    if let Some(dir) = config.catalog.items_file.parent() {
        std::fs::create_dir_all(dir)?;
    }
    if !config.catalog.items_file.exists() {
        std::fs::write(&config.catalog.items_file, SAMPLE_ITEMS)?;
    }
    let sample_catalog = config.prices.directory.join("example_prices.json");
    if !sample_catalog.exists() {
        std::fs::write(&sample_catalog, SAMPLE_CATALOG)?;
    }

    println!("created {config_path} and data directories");
    Ok(())
}

const SAMPLE_ITEMS: &str = r#"{
  "core": {
    "gem": "item",
    "iron_ingot": "item",
    "gold_ingot": "item",
    "apple": "item",
    "bread": "item",
    "stone": "block",
    "oak_log": "block",
    "ender_relic": "item",
    "bedrock": "block",
    "grave_marker": "block",
    "coin": "currency",
    "banknote": "currency"
  }
}
"#;

const SAMPLE_CATALOG: &str = r#"{
  "metadata": { "load order": "last" },
  "core": {
    "gem": { "buy": 12, "sell": 4 }
  }
}
"#;

fn init_logging(config: &Option<Config>, verbosity: u8) {
    let mut builder = env_logger::Builder::new();
    // Base level from CLI verbosity overrides config
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|c| c.logging.level.parse().ok())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);
    let _ = builder.try_init();
}
