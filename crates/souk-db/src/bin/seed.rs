//! # Seed Data Generator
//!
//! Writes the built-in dataset plus generated products to a snapshot slot,
//! for development and demos.
//!
//! ## Usage
//! ```bash
//! # Built-in data + 200 generated products into the configured slot
//! cargo run -p souk-db --bin seed
//!
//! # Custom amount, database and slot
//! cargo run -p souk-db --bin seed -- --products 1000 --db ./souk_dev.db --slot demo
//!
//! # Overwrite an existing slot
//! cargo run -p souk-db --bin seed -- --force
//! ```
//!
//! ## Generated Products
//! Spread across every [`ProductCategory`], each with:
//! - Unique SKU: `{CATEGORY}-{INDEX}`
//! - Price 20.00 - 519.00 EGP, cost 60-79% of price
//! - Stock 0 - 100, minimum stock 5 - 14

use souk_core::{
    Clock, Money, NewProduct, ProductCategory, SequentialIds, Store, StoreState, SystemClock,
};
use souk_db::{AppConfig, Database};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Item names per category.
const CATALOG: &[(ProductCategory, &str, &[&str])] = &[
    (
        ProductCategory::SafetyEquipment,
        "SAF",
        &[
            "نظارة واقية",
            "سترة عاكسة",
            "كمامة غبار",
            "سدادات أذن",
            "حزام أمان",
            "واقي وجه",
        ],
    ),
    (
        ProductCategory::TradingSupplies,
        "TRD",
        &["شريط تحذيري", "أكياس تعبئة", "لفافة تغليف", "صناديق كرتون"],
    ),
    (
        ProductCategory::Tools,
        "TLS",
        &["مفك براغي", "مطرقة", "شريط قياس", "كماشة", "منشار يدوي"],
    ),
    (
        ProductCategory::Consumables,
        "CNS",
        &["بطاريات", "شريط لاصق", "مسامير", "قفازات نايلون"],
    ),
];

const SIZES: &[&str] = &["صغير", "وسط", "كبير"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,souk=debug,sqlx=warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path: Option<PathBuf> = None;
    let mut slot: Option<String> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut force = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-p" | "--products" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "-d" | "--db" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "-s" | "--slot" => {
                if i + 1 < args.len() {
                    slot = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "-c" | "--config" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "-f" | "--force" => force = true,
            "-h" | "--help" => {
                println!("Souk POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -p, --products <N>   Generated products on top of the built-in data (default: 200)");
                println!("  -d, --db <PATH>      Database file path (default: from souk.toml)");
                println!("  -s, --slot <NAME>    Snapshot slot (default: pos-store)");
                println!("  -c, --config <PATH>  Config file (default: platform config dir)");
                println!("  -f, --force          Overwrite an existing slot");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            other => eprintln!("Ignoring unknown argument: {}", other),
        }
        i += 1;
    }

    let mut config = AppConfig::load(config_path)?;
    if let Some(path) = db_path {
        config.database.path = Some(path);
    }
    if let Some(slot) = slot {
        config.store.slot = slot;
    }
    let db_config = config.db_config()?;

    println!("🌱 Souk POS Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_config.database_path.display());
    println!("Slot:     {}", config.store.slot);
    println!("Products: {}", count);
    println!();

    let db = Database::new(db_config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let snapshots = db.snapshots();
    if snapshots.exists(&config.store.slot).await? && !force {
        println!("⚠ Slot '{}' already holds a store", config.store.slot);
        println!("  Skipping seed to avoid overwriting it.");
        println!("  Pass --force to replace it.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let start = std::time::Instant::now();
    let clock = SystemClock;
    let mut store = Store::new(StoreState::builtin(clock.now()), SequentialIds::new(), clock);

    let mut generated = 0;
    for seed in 0..count {
        let draft = generate_product(seed);
        if let Err(e) = store.add_product(draft) {
            eprintln!("Failed to add product #{}: {}", seed, e);
            continue;
        }

        generated += 1;
        if generated % 100 == 0 {
            println!("  Generated {} products...", generated);
        }
    }

    snapshots.save(&config.store.slot, store.state()).await?;

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);
    println!("  Low stock: {}", store.low_stock_products().len());
    println!("  Inventory value: {}", souk_core::reports::inventory_value(store.state()));

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Deterministic product number `seed`.
fn generate_product(seed: usize) -> NewProduct {
    let (category, code, names) = CATALOG[seed % CATALOG.len()];
    let name = names[(seed / CATALOG.len()) % names.len()];
    let size = SIZES[seed % SIZES.len()];

    let price_cents = 2_000 + ((seed * 37) % 500) as i64 * 100;
    let cost_pct = 60 + (seed % 20) as i64;
    let stock = (seed % 101) as i64;
    let min_stock = 5 + (seed % 10) as i64;

    NewProduct::new(
        format!("{} {} #{}", name, size, seed + 1),
        category,
        Money::from_cents(price_cents),
    )
    .with_sku(format!("{}-{:05}", code, seed + 1))
    .with_cost(Money::from_cents(price_cents * cost_pct / 100))
    .with_stock(stock, min_stock)
    .with_supplier("مورد التجربة")
}
