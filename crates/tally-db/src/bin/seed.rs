//! # Seed Data Generator
//!
//! Writes the sample catalog into a database file for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./tally_dev.db with the sample products and customers
//! cargo run -p tally-db --bin seed
//!
//! # Specify database path and key prefix
//! cargo run -p tally-db --bin seed -- --db ./data/tally.db --prefix shop_
//!
//! # Wipe existing documents first
//! cargo run -p tally-db --bin seed -- --reset
//! ```
//!
//! ## Generated Data
//! - 5 products across Nutrition, Energy and Digestive Health, one of them
//!   below its reorder threshold
//! - 3 customers
//! - Tier prices backfilled from each reference price with the default
//!   percentages

use chrono::Utc;
use std::env;
use tally_core::{Collection, Store, TierDefaults};
use tally_db::{Collections, Database, DbConfig, KeyValueStore, DEFAULT_KEY_PREFIX};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./tally_dev.db");
    let mut prefix = String::from(DEFAULT_KEY_PREFIX);
    let mut reset = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--prefix" | "-p" => {
                if i + 1 < args.len() {
                    prefix = args[i + 1].clone();
                    i += 1;
                }
            }
            "--reset" => reset = true,
            "--help" | "-h" => {
                println!("Tally POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>        Database file path (default: ./tally_dev.db)");
                println!("  -p, --prefix <PREFIX>  Storage key prefix (default: {DEFAULT_KEY_PREFIX})");
                println!("      --reset            Remove existing documents before seeding");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Tally POS Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Prefix:   {}", prefix);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let kv = db.kv_store();
    let collections = Collections::new(prefix);

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    if reset {
        for collection in Collection::ALL {
            kv.remove(&collections.key(collection)).await?;
        }
        println!("✓ Existing documents removed");
    }

    let defaults = TierDefaults::default();
    let mut store = collections
        .load_all(&kv, &defaults, Utc::now())
        .await
        .store;

    if !store.products().is_empty() && !store.customers().is_empty() {
        println!("⚠ Database already has {} products", store.products().len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Run with --reset to regenerate.");
        return Ok(());
    }

    let seeded = store.seed_sample_data(Utc::now());
    for collection in &seeded {
        collections.save(&kv, &store, *collection).await?;
    }

    println!();
    println!(
        "✓ Seeded {} products, {} customers",
        store.products().len(),
        store.customers().len()
    );
    print_catalog(&store);

    db.close().await;
    Ok(())
}

fn print_catalog(store: &Store) {
    println!();
    println!("{:<22} {:>8} {:>8} {:>8} {:>8} {:>8}", "Product", "MRP", "25%", "35%", "42%", "50%");
    for product in store.products() {
        let [t25, t35, t42, t50] = product.tiers.entries().map(|(_, price)| price.to_string());
        println!(
            "{:<22} {:>8} {:>8} {:>8} {:>8} {:>8}",
            product.name,
            product.reference_price.to_string(),
            t25,
            t35,
            t42,
            t50
        );
    }
}
