//! # Seed Data Generator
//!
//! Populates a development database with the baseline policy set: one fee
//! rule per platform, the Korean import tax policy, and a bootstrap USD→KRW
//! rate (the sync job replaces it with official daily rates).
//!
//! ## Usage
//! ```bash
//! # Seed the default dev database
//! cargo run -p relist-db --bin seed
//!
//! # Specify database path and bootstrap FX rate
//! cargo run -p relist-db --bin seed -- --db ./data/relist.db --fx 1342.5
//! ```

use chrono::Utc;
use std::env;

use relist_core::{
    FeeKind, FeeSchedule, ImportTaxPolicy, Money, Platform, Rate, IMPORT_TAX_POLICY_KEY,
};
use relist_db::{Database, DbConfig};

/// Baseline fee rules: (platform, rate in bps, per-unit shipping in won).
const PLATFORM_FEES: &[(Platform, u32, i64)] = &[
    (Platform::Kream, 550, 3_000),
    (Platform::Stockx, 1_000, 0),
    (Platform::Soldout, 600, 3_000),
    (Platform::Smartstore, 500, 2_500),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./relist_dev.db");
    let mut fx_rate: f64 = 1350.0;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--fx" | "-f" => {
                if i + 1 < args.len() {
                    fx_rate = args[i + 1].parse().unwrap_or(1350.0);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("relist Policy Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./relist_dev.db)");
                println!("  -f, --fx <RATE>    Bootstrap USD→KRW rate (default: 1350.0)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 relist Policy Seeder");
    println!("=======================");
    println!("Database: {}", db_path);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check for existing policy data
    let existing: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM platform_fee_rules WHERE is_active = 1")
            .fetch_one(db.pool())
            .await?;
    if existing > 0 {
        println!("⚠ Database already has {} active fee rules", existing);
        println!("  Skipping seed to avoid clobbering published versions.");
        println!("  Use the admin publish path to roll new versions.");
        return Ok(());
    }

    // Fee rules
    println!();
    println!("Seeding fee rules...");
    for (platform, rate_bps, shipping_won) in PLATFORM_FEES {
        let schedule = FeeSchedule {
            platform: *platform,
            kind: FeeKind::Percentage {
                rate: Rate::from_bps(*rate_bps),
            },
            shipping_fee: Money::from_won(*shipping_won),
            version: "v1".to_string(),
        };
        db.fee_rules().publish(&schedule).await?;
        println!(
            "  {} → {:.2}% fee, ₩{} shipping",
            platform,
            Rate::from_bps(*rate_bps).percentage(),
            shipping_won
        );
    }

    // Import tax policy
    println!();
    println!("Seeding import tax policy...");
    let tax = ImportTaxPolicy {
        duty_rate: Rate::from_bps(1_300),
        vat_rate: Rate::from_bps(1_000),
        duty_free_limit: 150.0,
        combined_risk_multiplier: 1.0,
        policy_key: IMPORT_TAX_POLICY_KEY.to_string(),
        version: "v1".to_string(),
    };
    db.tax_policies().publish(&tax).await?;
    println!("  {} → 13% duty, 10% VAT, $150 threshold", IMPORT_TAX_POLICY_KEY);

    // Bootstrap FX rate
    println!();
    println!("Seeding bootstrap FX rate...");
    db.fx_rates()
        .insert("USD", "KRW", fx_rate, Utc::now(), "customs_service")
        .await?;
    println!("  USD→KRW {} (customs_service)", fx_rate);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
