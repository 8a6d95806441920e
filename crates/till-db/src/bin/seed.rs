//! # Seed Data Generator
//!
//! Populates a till database with a grocery catalogue and a stocked cash
//! drawer for development.
//!
//! ## Usage
//! ```bash
//! # 500 products (default), 20 of every note and coin
//! cargo run -p till-db --bin seed
//!
//! # Custom amounts
//! cargo run -p till-db --bin seed -- --count 50 --till 5
//!
//! # Specify database path
//! cargo run -p till-db --bin seed -- --db ./data/till.db
//! ```
//!
//! ## Generated Products
//! Categories: staples, dairy, beverages, snacks, household.
//!
//! Each product has:
//! - Unique code: `{CATEGORY}-{ITEM}-{INDEX}`
//! - Pack size in the name
//! - Price: ₹10.00 - ₹509.50 plus a pack-size addon
//! - Stock: 0 - 100
//! - GST slab: 0%, 5%, 12%, 18%, 28%

use std::env;
use till_core::{Money, Product, TaxRate, STANDARD_DENOMINATIONS};
use till_db::{new_product, Database, DbConfig};

/// Product categories for realistic test data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "STP",
        &[
            "Basmati Rice",
            "Sona Masoori Rice",
            "Whole Wheat Atta",
            "Toor Dal",
            "Moong Dal",
            "Chana Dal",
            "Rajma",
            "Besan",
            "Sugar",
            "Iodised Salt",
        ],
    ),
    (
        "DRY",
        &[
            "Toned Milk",
            "Full Cream Milk",
            "Curd",
            "Paneer",
            "Butter",
            "Ghee",
            "Buttermilk",
            "Cheese Slices",
        ],
    ),
    (
        "BEV",
        &[
            "Assam Tea",
            "Filter Coffee",
            "Mango Drink",
            "Lemon Soda",
            "Coconut Water",
            "Packaged Water",
        ],
    ),
    (
        "SNK",
        &[
            "Bhujia",
            "Masala Peanuts",
            "Potato Chips",
            "Glucose Biscuits",
            "Rusk",
            "Chakli",
        ],
    ),
    (
        "HSE",
        &[
            "Detergent Powder",
            "Dishwash Bar",
            "Floor Cleaner",
            "Bath Soap",
            "Toothpaste",
        ],
    ),
];

/// Pack sizes and their price addon in paise
const SIZES: &[(&str, i64)] = &[
    ("200g", 0),
    ("500g", 2_500),
    ("1kg", 6_000),
    ("5kg", 25_000),
    ("Family Pack", 12_000),
];

/// GST slabs in basis points
const TAX_RATES: &[u32] = &[0, 500, 1200, 1800, 2800];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 500;
    let mut till_count: i64 = 20;
    let mut db_path = String::from("./till_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(500);
                    i += 1;
                }
            }
            "--till" | "-t" => {
                if i + 1 < args.len() {
                    till_count = args[i + 1].parse().unwrap_or(20);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Till Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 500)");
                println!("  -t, --till <N>     Count of each denomination (default: 20)");
                println!("  -d, --db <PATH>    Database file path (default: ./till_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Till Seed Data Generator");
    println!("===========================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Till first: it is cheap to re-run and never duplicates
    let till = db.denominations();
    till.register(&STANDARD_DENOMINATIONS).await?;
    for value in STANDARD_DENOMINATIONS {
        till.set_count(value, till_count).await?;
    }
    println!(
        "✓ Till stocked: {} × each of {:?}",
        till_count, STANDARD_DENOMINATIONS
    );

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping catalogue to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let mut generated = 0;
    let start = std::time::Instant::now();

    'outer: for (category_idx, (category_code, products)) in CATEGORIES.iter().enumerate() {
        for (product_idx, product_name) in products.iter().enumerate() {
            for (size_idx, (size_name, price_addon)) in SIZES.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }

                let product = generate_product(
                    category_code,
                    product_name,
                    size_name,
                    *price_addon,
                    category_idx * 1000 + product_idx * 20 + size_idx,
                );

                if let Err(e) = db.products().insert(&product).await {
                    eprintln!("Failed to insert {}: {}", product.code, e);
                    continue;
                }

                generated += 1;

                if generated % 100 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);

    let sample = db.products().list(3).await?;
    for product in &sample {
        println!(
            "  {:<20} ₹{:>9} @ {}",
            product.code,
            product.unit_price().to_string(),
            product.tax_rate()
        );
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product with realistic data.
fn generate_product(
    category: &str,
    name: &str,
    size: &str,
    price_addon: i64,
    seed: usize,
) -> Product {
    let item: String = name
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .take(4)
        .collect::<String>()
        .to_uppercase();
    let code = format!("{}-{}-{:04}", category, item, seed);

    // ₹10.00 - ₹509.50 in 50 paise steps, plus size addon
    let base_paise = 1_000 + ((seed * 37) % 1_000) as i64 * 50;
    let price = Money::from_paise(base_paise + price_addon);

    let tax_rate = TaxRate::from_bps(TAX_RATES[seed % TAX_RATES.len()]);
    let stock = (seed % 101) as i64;

    new_product(&code, &format!("{} {}", name, size), price, tax_rate, stock)
}
