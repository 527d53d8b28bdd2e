//! # Seed Data Generator
//!
//! Populates the database with development data: default staff accounts,
//! settings, and a small catalog.
//!
//! ## Usage
//! ```bash
//! cargo run -p shopfront-db --bin seed
//! cargo run -p shopfront-db --bin seed -- --db ./data/shopfront.db
//! ```
//!
//! ## Default Accounts
//! | username | password    | role    |
//! |----------|-------------|---------|
//! | admin    | admin123    | admin   |
//! | manager  | manager123  | manager |
//! | cashier  | cashier123  | cashier |

use std::env;

use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
use argon2::Argon2;

use shopfront_core::Role;
use shopfront_db::repository::product::NewProduct;
use shopfront_db::{Database, DbConfig, NewUser};

const CATALOG: &[(&str, &[(&str, &str, i64, i64, i64)])] = &[
    // (category, [(name, sku, cost cents, price cents, stock)])
    (
        "Beverages",
        &[
            ("Coca-Cola 330ml", "BEV-COKE-330", 80, 150, 120),
            ("Pepsi 330ml", "BEV-PEPSI-330", 75, 140, 90),
            ("Orange Juice 1L", "BEV-OJ-1000", 320, 550, 40),
            ("Drinking Water 500ml", "BEV-WATER-500", 25, 60, 200),
        ],
    ),
    (
        "Snacks",
        &[
            ("Potato Chips 100g", "SNK-CHIPS-100", 110, 220, 80),
            ("Chocolate Bar 45g", "SNK-CHOC-45", 90, 180, 150),
            ("Salted Peanuts 200g", "SNK-NUTS-200", 160, 300, 60),
        ],
    ),
    (
        "Grocery",
        &[
            ("White Rice 1kg", "GRC-RICE-1000", 180, 260, 100),
            ("Red Lentils 500g", "GRC-DHAL-500", 140, 210, 70),
            ("Sunflower Oil 1L", "GRC-OIL-1000", 620, 850, 30),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let db_path = parse_db_path().unwrap_or_else(|| "./shopfront.db".to_string());

    println!("Seeding database at {db_path}");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    db.settings().ensure_defaults().await?;

    for (username, password, full_name, role) in [
        ("admin", "admin123", "Shop Administrator", Role::Admin),
        ("manager", "manager123", "Floor Manager", Role::Manager),
        ("cashier", "cashier123", "Till Cashier", Role::Cashier),
    ] {
        if db.users().find_by_username(username).await?.is_some() {
            println!("  user {username} already exists, skipping");
            continue;
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| format!("hashing failed: {e}"))?
            .to_string();

        db.users()
            .insert(NewUser {
                username: username.to_string(),
                password_hash,
                full_name: full_name.to_string(),
                role,
            })
            .await?;
        println!("  created {role:?} account: {username}");
    }

    if db
        .products()
        .count(shopfront_db::Visibility::IncludeInactive)
        .await?
        > 0
    {
        println!("  catalog already seeded, skipping");
        println!("Seed complete");
        return Ok(());
    }

    let supplier = db
        .suppliers()
        .insert("Lanka Wholesale Traders", Some("N. Fernando"), Some("+94 11 234 5678"), None)
        .await?;

    for (category_name, products) in CATALOG {
        let category = db.categories().insert(category_name, None).await?;
        for (name, sku, cost, price, stock) in *products {
            db.products()
                .insert(NewProduct {
                    name: name.to_string(),
                    sku: sku.to_string(),
                    barcode: None,
                    description: None,
                    cost_price_cents: *cost,
                    selling_price_cents: *price,
                    stock_quantity: *stock,
                    reorder_level: 10,
                    category_id: Some(category.id.clone()),
                    supplier_id: Some(supplier.id.clone()),
                })
                .await?;
        }
        println!("  created category {category_name} with {} products", products.len());
    }

    println!("Seed complete");
    Ok(())
}

/// Accepts `--db <path>` anywhere in the argument list.
fn parse_db_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1))
        .cloned()
}
