//! Seed the catalog with sample data for local development.

use rust_decimal::Decimal;

use super::CommandError;

/// Sample items: name, description, price, stock, keywords.
const ITEMS: &[(&str, &str, i64, i32, &[&str])] = &[
    (
        "Ceramic Mug",
        "Stoneware mug, 350ml",
        1500,
        120,
        &["kitchen", "mug"],
    ),
    (
        "Walnut Cutting Board",
        "End-grain walnut board",
        6400,
        35,
        &["kitchen", "wood"],
    ),
    (
        "Linen Apron",
        "Washed linen, one size",
        4200,
        50,
        &["kitchen", "apparel"],
    ),
    (
        "Pour-over Kettle",
        "Gooseneck kettle, 1L",
        8900,
        20,
        &["coffee", "kitchen"],
    ),
    (
        "Canvas Tote",
        "Heavy canvas tote bag",
        2800,
        80,
        &["apparel", "bag"],
    ),
];

const CATEGORIES: &[(&str, &str)] = &[
    ("Kitchen", "Everything for the kitchen"),
    ("Apparel", "Wearables and accessories"),
];

/// Insert sample categories and items. Safe to run once on a fresh database.
///
/// # Errors
///
/// Returns `CommandError::Database` if any insert fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;
    let mut tx = pool.begin().await?;

    for (name, description) in CATEGORIES {
        sqlx::query(
            "INSERT INTO categories (name, description)
             VALUES ($1, $2)
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(name)
        .bind(description)
        .execute(&mut *tx)
        .await?;
    }

    for (name, description, price_cents, stock, keywords) in ITEMS {
        let keywords: Vec<String> = keywords.iter().map(ToString::to_string).collect();
        sqlx::query(
            "INSERT INTO items (name, description, price, stock, keywords)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(name)
        .bind(description)
        .bind(Decimal::new(*price_cents, 2))
        .bind(stock)
        .bind(&keywords)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        items = ITEMS.len(),
        categories = CATEGORIES.len(),
        "seed data inserted"
    );
    Ok(())
}
