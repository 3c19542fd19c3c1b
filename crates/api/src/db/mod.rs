//! Database access for the Orchard API.
//!
//! One repository module per aggregate. Repositories borrow the [`PgPool`],
//! run their queries with the runtime sqlx API, and convert row types into
//! domain types at the boundary. Flows that span several aggregates
//! (checkout, cart mutation, notice broadcast) are composed by the service
//! layer from the `pub(crate)` connection-level functions these modules
//! export, inside a single transaction.
//!
//! # Tables
//!
//! - `users`, `carts`, `wishlists` - one cart/wishlist row per user
//! - `items`, `categories`, `category_items` - catalog
//! - `cart_items` - cart lines
//! - `coupons`, `user_coupons` - definitions and per-user grants
//! - `orders`, `order_items`, `order_details` - frozen purchases
//! - `reviews`, `inquiries`, `inquiry_responses`
//! - `notices`, `user_notices`, `wish_items`
//!
//! # Migrations
//!
//! Migrations live in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p orchard-cli -- migrate
//! ```

pub mod carts;
pub mod categories;
pub mod coupons;
pub mod inquiries;
pub mod items;
pub mod notices;
pub mod orders;
pub mod reviews;
pub mod users;
pub mod wishlists;

use std::str::FromStr;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use carts::CartRepository;
pub use categories::CategoryRepository;
pub use coupons::CouponRepository;
pub use inquiries::InquiryRepository;
pub use items::ItemRepository;
pub use notices::NoticeRepository;
pub use orders::OrderRepository;
pub use reviews::ReviewRepository;
pub use users::UserRepository;
pub use wishlists::WishlistRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email, insufficient stock).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Parse a TEXT-encoded enum column, mapping failures to `DataCorruption`.
pub(crate) fn parse_column<T>(value: &str, column: &str) -> Result<T, RepositoryError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid {column} in database: {e}"))
    })
}

/// Map a sqlx error to `Conflict` when it is a unique violation.
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(err)
}
