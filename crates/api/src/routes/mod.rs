//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (database ping)
//!
//! # Auth
//! POST /api/auth/signup             - Register
//! POST /api/auth/login              - Login, returns token pair
//! POST /api/auth/refresh            - Exchange refresh token for a new pair
//!
//! # Users
//! GET   /api/users/me               - Current profile
//! PATCH /api/users/me               - Update name/nickname
//! PATCH /api/users/me/password      - Change password
//! GET    /api/admin/users           - List users (admin)
//! PATCH  /api/admin/users/{id}/tier - Set tier/points (admin)
//! DELETE /api/admin/users/{id}      - Delete user (super admin)
//!
//! # Catalog
//! GET  /api/items                   - Valid items, paginated
//! GET  /api/items/search            - Search by name/keyword
//! GET  /api/items/{id}              - One item
//! POST   /api/admin/items           - Create item (admin)
//! GET    /api/admin/items           - All items incl. invalidated (admin)
//! PATCH  /api/admin/items/{id}      - Update item (admin)
//! DELETE /api/admin/items/{id}      - Delete item (admin)
//! GET  /api/categories              - All categories
//! GET  /api/categories/{id}/items   - Items in a category
//! POST   /api/admin/categories                    - Create category (admin)
//! PATCH  /api/admin/categories/{id}               - Update category (admin)
//! DELETE /api/admin/categories/{id}               - Delete category (admin)
//! POST   /api/admin/categories/{id}/items/{item}  - Attach item (admin)
//! DELETE /api/admin/categories/{id}/items/{item}  - Detach item (admin)
//!
//! # Cart
//! GET    /api/users/me/cart            - Cart with lines and total
//! POST   /api/users/me/cart/{itemId}   - Add item / increment line
//! PATCH  /api/users/me/cart/{itemId}   - Set line quantity
//! DELETE /api/users/me/cart/{itemId}   - Remove line
//!
//! # Coupons
//! GET  /api/users/me/coupons                          - Own coupons
//! POST   /api/admin/coupons                           - Create coupon (admin)
//! GET    /api/admin/coupons                           - List coupons (admin)
//! DELETE /api/admin/coupons/{id}                      - Delete coupon (admin)
//! POST /api/admin/coupons/{id}/distribute/{userId}    - Grant to one user (admin)
//! POST /api/admin/coupons/{id}/distribute-all         - Grant to all users (admin)
//!
//! # Orders
//! POST /api/orders                  - Checkout the cart
//! GET  /api/orders                  - Own orders, paginated
//! GET  /api/orders/{id}             - One order with lines and details
//! POST /api/orders/{id}/cancel      - Cancel a pending order
//! PATCH /api/admin/orders/{id}/status - Advance fulfillment status (admin)
//!
//! # Reviews
//! POST /api/items/{id}/reviews      - Review an item
//! GET  /api/items/{id}/reviews      - An item's reviews, paginated
//! PATCH  /api/reviews/{id}          - Edit own review
//! DELETE /api/reviews/{id}          - Delete own review
//!
//! # Inquiries
//! POST /api/items/{id}/inquiries    - Ask about an item
//! GET  /api/inquiries               - Own inquiries, paginated
//! GET  /api/inquiries/{id}          - One inquiry (owner or admin)
//! GET  /api/admin/inquiries         - All inquiries (admin)
//! POST /api/admin/inquiries/{id}/response - Respond and resolve (admin)
//!
//! # Notices
//! GET  /api/notices                 - Own notices, paginated
//! POST /api/notices/{id}/read       - Mark one read
//! POST   /api/admin/notices         - Broadcast a notice (admin)
//! GET    /api/admin/notices         - List notices (admin)
//! DELETE /api/admin/notices/{id}    - Delete a notice (admin)
//!
//! # Wishlist
//! GET    /api/users/me/wishlist            - Own wishlist
//! POST   /api/users/me/wishlist/{itemId}   - Add item
//! DELETE /api/users/me/wishlist/{itemId}   - Remove item
//! ```

pub mod auth;
pub mod cart;
pub mod categories;
pub mod coupons;
pub mod inquiries;
pub mod items;
pub mod notices;
pub mod orders;
pub mod reviews;
pub mod users;
pub mod wishlist;

use axum::Router;

use crate::state::AppState;

/// Assemble the full API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(users::router())
        .merge(items::router())
        .merge(categories::router())
        .merge(cart::router())
        .merge(coupons::router())
        .merge(orders::router())
        .merge(reviews::router())
        .merge(inquiries::router())
        .merge(notices::router())
        .merge(wishlist::router())
}
