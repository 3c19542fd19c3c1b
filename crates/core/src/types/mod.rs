//! Shared domain types.

pub mod discount;
pub mod email;
pub mod id;
pub mod money;
pub mod role;
pub mod status;
pub mod tier;
pub mod timestamps;

pub use discount::DiscountType;
pub use email::{Email, EmailError};
pub use id::*;
pub use money::Money;
pub use role::{Permission, Role};
pub use status::OrderStatus;
pub use tier::Tier;
pub use timestamps::Timestamps;
