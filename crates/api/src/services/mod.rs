//! Business services.
//!
//! Services own the flows that span repositories: sign-up validation, the
//! cart pricing flow, and order materialization. Single-table CRUD is left
//! to the route handlers talking to repositories directly.

pub mod auth;
pub mod cart;
pub mod orders;
pub mod token;
