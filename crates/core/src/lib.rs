//! Orchard Core - Shared types library.
//!
//! This crate provides common types used across all Orchard components:
//! - `api` - The REST API server
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, money, roles, statuses, and the
//!   coupon discount policy

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
