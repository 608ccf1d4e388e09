//! Sam's Goods Core - Shared types library.
//!
//! This crate provides common types used across the Sam's Goods components:
//! - `storefront` - Cart store, catalog, checkout and simulated payments
//! - `cli` - The `sg` command-line storefront
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no
//! payment simulation. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, line options,
//!   contact details and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use rust_decimal::Decimal;
pub use types::*;
