//! Sam's Goods storefront library.
//!
//! Cart store, catalog, simulated payments and checkout for the Sam's Goods
//! merch and beat-licensing store. Front ends such as the `sg` CLI build an
//! [`state::AppState`] from [`config::StorefrontConfig`] and work through it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod payment;
pub mod state;
