//! Core types for the Sam's Goods storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod contact;
pub mod email;
pub mod id;
pub mod options;
pub mod price;
pub mod status;

pub use contact::{ContactError, CustomerDetails, DEFAULT_COUNTRY, FieldError, VerifiedCustomer};
pub use email::{Email, EmailError};
pub use id::*;
pub use options::LineOptions;
pub use price::{CurrencyCode, Price};
pub use status::*;
