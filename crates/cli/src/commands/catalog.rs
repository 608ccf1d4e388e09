//! Catalog listing commands.
//!
//! # Usage
//!
//! ```bash
//! sg catalog products --category "t-shirts" --featured
//! sg catalog beats
//! sg catalog licenses
//! ```

use std::io::Write;

use sams_goods_storefront::catalog::{Beat, Product};
use sams_goods_storefront::error::Result;
use sams_goods_storefront::state::AppState;

use super::money;

/// List products, optionally narrowed to a category and to featured items.
pub fn products(
    state: &AppState,
    category: Option<&str>,
    featured_only: bool,
    out: &mut impl Write,
) -> Result<()> {
    let currency = state.config().currency;
    let products: Vec<&Product> = state
        .catalog()
        .products_by_category(category.unwrap_or_default())
        .filter(|p| !featured_only || p.featured)
        .collect();

    if products.is_empty() {
        writeln!(out, "No products found.")?;
        return Ok(());
    }

    for product in products {
        let marker = if product.featured { " *" } else { "" };
        writeln!(
            out,
            "{:<10} {:>8}  {}{marker}",
            product.id,
            money(product.price, currency),
            product.title
        )?;
        writeln!(out, "           {}", product.category)?;
        if !product.sizes.is_empty() {
            writeln!(out, "           sizes: {}", product.sizes.join(", "))?;
        }
        if !product.colors.is_empty() {
            writeln!(out, "           colors: {}", product.colors.join(", "))?;
        }
        if product.sold_out() {
            writeln!(out, "           sold out")?;
        }
    }
    Ok(())
}

/// List beats with tempo, key and vibe.
pub fn beats(state: &AppState, featured_only: bool, out: &mut impl Write) -> Result<()> {
    let beats: Vec<&Beat> = state
        .catalog()
        .beats()
        .iter()
        .filter(|b| !featured_only || b.featured)
        .collect();

    if beats.is_empty() {
        writeln!(out, "No beats found.")?;
        return Ok(());
    }

    for beat in beats {
        let marker = if beat.featured { " *" } else { "" };
        writeln!(out, "{:<16} {}{marker}", beat.id, beat.title)?;
        writeln!(
            out,
            "                 {} BPM, {}, {} / {}, {}",
            beat.bpm, beat.key, beat.genre, beat.mood, beat.duration
        )?;
    }
    Ok(())
}

/// Show license tiers with price and terms.
pub fn licenses(state: &AppState, out: &mut impl Write) -> Result<()> {
    let currency = state.config().currency;
    for (tier, terms) in state.catalog().licenses() {
        writeln!(
            out,
            "{} ({tier}) - {}",
            terms.name,
            money(terms.price, currency)
        )?;
        for feature in &terms.features {
            writeln!(out, "  - {feature}")?;
        }
    }
    Ok(())
}
