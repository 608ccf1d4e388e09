//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! sg cart add SAMO_001 --size M --color Black
//! sg cart add blood-season --license exclusive
//! sg cart update SAMO_001 3
//! sg cart remove blood-season --license exclusive
//! sg cart show
//! sg cart clear
//! ```
//!
//! Lines are addressed by id. When an id has several lines (the same tee in
//! two sizes), `--size`, `--color` or `--custom-design` picks one. A beat id
//! with `--license` addresses that license's line.

use std::io::Write;

use sams_goods_core::LineOptions;
use sams_goods_storefront::cart::{CartStorage, CartStore};
use sams_goods_storefront::catalog::{Catalog, Selection};
use sams_goods_storefront::error::{AppError, Result};
use sams_goods_storefront::state::AppState;

use super::money;

/// Show the cart with totals.
pub fn show(state: &AppState, out: &mut impl Write) -> Result<()> {
    let cart = state.open_cart()?;
    render(state, &cart, out)
}

/// Add a product variant or beat license.
pub fn add(
    state: &AppState,
    id: &str,
    quantity: u32,
    selection: &Selection,
    out: &mut impl Write,
) -> Result<()> {
    let (item, options) = state.catalog().cart_entry(id, selection)?;
    let mut cart = state.open_cart()?;
    cart.add_item(&item, quantity, options.clone())?;

    let added = cart.find(&item.id, &options).map_or(0, |line| line.quantity);
    writeln!(
        out,
        "Added {} to your cart ({added} in cart).",
        describe(&item.title, &options)
    )?;
    writeln!(out, "Cart: {} items", cart.item_count())?;
    Ok(())
}

/// Set the quantity of a line; zero removes it.
pub fn update(
    state: &AppState,
    id: &str,
    quantity: u32,
    selection: &Selection,
    out: &mut impl Write,
) -> Result<()> {
    let mut cart = state.open_cart()?;
    let (line_id, options) = resolve_line(&cart, state.catalog(), id, selection)?;
    cart.update_quantity(&line_id, quantity, &options)?;

    if quantity == 0 {
        writeln!(out, "Removed {line_id} from your cart.")?;
    } else {
        writeln!(out, "Updated {line_id} to {quantity}.")?;
    }
    writeln!(out, "Cart: {} items", cart.item_count())?;
    Ok(())
}

/// Remove a line.
pub fn remove(
    state: &AppState,
    id: &str,
    selection: &Selection,
    out: &mut impl Write,
) -> Result<()> {
    let mut cart = state.open_cart()?;
    let (line_id, options) = resolve_line(&cart, state.catalog(), id, selection)?;
    cart.remove_item(&line_id, &options)?;

    writeln!(out, "Removed {line_id} from your cart.")?;
    writeln!(out, "Cart: {} items", cart.item_count())?;
    Ok(())
}

/// Empty the cart.
pub fn clear(state: &AppState, out: &mut impl Write) -> Result<()> {
    let mut cart = state.open_cart()?;
    cart.clear()?;
    writeln!(out, "Cart cleared.")?;
    Ok(())
}

fn describe(title: &str, options: &LineOptions) -> String {
    let summary = options.summary();
    if summary.is_empty() {
        title.to_string()
    } else {
        format!("{title} ({summary})")
    }
}

/// Find the single cart line addressed by `id` and the selection.
fn resolve_line<S: CartStorage>(
    cart: &CartStore<S>,
    catalog: &Catalog,
    id: &str,
    selection: &Selection,
) -> Result<(String, LineOptions)> {
    let line_id = catalog.beat(id).map_or_else(
        |_| id.to_string(),
        |beat| beat.line_id(selection.license.unwrap_or_default()),
    );
    let wanted = [
        ("size", selection.size.as_deref()),
        ("color", selection.color.as_deref()),
        ("customDesign", selection.custom_design.as_deref()),
    ];

    let mut lines = cart.items().iter().filter(|line| {
        line.id == line_id
            && wanted.iter().all(|(key, value)| {
                value.is_none_or(|v| {
                    line.options
                        .get_str(key)
                        .is_some_and(|o| o.eq_ignore_ascii_case(v))
                })
            })
    });

    match (lines.next(), lines.next()) {
        (Some(line), None) => Ok((line.id.clone(), line.options.clone())),
        (None, _) => Err(AppError::NotFound(format!("no cart line for {line_id}"))),
        (Some(_), Some(_)) => Err(AppError::BadRequest(format!(
            "{line_id} has several lines in the cart; pick one with --size, --color or --custom-design"
        ))),
    }
}

fn render<S: CartStorage>(
    state: &AppState,
    cart: &CartStore<S>,
    out: &mut impl Write,
) -> Result<()> {
    if cart.is_empty() {
        writeln!(out, "Your cart is empty.")?;
        return Ok(());
    }

    let currency = state.config().currency;
    let shipping = state.checkout().shipping();

    writeln!(out, "Cart ({} items)", cart.item_count())?;
    for line in cart.items() {
        writeln!(
            out,
            "  {}  {}  {} x {} = {}",
            line.id,
            describe(&line.title, &line.options),
            line.quantity,
            money(line.price, currency),
            money(line.line_total(), currency)
        )?;
    }

    let summary = cart.summary(shipping);
    writeln!(out)?;
    writeln!(out, "Subtotal: {}", money(summary.subtotal, currency))?;
    writeln!(out, "Shipping: {}", summary.shipping_label(currency))?;
    writeln!(out, "Total:    {}", money(summary.total, currency))?;
    if let Some(remaining) = shipping.remaining_for_free_shipping(summary.subtotal) {
        writeln!(
            out,
            "Add {} more for free shipping.",
            money(remaining, currency)
        )?;
    }
    Ok(())
}
