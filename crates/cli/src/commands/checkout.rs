//! Checkout command.
//!
//! # Usage
//!
//! ```bash
//! sg checkout --customer customer.yaml --method credit-card \
//!     --card-number "4242 4242 4242 4242" --expiry 12/29 --cvc 123
//! sg checkout --customer customer.yaml --method paypal
//! sg checkout --customer customer.yaml --method crypto --coin ETH
//! ```
//!
//! The customer file holds the checkout form fields:
//!
//! ```yaml
//! firstName: Sam
//! lastName: Goods
//! email: sam@example.com
//! phone: 555-123-4567
//! address: 1 Beat Street
//! city: Atlanta
//! state: GA
//! zipCode: "30301"
//! country: United States
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use sams_goods_core::{CurrencyCode, CustomerDetails, PaymentMethod};
use sams_goods_storefront::checkout::OrderConfirmation;
use sams_goods_storefront::error::{AppError, Result};
use sams_goods_storefront::payment::{CardDetails, PaymentDetails};
use sams_goods_storefront::state::AppState;

use super::money;

/// Arguments of `sg checkout`.
#[derive(Args)]
pub struct CheckoutArgs {
    /// YAML file with the customer's contact and shipping details
    #[arg(long)]
    pub customer: PathBuf,

    /// Payment method (credit-card, paypal, crypto)
    #[arg(short, long)]
    pub method: PaymentMethod,

    /// Card number (credit-card)
    #[arg(long)]
    pub card_number: Option<String>,

    /// Card expiry as MM/YY (credit-card)
    #[arg(long)]
    pub expiry: Option<String>,

    /// Card security code (credit-card)
    #[arg(long)]
    pub cvc: Option<String>,

    /// Name on the card; defaults to the customer's name (credit-card)
    #[arg(long)]
    pub cardholder: Option<String>,

    /// Approved `PayPal` order id; a new order is opened when omitted (paypal)
    #[arg(long)]
    pub paypal_order: Option<String>,

    /// Coin to pay with (crypto)
    #[arg(long, default_value = "BTC")]
    pub coin: String,
}

/// Pay for the cart and print the confirmation.
pub async fn run(state: &AppState, args: CheckoutArgs, out: &mut impl Write) -> Result<()> {
    let customer = load_customer(&args.customer)?;
    let payment = payment_details(args, &customer)?;

    if state.config().payment_delay.as_millis() > 0 {
        writeln!(out, "Processing payment...")?;
        out.flush()?;
    }

    let mut cart = state.open_cart()?;
    let order = state
        .checkout()
        .place_order(&mut cart, &customer, payment)
        .await?;

    render(&order, state.config().currency, out)
}

fn load_customer(path: &Path) -> Result<CustomerDetails> {
    let raw = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&raw).map_err(|e| {
        AppError::BadRequest(format!("invalid customer file {}: {e}", path.display()))
    })
}

fn payment_details(args: CheckoutArgs, customer: &CustomerDetails) -> Result<PaymentDetails> {
    match args.method {
        PaymentMethod::CreditCard => {
            let number = required(args.card_number, "--card-number")?;
            let expiry = required(args.expiry, "--expiry")?;
            let cvc = required(args.cvc, "--cvc")?;
            let cardholder = args.cardholder.unwrap_or_else(|| {
                format!("{} {}", customer.first_name.trim(), customer.last_name.trim())
            });
            Ok(PaymentDetails::Card(CardDetails::new(
                number, expiry, cvc, cardholder,
            )))
        }
        PaymentMethod::PayPal => Ok(PaymentDetails::PayPal {
            order_id: args.paypal_order,
        }),
        PaymentMethod::Crypto => Ok(PaymentDetails::Crypto { coin: args.coin }),
    }
}

fn required(value: Option<String>, flag: &str) -> Result<String> {
    value.ok_or_else(|| AppError::BadRequest(format!("{flag} is required for card payments")))
}

fn render(order: &OrderConfirmation, currency: CurrencyCode, out: &mut impl Write) -> Result<()> {
    let summary = &order.summary;
    let payment = &order.payment;

    writeln!(
        out,
        "Order {} placed. Thank you, {}!",
        order.order_number, order.customer.first_name
    )?;
    writeln!(out, "Confirmation sent to {}.", order.customer.email)?;
    writeln!(out)?;
    for line in &order.items {
        writeln!(
            out,
            "  {} x {}  {}",
            line.quantity,
            line.title,
            money(line.line_total(), currency)
        )?;
    }
    writeln!(out, "Subtotal: {}", money(summary.subtotal, currency))?;
    writeln!(out, "Shipping: {}", summary.shipping_label(currency))?;
    writeln!(out, "Total:    {}", money(summary.total, currency))?;
    writeln!(out)?;

    writeln!(out, "Payment {} via {}", payment.payment_id, payment.method)?;
    if let Some(last4) = &payment.last4 {
        writeln!(out, "  Card ending in {last4}")?;
    }
    if let Some(capture) = &payment.paypal {
        writeln!(
            out,
            "  PayPal order {} captured as {}",
            capture.order_id, capture.capture_id
        )?;
    }
    if let Some(quote) = &payment.crypto {
        writeln!(
            out,
            "  Send {} {} to {}",
            quote.amount, quote.currency, quote.payment_address
        )?;
        writeln!(out, "  Pay at {}", quote.payment_url)?;
        writeln!(out, "  Quote expires in {} minutes", quote.expires_in / 60)?;
    }
    Ok(())
}
