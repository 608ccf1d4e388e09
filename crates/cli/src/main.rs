//! Sam's Goods CLI - browse the catalog, manage the cart and check out.
//!
//! # Usage
//!
//! ```bash
//! # Browse merch and beats
//! sg catalog products --category mugs
//! sg catalog beats --featured
//! sg catalog licenses
//!
//! # Fill the cart
//! sg cart add SAMO_001 --size M --color Black -q 2
//! sg cart add blood-season --license premium
//! sg cart show
//!
//! # Place the order
//! sg checkout --customer customer.yaml --method credit-card \
//!     --card-number "4242 4242 4242 4242" --expiry 12/29 --cvc 123
//! ```
//!
//! # Commands
//!
//! - `catalog` - List products, beats and license tiers
//! - `cart` - Show and change the persisted cart
//! - `checkout` - Pay for the cart and place the order
//! - `crypto` - Supported coins and payment status
//!
//! Configuration comes from `SAMS_GOODS_*` environment variables (see
//! `sams_goods_storefront::config`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand};
use sams_goods_core::LicenseTier;
use sams_goods_storefront::catalog::Selection;
use sams_goods_storefront::config::StorefrontConfig;
use sams_goods_storefront::error::Result;
use sams_goods_storefront::state::AppState;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::checkout::CheckoutArgs;

const DEFAULT_LOG_FILTER: &str = "sams_goods_storefront=info,sg=info";

#[derive(Parser)]
#[command(name = "sg")]
#[command(author, version, about = "Sam's Goods storefront CLI")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Show and change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Pay for the cart and place the order
    Checkout(CheckoutArgs),
    /// Crypto payment helpers
    Crypto {
        #[command(subcommand)]
        action: CryptoAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List merch products
    Products {
        /// Only products whose category contains this text
        #[arg(short, long)]
        category: Option<String>,

        /// Only featured products
        #[arg(long)]
        featured: bool,
    },
    /// List beats
    Beats {
        /// Only featured beats
        #[arg(long)]
        featured: bool,
    },
    /// Show license tiers and their terms
    Licenses,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart and its totals
    Show,
    /// Add a product or beat license
    Add {
        /// Product or beat id
        id: String,

        /// Number of units
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Set the quantity of a cart line (0 removes it)
    Update {
        /// Cart line id, or a beat id with --license
        id: String,

        quantity: u32,

        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Remove a cart line
    Remove {
        /// Cart line id, or a beat id with --license
        id: String,

        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum CryptoAction {
    /// List accepted coins
    Currencies,
    /// Check the status of a crypto payment
    Status {
        /// Payment id from the order confirmation
        payment_id: String,
    },
}

/// Product variant or beat license to act on.
#[derive(Args)]
struct SelectionArgs {
    /// Product size
    #[arg(long)]
    size: Option<String>,

    /// Product color
    #[arg(long)]
    color: Option<String>,

    /// Reference to an uploaded custom design
    #[arg(long)]
    custom_design: Option<String>,

    /// Beat license tier (basic, premium, exclusive)
    #[arg(long)]
    license: Option<LicenseTier>,
}

impl From<SelectionArgs> for Selection {
    fn from(args: SelectionArgs) -> Self {
        Self {
            size: args.size,
            color: args.color,
            custom_design: args.custom_design,
            license: args.license,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.log_json);

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(e.exit_code());
    }
}

/// Initialize tracing on stderr so command output stays clean.
///
/// Defaults to info level for our crates if `RUST_LOG` is not set.
fn init_tracing(json: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = StorefrontConfig::from_env()?;
    let state = AppState::new(config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Catalog { action } => match action {
            CatalogAction::Products { category, featured } => {
                commands::catalog::products(&state, category.as_deref(), featured, &mut out)?;
            }
            CatalogAction::Beats { featured } => {
                commands::catalog::beats(&state, featured, &mut out)?;
            }
            CatalogAction::Licenses => commands::catalog::licenses(&state, &mut out)?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&state, &mut out)?,
            CartAction::Add {
                id,
                quantity,
                selection,
            } => commands::cart::add(&state, &id, quantity, &selection.into(), &mut out)?,
            CartAction::Update {
                id,
                quantity,
                selection,
            } => commands::cart::update(&state, &id, quantity, &selection.into(), &mut out)?,
            CartAction::Remove { id, selection } => {
                commands::cart::remove(&state, &id, &selection.into(), &mut out)?;
            }
            CartAction::Clear => commands::cart::clear(&state, &mut out)?,
        },
        Commands::Checkout(args) => commands::checkout::run(&state, args, &mut out).await?,
        Commands::Crypto { action } => match action {
            CryptoAction::Currencies => commands::crypto::currencies(&mut out)?,
            CryptoAction::Status { payment_id } => {
                commands::crypto::status(&payment_id, &mut out)?;
            }
        },
    }
    Ok(())
}
