//! Command-line surface of the register.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use till_core::{CustomerInfo, PaymentMethod};

/// Till register - promotion pricing and checkout
#[derive(Debug, Parser)]
#[command(name = "till-checkout")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (defaults to till.toml in the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Price a cart snapshot and print the pricing as JSON
    Price(CartArgs),

    /// Finalize a cart snapshot into an order draft
    Checkout(CheckoutArgs),

    /// Run an interactive register session
    Session(SessionArgs),
}

/// Snapshot files shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct SnapshotArgs {
    /// Loyalty program snapshot (JSON)
    #[arg(long, value_name = "FILE")]
    pub catalog: PathBuf,

    /// Product snapshot (JSON)
    #[arg(long, value_name = "FILE")]
    pub products: PathBuf,
}

/// Arguments for the price and checkout commands
#[derive(Debug, Clone, Args)]
pub struct CartArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    /// Cart snapshot (JSON)
    #[arg(long, value_name = "FILE")]
    pub cart: PathBuf,

    /// Promotion choice for a conflicted trigger, as TRIGGER=PROGRAM
    #[arg(long = "select", value_name = "TRIGGER=PROGRAM", value_parser = parse_selection)]
    pub selections: Vec<(String, String)>,
}

/// Arguments for the checkout command
#[derive(Debug, Clone, Args)]
pub struct CheckoutArgs {
    #[command(flatten)]
    pub cart: CartArgs,

    /// How the customer paid: cash or card
    #[arg(long, value_name = "METHOD", default_value = "cash")]
    pub payment: PaymentMethod,

    /// Customer name for the invoice
    #[arg(long, value_name = "NAME")]
    pub customer_name: Option<String>,

    /// Customer phone number
    #[arg(long, value_name = "PHONE")]
    pub customer_phone: Option<String>,

    /// Customer VAT registration number (requires --customer-name)
    #[arg(long, value_name = "VAT")]
    pub customer_vat: Option<String>,
}

impl CheckoutArgs {
    pub fn customer(&self) -> CustomerInfo {
        CustomerInfo::new(
            self.customer_name.clone(),
            self.customer_phone.clone(),
            self.customer_vat.clone(),
        )
    }
}

/// Arguments for the session command
#[derive(Debug, Clone, Args)]
pub struct SessionArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,
}

/// Parses `TRIGGER=PROGRAM`.
pub fn parse_selection(raw: &str) -> Result<(String, String), String> {
    let (trigger, program) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected TRIGGER=PROGRAM, got '{}'", raw))?;

    let (trigger, program) = (trigger.trim(), program.trim());
    if trigger.is_empty() || program.is_empty() {
        return Err(format!("expected TRIGGER=PROGRAM, got '{}'", raw));
    }
    Ok((trigger.to_string(), program.to_string()))
}
