//! # Till Checkout Library
//!
//! The register front end over `till-core`: snapshot loading, config,
//! cart commands and the command-line surface.
//!
//! ## Module Organization
//! ```text
//! till_checkout_lib/
//! ├── lib.rs            ◄─── You are here (startup & dispatch)
//! ├── cli.rs            ◄─── clap definitions
//! ├── session.rs        ◄─── Interactive register loop
//! ├── state/
//! │   ├── mod.rs        ◄─── State type exports
//! │   ├── catalog.rs    ◄─── Product and loyalty snapshots
//! │   ├── cart.rs       ◄─── Cart + promotion selections
//! │   └── config.rs     ◄─── Configuration state
//! ├── commands/
//! │   ├── mod.rs        ◄─── Shared cart response
//! │   ├── cart.rs       ◄─── Cart manipulation commands
//! │   ├── promotions.rs ◄─── Conflicts and promotion choice
//! │   └── checkout.rs   ◄─── Order drafts and one-shot snapshots
//! └── error.rs          ◄─── API error type for commands
//! ```
//!
//! ## Output Streams
//! JSON results go to stdout. Logs go to stderr, so `price` and `checkout`
//! output can be piped straight into another tool.

pub mod cli;
pub mod commands;
pub mod error;
pub mod session;
pub mod state;

#[cfg(test)]
mod test_support;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::{CartArgs, Cli, Commands, SnapshotArgs};
use commands::checkout::{checkout_snapshot, load_cart, price_snapshot};
use error::ApiError;
use session::Register;
use state::{CatalogState, ConfigState};

/// Runs the command line.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Register Startup                                  │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, stderr                        │
/// │     • Default: info,till=debug, override with RUST_LOG                  │
/// │                                                                         │
/// │  2. Load Config ──────────────────────────────────────────────────────► │
/// │     • --config file, else till.toml in the config dir                   │
/// │     • TILL_* environment overrides                                      │
/// │                                                                         │
/// │  3. Load Snapshots ───────────────────────────────────────────────────► │
/// │     • products + loyalty programs, normalized once                      │
/// │                                                                         │
/// │  4. Dispatch ─────────────────────────────────────────────────────────► │
/// │     • price / checkout: print JSON, exit                                │
/// │     • session: read commands from stdin                                 │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(code = ?err.code, message = %err.message, "Command failed");
            // stdout may already be closed; the exit code still reports the failure
            let _ = print_json(&err);
            ExitCode::from(err.exit_code())
        }
    }
}

fn dispatch(cli: Cli) -> Result<(), ApiError> {
    let config = ConfigState::load(cli.config.as_deref())?;
    info!(store = %config.store_name, vat_bps = config.vat_rate_bps, "Configuration loaded");

    match cli.command {
        Commands::Price(args) => {
            let (catalog, cart) = load_cart_inputs(&args)?;
            let pricing = price_snapshot(&catalog, &config, &cart, &args.selections)?;
            print_json(&pricing)
        }
        Commands::Checkout(args) => {
            let (catalog, cart) = load_cart_inputs(&args.cart)?;
            let draft = checkout_snapshot(
                &catalog,
                &config,
                &cart,
                &args.cart.selections,
                args.payment,
                args.customer(),
            )?;
            print_json(&draft)
        }
        Commands::Session(args) => {
            let catalog = load_catalog(&args.snapshot)?;
            let register = Register::new(&catalog, &config);
            register
                .run(io::stdin().lock(), io::stdout().lock())
                .map_err(|e| ApiError::internal(format!("Register I/O failed: {}", e)))
        }
    }
}

fn load_catalog(args: &SnapshotArgs) -> Result<CatalogState, ApiError> {
    Ok(CatalogState::load(&args.catalog, &args.products)?)
}

fn load_cart_inputs(args: &CartArgs) -> Result<(CatalogState, till_core::Cart), ApiError> {
    let catalog = load_catalog(&args.snapshot)?;
    let cart = load_cart(&args.cart)?;
    Ok((catalog, cart))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), ApiError> {
    let text = serde_json::to_string_pretty(value)?;
    println!("{}", text);
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages for every crate
/// - `RUST_LOG=till_core=trace` - Trace the pricing engine only
/// - Default: `info,till=debug`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,till=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
