//! # Till Checkout Entry Point
//!
//! ```text
//! till-checkout price    --catalog loyalty.json --products products.json --cart cart.json
//! till-checkout checkout --catalog loyalty.json --products products.json --cart cart.json \
//!                        --select 6281000000017=P1 --payment card \
//!                        --customer-name "Huda Trading" --customer-vat 300012345600003
//! till-checkout session  --catalog loyalty.json --products products.json
//! ```
//!
//! Exit codes: 0 success, 2 bad input, 3 unresolved promotion conflict,
//! 4 catalog or config could not be loaded, 1 anything else.

use std::process::ExitCode;

fn main() -> ExitCode {
    // Setup lives in lib.rs so it can be tested
    till_checkout_lib::run()
}
