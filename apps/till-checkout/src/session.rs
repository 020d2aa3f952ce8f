//! # Register Session
//!
//! A line-oriented register over the cart commands.
//!
//! ```text
//! till> add BURGER 3
//! till> add FRIES
//! till> add COLA
//! till> conflicts
//!   BURGER (Burger)
//!     P1  Burgers with fries   saves $5.00
//!     P2  Burgers with cola    saves $3.00
//! till> select BURGER P1
//! till> customer name Huda Trading
//! till> customer vat 300012345600003
//! till> checkout card
//! { "id": "...", "lines": [...], "paymentMethod": "CARD", ... }
//! ```
//!
//! Every mutation re-prices the cart and prints the summary. Command errors
//! are printed and the session carries on.

use std::io::{self, BufRead, Write};

use tracing::{debug, info};

use till_core::{ConflictGroup, CustomerInfo, LoyaltyProgram, PaymentMethod, ProgramType};

use crate::commands::cart::{add_to_cart, clear_cart, get_cart, remove_from_cart, update_cart_item};
use crate::commands::checkout::{clear_customer, finalize_checkout, set_customer, CustomerField};
use crate::commands::promotions::{get_conflicts, list_programs, select_promotion};
use crate::commands::CartResponse;
use crate::error::ApiError;
use crate::state::{CartState, CatalogState, ConfigState};

const PROMPT: &str = "till> ";

/// Result of executing a register command
#[derive(Debug, PartialEq, Eq)]
pub enum ExecuteResult {
    /// Command handled, read the next line
    Continue,
    /// Cashier closed the register
    Exit,
    /// Blank input
    Empty,
}

/// An interactive register bound to loaded catalog and config.
pub struct Register<'a> {
    catalog: &'a CatalogState,
    config: &'a ConfigState,
    cart: CartState,
}

impl<'a> Register<'a> {
    pub fn new(catalog: &'a CatalogState, config: &'a ConfigState) -> Self {
        Register {
            catalog,
            config,
            cart: CartState::new(),
        }
    }

    /// Reads commands until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&self, input: R, mut out: W) -> io::Result<()> {
        info!(store = %self.config.store_name, "Register session started");
        writeln!(out, "{} register ready. Type 'help' for commands.", self.store_label())?;

        write!(out, "{}", PROMPT)?;
        out.flush()?;
        for line in input.lines() {
            if self.execute(&line?, &mut out)? == ExecuteResult::Exit {
                break;
            }
            write!(out, "{}", PROMPT)?;
            out.flush()?;
        }

        writeln!(out)?;
        info!("Register session closed");
        Ok(())
    }

    /// Executes one command line.
    pub fn execute<W: Write>(&self, line: &str, out: &mut W) -> io::Result<ExecuteResult> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(ExecuteResult::Empty);
        }

        let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let args: Vec<&str> = rest.split_whitespace().collect();
        debug!(command = %command, args = ?args, "register command");

        match command.to_lowercase().as_str() {
            "exit" | "quit" | "q" => return Ok(ExecuteResult::Exit),
            "help" | "?" => print_help(out)?,
            "show" => {
                let response = get_cart(self.catalog, &self.cart, self.config);
                self.print_cart(out, &response)?;
            }
            "conflicts" => {
                let conflicts = get_conflicts(self.catalog, &self.cart);
                if conflicts.is_empty() {
                    writeln!(out, "No promotion conflicts.")?;
                } else {
                    self.print_conflicts(out, &conflicts)?;
                }
            }
            "add" => match args.as_slice() {
                [barcode] => self.report(out, add_to_cart(self.catalog, &self.cart, self.config, barcode, None))?,
                [barcode, qty] => match parse_quantity(qty) {
                    Some(qty) => {
                        self.report(out, add_to_cart(self.catalog, &self.cart, self.config, barcode, Some(qty)))?
                    }
                    None => usage(out, "add <barcode> [quantity]")?,
                },
                _ => usage(out, "add <barcode> [quantity]")?,
            },
            "qty" => match args.as_slice() {
                [barcode, qty] => match parse_quantity(qty) {
                    Some(qty) => self.report(out, update_cart_item(self.catalog, &self.cart, self.config, barcode, qty))?,
                    None => usage(out, "qty <barcode> <quantity>")?,
                },
                _ => usage(out, "qty <barcode> <quantity>")?,
            },
            "remove" | "rm" => match args.as_slice() {
                [barcode] => self.report(out, remove_from_cart(self.catalog, &self.cart, self.config, barcode))?,
                _ => usage(out, "remove <barcode>")?,
            },
            "select" => match rest.trim().split_once(char::is_whitespace) {
                // Program ids fall back to names, which may contain spaces
                Some((trigger, program)) => self.report(
                    out,
                    select_promotion(self.catalog, &self.cart, self.config, trigger, program.trim()),
                )?,
                None => usage(out, "select <trigger barcode> <program id>")?,
            },
            "programs" => {
                let programs = list_programs(self.catalog);
                if programs.is_empty() {
                    writeln!(out, "No active promotions.")?;
                }
                for program in &programs {
                    self.print_program(out, program)?;
                }
            }
            "customer" => match rest.trim().split_once(char::is_whitespace) {
                Some((field, value)) => match CustomerField::parse(field) {
                    Some(field) => {
                        let customer = set_customer(&self.cart, field, value);
                        print_customer(out, &customer)?;
                    }
                    None => usage(out, CUSTOMER_USAGE)?,
                },
                None if rest.trim().eq_ignore_ascii_case("clear") => {
                    clear_customer(&self.cart);
                    writeln!(out, "Customer cleared.")?;
                }
                None if rest.trim().is_empty() => {
                    let customer = self.cart.read(|s| s.customer.clone());
                    print_customer(out, &customer)?;
                }
                None => usage(out, CUSTOMER_USAGE)?,
            },
            "clear" => {
                let response = clear_cart(self.catalog, &self.cart, self.config);
                self.print_cart(out, &response)?;
            }
            "checkout" => match args.as_slice() {
                [] => self.checkout(out, PaymentMethod::default())?,
                [method] => match method.parse::<PaymentMethod>() {
                    Ok(payment) => self.checkout(out, payment)?,
                    Err(_) => usage(out, "checkout [cash|card]")?,
                },
                _ => usage(out, "checkout [cash|card]")?,
            },
            other => writeln!(out, "Unknown command '{}'. Type 'help' for commands.", other)?,
        }

        Ok(ExecuteResult::Continue)
    }

    fn checkout<W: Write>(&self, out: &mut W, payment: PaymentMethod) -> io::Result<()> {
        match finalize_checkout(self.catalog, &self.cart, self.config, payment) {
            Ok(draft) => {
                serde_json::to_writer_pretty(&mut *out, &draft)?;
                writeln!(out)
            }
            Err(err) => print_error(out, &err),
        }
    }

    fn report<W: Write>(&self, out: &mut W, result: Result<CartResponse, ApiError>) -> io::Result<()> {
        match result {
            Ok(response) => self.print_cart(out, &response),
            Err(err) => print_error(out, &err),
        }
    }

    fn print_cart<W: Write>(&self, out: &mut W, response: &CartResponse) -> io::Result<()> {
        let money = |m| self.config.format_currency(m);

        if response.lines.is_empty() {
            return writeln!(out, "Cart is empty.");
        }

        for line in &response.lines {
            writeln!(
                out,
                "  {:<16} {:<20} x{:<4} {:>12}",
                line.barcode,
                line.name,
                line.quantity,
                money(line.line_total())
            )?;
        }

        let pricing = &response.pricing;
        for section in &pricing.sections {
            writeln!(
                out,
                "  * {} ({} set{})  -{}",
                section.program_name,
                section.sets,
                if section.sets == 1 { "" } else { "s" },
                money(section.total_discount)
            )?;
        }
        if !pricing.unresolved_conflicts.is_empty() {
            writeln!(
                out,
                "  ! choose a promotion for: {} (see 'conflicts')",
                pricing.unresolved_conflicts.join(", ")
            )?;
        }

        let totals = pricing.totals;
        let vat_label = format!("VAT {}%", self.config.vat_rate().percentage());
        writeln!(out, "  Subtotal  {:>12}", money(totals.subtotal))?;
        writeln!(out, "  Discount  {:>12}", money(totals.total_discount))?;
        writeln!(out, "  {:<10}{:>12}", vat_label, money(totals.total_tax))?;
        writeln!(out, "  Total     {:>12}", money(totals.total))
    }

    fn print_program<W: Write>(&self, out: &mut W, program: &LoyaltyProgram) -> io::Result<()> {
        let terms = match (program.program_type, program.fixed_bundle_price) {
            (ProgramType::PercentDiscount, Some(price)) => {
                format!("any {} for {}", program.min_quantity, self.config.format_currency(price))
            }
            (ProgramType::PercentDiscount, None) => format!(
                "buy {}, {}% off {}",
                program.min_quantity,
                program.discount_percent.normalize(),
                program.reward_quantity
            ),
            (ProgramType::BuyXGetY, _) => {
                format!("buy {} get {} free", program.min_quantity, program.reward_quantity)
            }
        };
        writeln!(
            out,
            "  {:<12} {:<24} {:<28} on {}",
            program.id,
            program.name,
            terms,
            program.trigger_barcodes.join(", ")
        )
    }

    fn print_conflicts<W: Write>(&self, out: &mut W, conflicts: &[ConflictGroup]) -> io::Result<()> {
        let chosen = self.cart.read(|s| s.selections.clone());
        for group in conflicts {
            writeln!(out, "  {} ({})", group.trigger_barcode, group.trigger_name)?;
            for option in &group.options {
                let marker = if chosen.get(&group.trigger_barcode) == Some(option.program_id.as_str()) {
                    '>'
                } else {
                    ' '
                };
                writeln!(
                    out,
                    "   {} {:<12} {:<24} saves {}",
                    marker,
                    option.program_id,
                    option.program_name,
                    self.config.format_currency(option.potential_savings)
                )?;
            }
        }
        Ok(())
    }

    fn store_label(&self) -> &str {
        if self.config.store_name.is_empty() {
            "Till"
        } else {
            &self.config.store_name
        }
    }
}

const CUSTOMER_USAGE: &str = "customer [name|phone|vat <value> | clear]";

fn print_customer<W: Write>(out: &mut W, customer: &CustomerInfo) -> io::Result<()> {
    if customer.is_empty() {
        return writeln!(out, "No customer details.");
    }
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    writeln!(
        out,
        "  Customer: {}  Phone: {}  VAT: {}",
        field(&customer.name),
        field(&customer.phone),
        field(&customer.vat_number)
    )
}

fn parse_quantity(raw: &str) -> Option<i64> {
    raw.parse().ok()
}

fn print_error<W: Write>(out: &mut W, err: &ApiError) -> io::Result<()> {
    writeln!(out, "error: {}", err.message)
}

fn usage<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    writeln!(out, "usage: {}", text)
}

fn print_help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Register commands:")?;
    writeln!(out, "  add <barcode> [qty]        Scan a product")?;
    writeln!(out, "  qty <barcode> <qty>        Set a line quantity (0 removes)")?;
    writeln!(out, "  remove <barcode>           Remove a line")?;
    writeln!(out, "  conflicts                  List competing promotions")?;
    writeln!(out, "  select <barcode> <program> Choose a promotion for a trigger")?;
    writeln!(out, "  programs                   List active promotions")?;
    writeln!(out, "  show                       Show the priced cart")?;
    writeln!(out, "  customer <field> <value>   Set invoice name, phone or vat ('clear' resets)")?;
    writeln!(out, "  checkout [cash|card]       Finalize and print the order draft")?;
    writeln!(out, "  clear                      Start over")?;
    writeln!(out, "  exit/quit                  Close the register")
}
