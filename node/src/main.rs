// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # LUMEN Marketplace Node
//!
//! Entry point for the `lumen-node` binary. Parses CLI arguments,
//! initializes logging, and drives a scripted session against a fresh
//! marketplace ledger so the full mint/sale/resale lifecycle — and its
//! event output — can be inspected locally.
//!
//! The binary supports two subcommands:
//!
//! - `demo`    — run the scripted marketplace session
//! - `version` — print build version information
//!
//! Logs go to stderr; the drained event log (with `--emit-events`) goes to
//! stdout as JSON lines, one event per line.

mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;

use lumen_ledger::account::AccountId;
use lumen_ledger::marketplace::Marketplace;

use cli::{Commands, DemoArgs, LumenNodeCli};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = LumenNodeCli::parse();

    match cli.command {
        Commands::Demo(args) => run_demo(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Runs a scripted marketplace session: two mints, a sale, a resale chain,
/// and a deliberately rejected operation to show error reporting.
fn run_demo(args: DemoArgs) -> Result<()> {
    logging::init_logging(
        "lumen_node=info,lumen_ledger=info",
        LogFormat::from_str_lossy(&args.log_format),
    );

    tracing::info!(fee_bps = args.fee_bps, "starting marketplace session");

    let operator = AccountId::new("lumen1operator");
    let mut market = Marketplace::with_fee(args.fee_bps, operator)
        .context("invalid marketplace configuration")?;

    let alice = AccountId::new("lumen1alice");
    let bob = AccountId::new("lumen1bob");
    let carol = AccountId::new("lumen1carol");

    // Alice mints two pieces; the first changes hands twice.
    let (_, gallery_piece) = market.create_token(
        "ipfs://bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi/piece-01.json",
        100,
        &alice,
    )?;
    let (_, studio_piece) = market.create_token(
        "ipfs://bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi/piece-02.json",
        2_500_000,
        &alice,
    )?;

    market.execute_sale(gallery_piece, &bob, 100)?;
    market.resell_token(gallery_piece, 180, &bob)?;
    market.execute_sale(gallery_piece, &carol, 180)?;

    // A lowball offer on the studio piece, kept in the script on purpose:
    // rejected operations must leave the ledger untouched.
    if let Err(err) = market.execute_sale(studio_piece, &bob, 1) {
        tracing::warn!(%err, "sale rejected");
    }

    println!("Session summary");
    println!("  Tokens minted   : {}", market.token_count());
    println!("  Listings created: {}", market.listing_count());
    println!(
        "  Still on market : {}",
        market.unsold_listings().count()
    );
    println!("  Treasury        : {} photons", market.treasury_balance());
    println!(
        "  Alice's proceeds: {} photons",
        market.proceeds_of(&alice)
    );
    println!("  Bob's proceeds  : {} photons", market.proceeds_of(&bob));

    if args.emit_events {
        for event in market.take_events() {
            println!(
                "{}",
                serde_json::to_string(&event).context("event serialization failed")?
            );
        }
    }

    tracing::info!("marketplace session complete");
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("lumen-node {}", env!("CARGO_PKG_VERSION"));
    println!("rustc      {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
