//! # CLI Interface
//!
//! Defines the command-line argument structure for `lumen-node` using
//! `clap` derive. Two subcommands: `demo` and `version`.

use clap::{Parser, Subcommand};

use lumen_ledger::config::DEFAULT_FEE_BPS;

/// LUMEN marketplace ledger driver.
///
/// Instantiates an in-process marketplace ledger and drives a scripted
/// session against it, logging every committed operation. Useful for
/// inspecting ledger behavior and event output without a host deployment.
#[derive(Parser, Debug)]
#[command(
    name = "lumen-node",
    about = "LUMEN marketplace ledger driver",
    version,
    propagate_version = true
)]
pub struct LumenNodeCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the LUMEN node binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a scripted marketplace session against a fresh ledger.
    Demo(DemoArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `demo` subcommand.
#[derive(Parser, Debug)]
pub struct DemoArgs {
    /// Marketplace fee taken per sale, in basis points (1/10000ths).
    #[arg(long, env = "LUMEN_FEE_BPS", default_value_t = DEFAULT_FEE_BPS)]
    pub fee_bps: u32,

    /// Log output format: "pretty" or "json".
    #[arg(long, env = "LUMEN_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Print the drained event log to stdout as JSON lines when the
    /// session ends.
    #[arg(long)]
    pub emit_events: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        LumenNodeCli::command().debug_assert();
    }
}
