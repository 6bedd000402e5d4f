//! # Marketplace Configuration & Constants
//!
//! Every magic number in LUMEN lives here. If you're hardcoding a constant
//! somewhere else, you're doing it wrong and you owe the team coffee.
//!
//! The deployment-time parameters are collected in [`MarketConfig`], which
//! is validated once at construction and immutable afterwards — there is no
//! governance path to change the fee on a live deployment.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::AccountId;

// ---------------------------------------------------------------------------
// Fee Parameters
// ---------------------------------------------------------------------------

/// One basis point is 1/10000 of the sale price. All fee math divides by
/// this — never by a float. Floats and money do not mix.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Default marketplace fee: 250 bps = 2.5% of every sale.
pub const DEFAULT_FEE_BPS: u32 = 250;

/// Ceiling on the configurable fee rate. 10000 bps is a 100% fee — already
/// absurd, but at least arithmetically coherent. Anything above it would
/// mean paying out more than the sale price.
pub const MAX_FEE_BPS: u32 = 10_000;

// ---------------------------------------------------------------------------
// Identifier Sequences
// ---------------------------------------------------------------------------

/// First token id handed out by the registry. Ids count up from here and
/// are never reused.
pub const FIRST_TOKEN_ID: u64 = 1;

/// First market item id. A distinct sequence from token ids — a listing id
/// and a token id that happen to share a number are unrelated.
pub const FIRST_LISTING_ID: u64 = 1;

// ---------------------------------------------------------------------------
// Reserved Addresses
// ---------------------------------------------------------------------------

/// Address of the marketplace's escrow account. No keypair exists for this
/// address; tokens parked here can only be moved by ledger operations.
pub const ESCROW_ADDRESS: &str = "lumen1escrowvault0000000000000000";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while validating deployment parameters.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configured fee rate exceeds [`MAX_FEE_BPS`].
    #[error("fee rate too high: {fee_bps} bps exceeds the {MAX_FEE_BPS} bps ceiling")]
    FeeTooHigh {
        /// The rejected fee rate.
        fee_bps: u32,
    },
}

// ---------------------------------------------------------------------------
// MarketConfig
// ---------------------------------------------------------------------------

/// Immutable deployment parameters for a marketplace instance.
///
/// Fields are private on purpose: the fee rate and operator account are set
/// once when the deployment is instantiated and must never change while the
/// ledger is live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Fee taken per completed sale, in basis points.
    fee_bps: u32,
    /// The operator account that owns the fee treasury.
    operator: AccountId,
}

impl MarketConfig {
    /// Validates and freezes the deployment parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FeeTooHigh`] if `fee_bps` exceeds
    /// [`MAX_FEE_BPS`].
    pub fn new(fee_bps: u32, operator: AccountId) -> Result<Self, ConfigError> {
        if fee_bps > MAX_FEE_BPS {
            return Err(ConfigError::FeeTooHigh { fee_bps });
        }
        Ok(Self { fee_bps, operator })
    }

    /// The configured fee rate in basis points.
    pub fn fee_bps(&self) -> u32 {
        self.fee_bps
    }

    /// The operator account credited with collected fees.
    pub fn operator(&self) -> &AccountId {
        &self.operator
    }

    /// Computes the marketplace fee for a sale at `price`, rounding down.
    ///
    /// The multiplication is widened through `u128` so `price * fee_bps`
    /// cannot overflow; the result fits back in `u64` because the fee never
    /// exceeds the price (`fee_bps <= BPS_DENOMINATOR` is enforced at
    /// construction).
    pub fn fee_for(&self, price: u64) -> u64 {
        (price as u128 * self.fee_bps as u128 / BPS_DENOMINATOR as u128) as u64
    }
}
