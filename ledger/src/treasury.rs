//! # Fee Treasury
//!
//! A single accumulator of the marketplace's collected listing fee, owned
//! by the operator account. The marketplace core credits it on every
//! completed sale and resale; nothing in this crate ever debits it — paying
//! the operator out is the host's concern.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::AccountId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during treasury operations.
#[derive(Debug, Error)]
pub enum TreasuryError {
    /// Crediting the fee would overflow the accumulator.
    ///
    /// Unreachable through the public marketplace surface — composite
    /// operations check headroom before committing anything.
    #[error("treasury overflow: collected {collected}, credit {credit}")]
    Overflow {
        /// Fees collected so far.
        collected: u64,
        /// The credit that would overflow.
        credit: u64,
    },
}

// ---------------------------------------------------------------------------
// Treasury
// ---------------------------------------------------------------------------

/// The operator-owned fee accumulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Treasury {
    /// The account entitled to the collected fees.
    operator: AccountId,
    /// Total fees collected over the deployment's lifetime, in photons.
    collected: u64,
}

impl Treasury {
    /// Creates an empty treasury owned by `operator`.
    pub fn new(operator: AccountId) -> Self {
        Self {
            operator,
            collected: 0,
        }
    }

    /// Checks that a credit of `fee` would not overflow the accumulator.
    ///
    /// Used by composite operations to validate headroom before any
    /// mutation is committed.
    pub fn ensure_headroom(&self, fee: u64) -> Result<(), TreasuryError> {
        self.collected
            .checked_add(fee)
            .map(|_| ())
            .ok_or(TreasuryError::Overflow {
                collected: self.collected,
                credit: fee,
            })
    }

    /// Credits a collected fee and returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns [`TreasuryError::Overflow`] if the credit would exceed
    /// `u64::MAX`. On error the balance is unchanged.
    pub fn credit(&mut self, fee: u64) -> Result<u64, TreasuryError> {
        self.collected = self
            .collected
            .checked_add(fee)
            .ok_or(TreasuryError::Overflow {
                collected: self.collected,
                credit: fee,
            })?;
        Ok(self.collected)
    }

    /// Total fees collected so far.
    pub fn balance(&self) -> u64 {
        self.collected
    }

    /// The account entitled to the collected fees.
    pub fn operator(&self) -> &AccountId {
        &self.operator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn treasury() -> Treasury {
        Treasury::new(AccountId::new("lumen1operator"))
    }

    #[test]
    fn starts_empty() {
        let t = treasury();
        assert_eq!(t.balance(), 0);
        assert_eq!(t.operator().as_str(), "lumen1operator");
    }

    #[test]
    fn credit_accumulates() {
        let mut t = treasury();
        assert_eq!(t.credit(2).unwrap(), 2);
        assert_eq!(t.credit(5).unwrap(), 7);
        assert_eq!(t.balance(), 7);
    }

    #[test]
    fn zero_credit_is_a_no_op() {
        let mut t = treasury();
        assert_eq!(t.credit(0).unwrap(), 0);
    }

    #[test]
    fn credit_overflow_rejected() {
        let mut t = treasury();
        t.credit(u64::MAX).unwrap();
        let result = t.credit(1);
        assert!(matches!(result.unwrap_err(), TreasuryError::Overflow { .. }));
        // Balance unchanged after the failed credit.
        assert_eq!(t.balance(), u64::MAX);
    }

    #[test]
    fn headroom_check_matches_credit_behavior() {
        let mut t = treasury();
        t.credit(u64::MAX - 10).unwrap();
        assert!(t.ensure_headroom(10).is_ok());
        assert!(t.ensure_headroom(11).is_err());
        // ensure_headroom never mutates.
        assert_eq!(t.balance(), u64::MAX - 10);
    }
}
