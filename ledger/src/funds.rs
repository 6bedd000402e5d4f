//! # Seller Proceeds Book
//!
//! Cumulative record of what each seller has been paid out across the
//! deployment's lifetime. The marketplace core credits a seller's entry
//! with `price - fee` the moment their sale settles, which makes fee
//! conservation auditable in-process: for every completed sale,
//! `proceeds credited + fee credited == price`, exactly.
//!
//! This is a credit-only book. Actually delivering the photons to the
//! seller's wallet is the host's value-transfer layer; the ledger records
//! the entitlement.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::AccountId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during proceeds bookkeeping.
#[derive(Debug, Error)]
pub enum FundsError {
    /// Crediting the payout would overflow the account's entry.
    ///
    /// Unreachable through the public marketplace surface — composite
    /// operations check headroom before committing anything.
    #[error("proceeds overflow: account {account} holds {current}, credit {credit}")]
    Overflow {
        /// The account being credited.
        account: AccountId,
        /// The account's cumulative proceeds before the failed credit.
        current: u64,
        /// The credit that would overflow.
        credit: u64,
    },
}

// ---------------------------------------------------------------------------
// ProceedsBook
// ---------------------------------------------------------------------------

/// Per-account cumulative seller payouts.
///
/// Ordered by account so iteration is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProceedsBook {
    /// Cumulative payouts in photons, keyed by account.
    balances: BTreeMap<AccountId, u64>,
}

impl ProceedsBook {
    /// Creates an empty book.
    pub fn new() -> Self {
        Self {
            balances: BTreeMap::new(),
        }
    }

    /// Checks that a credit of `amount` to `account` would not overflow.
    ///
    /// Used by composite operations to validate headroom before any
    /// mutation is committed.
    pub fn ensure_headroom(&self, account: &AccountId, amount: u64) -> Result<(), FundsError> {
        let current = self.balance_of(account);
        current
            .checked_add(amount)
            .map(|_| ())
            .ok_or(FundsError::Overflow {
                account: account.clone(),
                current,
                credit: amount,
            })
    }

    /// Credits a payout to an account and returns its new cumulative total.
    ///
    /// Creates the entry on first credit.
    ///
    /// # Errors
    ///
    /// Returns [`FundsError::Overflow`] if the credit would exceed
    /// `u64::MAX`. On error the entry is unchanged.
    pub fn credit(&mut self, account: &AccountId, amount: u64) -> Result<u64, FundsError> {
        let entry = self.balances.entry(account.clone()).or_insert(0);
        *entry = entry.checked_add(amount).ok_or(FundsError::Overflow {
            account: account.clone(),
            current: *entry,
            credit: amount,
        })?;
        Ok(*entry)
    }

    /// Cumulative proceeds credited to an account, 0 if never credited.
    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// All accounts with a non-zero entry, as `(account, total)` pairs.
    pub fn all_balances(&self) -> Vec<(AccountId, u64)> {
        self.balances
            .iter()
            .filter(|(_, total)| **total > 0)
            .map(|(account, total)| (account.clone(), *total))
            .collect()
    }

    /// Number of accounts ever credited.
    pub fn account_count(&self) -> usize {
        self.balances.len()
    }

    /// Returns `true` if no account has ever been credited.
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

impl Default for ProceedsBook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> AccountId {
        AccountId::new("lumen1alice")
    }

    fn bob() -> AccountId {
        AccountId::new("lumen1bob")
    }

    #[test]
    fn first_credit_creates_the_entry() {
        let mut book = ProceedsBook::new();
        assert_eq!(book.credit(&alice(), 97).unwrap(), 97);
        assert_eq!(book.balance_of(&alice()), 97);
        assert_eq!(book.account_count(), 1);
    }

    #[test]
    fn credits_accumulate_per_account() {
        let mut book = ProceedsBook::new();
        book.credit(&alice(), 97).unwrap();
        book.credit(&alice(), 3).unwrap();
        book.credit(&bob(), 50).unwrap();

        assert_eq!(book.balance_of(&alice()), 100);
        assert_eq!(book.balance_of(&bob()), 50);
    }

    #[test]
    fn never_credited_account_reads_zero() {
        let book = ProceedsBook::new();
        assert_eq!(book.balance_of(&alice()), 0);
        assert!(book.is_empty());
    }

    #[test]
    fn credit_overflow_rejected() {
        let mut book = ProceedsBook::new();
        book.credit(&alice(), u64::MAX).unwrap();
        let result = book.credit(&alice(), 1);
        assert!(matches!(result.unwrap_err(), FundsError::Overflow { .. }));
        assert_eq!(book.balance_of(&alice()), u64::MAX);
    }

    #[test]
    fn headroom_check_never_mutates() {
        let book = ProceedsBook::new();
        assert!(book.ensure_headroom(&alice(), u64::MAX).is_ok());
        assert!(book.is_empty());
    }

    #[test]
    fn all_balances_lists_credited_accounts() {
        let mut book = ProceedsBook::new();
        book.credit(&alice(), 10).unwrap();
        book.credit(&bob(), 20).unwrap();

        let all = book.all_balances();
        assert_eq!(all.len(), 2);
        assert!(all.contains(&(alice(), 10)));
        assert!(all.contains(&(bob(), 20)));
    }
}
