//! # Account Identifiers
//!
//! Every participant in the marketplace — sellers, buyers, the operator —
//! is identified by an [`AccountId`]: the bech32-style address string the
//! host's identity layer hands us. The ledger never inspects the address
//! beyond equality; authentication is the host's job.
//!
//! One address is reserved: the marketplace's own escrow account, which
//! custodies every token between listing and sale.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ESCROW_ADDRESS;

/// A marketplace participant, identified by address.
///
/// Ordering and hashing follow the underlying address string so the type
/// can key the ordered maps used for proceeds bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Wraps an address string.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// The marketplace's own custody account.
    ///
    /// While a token is listed, this account is both the token's owner in
    /// the registry and the listing's holder. No private key exists for it;
    /// only marketplace operations can move value out.
    pub fn escrow() -> Self {
        Self(ESCROW_ADDRESS.to_string())
    }

    /// Returns `true` if this is the escrow account.
    pub fn is_escrow(&self) -> bool {
        self.0 == ESCROW_ADDRESS
    }

    /// Returns the underlying address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(address: &str) -> Self {
        Self(address.to_string())
    }
}

impl From<String> for AccountId {
    fn from(address: String) -> Self {
        Self(address)
    }
}
