//! # Token Registry
//!
//! Owns the token table: for every minted token, who currently holds it and
//! which metadata URI it points to. Enforces unique ownership — a token has
//! exactly one owner at all times — and provides ownership transfer as a
//! primitive for the marketplace core to compose.
//!
//! The registry is deliberately dumb about metadata: a URI is an opaque
//! string with a non-emptiness contract and nothing more. What the URI
//! resolves to is the caller's concern.
//!
//! Tokens are never destroyed. There is no burn operation, and token ids
//! count up from [`FIRST_TOKEN_ID`](crate::config::FIRST_TOKEN_ID) without
//! reuse.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::AccountId;
use crate::config::FIRST_TOKEN_ID;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during token registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Mint was called with an empty metadata URI.
    #[error("invalid metadata: the token URI must be non-empty")]
    InvalidMetadata,

    /// The referenced token was never minted.
    #[error("unknown token: no token with id {0} was ever minted")]
    UnknownToken(TokenId),

    /// A transfer named a `from` account that does not hold the token.
    #[error("not the owner: token {token_id} is held by {owner}, not {claimed}")]
    NotOwner {
        /// The token the transfer referenced.
        token_id: TokenId,
        /// The account that actually holds the token.
        owner: AccountId,
        /// The account the caller claimed holds it.
        claimed: AccountId,
    },
}

// ---------------------------------------------------------------------------
// TokenId
// ---------------------------------------------------------------------------

/// Unique identifier for a minted token.
///
/// Monotonically increasing, assigned at mint time, never reused. A
/// distinct sequence from listing ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(u64);

impl TokenId {
    /// Returns the raw numeric id.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// TokenRecord
// ---------------------------------------------------------------------------

/// A single minted token: its current holder and immutable metadata pointer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    /// The token's unique id.
    pub token_id: TokenId,
    /// The current holder. Exactly one at any time; reassigned only through
    /// [`TokenRegistry::transfer`].
    pub owner: AccountId,
    /// Opaque metadata pointer, fixed at mint. The registry guarantees it
    /// is non-empty and nothing else.
    pub metadata_uri: String,
    /// Timestamp when the token was minted.
    pub minted_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// TokenRegistry
// ---------------------------------------------------------------------------

/// The token table and its id allocator.
///
/// Sole authority for token ownership: external components read through
/// accessors and mutate only via the marketplace core, which calls
/// [`mint`](Self::mint) and [`transfer`](Self::transfer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRegistry {
    /// Minted tokens keyed by id. Ordered so iteration is deterministic.
    tokens: BTreeMap<TokenId, TokenRecord>,
    /// The id the next mint will receive.
    next_token_id: u64,
}

impl TokenRegistry {
    /// Creates an empty registry with the id sequence at its origin.
    pub fn new() -> Self {
        Self {
            tokens: BTreeMap::new(),
            next_token_id: FIRST_TOKEN_ID,
        }
    }

    /// Mints a new token owned by `to` with the given metadata pointer.
    ///
    /// Allocates the next token id. The URI is stored exactly as supplied
    /// and can never change afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidMetadata`] if the URI is empty. There
    /// are no other failure modes.
    pub fn mint(
        &mut self,
        to: AccountId,
        metadata_uri: impl Into<String>,
    ) -> Result<TokenId, RegistryError> {
        let metadata_uri = metadata_uri.into();
        if metadata_uri.is_empty() {
            return Err(RegistryError::InvalidMetadata);
        }

        let token_id = TokenId(self.next_token_id);
        self.next_token_id += 1;

        self.tokens.insert(
            token_id,
            TokenRecord {
                token_id,
                owner: to,
                metadata_uri,
                minted_at: Utc::now(),
            },
        );

        Ok(token_id)
    }

    /// Returns the current owner of a token.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownToken`] if the token was never minted.
    pub fn owner_of(&self, token_id: TokenId) -> Result<&AccountId, RegistryError> {
        self.tokens
            .get(&token_id)
            .map(|record| &record.owner)
            .ok_or(RegistryError::UnknownToken(token_id))
    }

    /// Returns the metadata URI supplied at mint, unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownToken`] if the token was never minted.
    pub fn token_uri(&self, token_id: TokenId) -> Result<&str, RegistryError> {
        self.tokens
            .get(&token_id)
            .map(|record| record.metadata_uri.as_str())
            .ok_or(RegistryError::UnknownToken(token_id))
    }

    /// Returns the full token record, or `None` if never minted.
    pub fn get(&self, token_id: TokenId) -> Option<&TokenRecord> {
        self.tokens.get(&token_id)
    }

    /// Atomically reassigns ownership of a token from `from` to `to`.
    ///
    /// The ownership-changed notification for external observers is emitted
    /// by the marketplace core, which mediates every call to this primitive.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownToken`] if the token was never
    /// minted, or [`RegistryError::NotOwner`] if `from` is not the current
    /// owner. On error the owner is unchanged.
    pub fn transfer(
        &mut self,
        token_id: TokenId,
        from: &AccountId,
        to: AccountId,
    ) -> Result<(), RegistryError> {
        let record = self
            .tokens
            .get_mut(&token_id)
            .ok_or(RegistryError::UnknownToken(token_id))?;

        if record.owner != *from {
            return Err(RegistryError::NotOwner {
                token_id,
                owner: record.owner.clone(),
                claimed: from.clone(),
            });
        }

        record.owner = to;
        Ok(())
    }

    /// Returns the number of minted tokens.
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

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
    fn mint_assigns_sequential_ids_from_one() {
        let mut registry = TokenRegistry::new();
        let first = registry.mint(alice(), "ipfs://one").unwrap();
        let second = registry.mint(alice(), "ipfs://two").unwrap();
        assert_eq!(first.value(), FIRST_TOKEN_ID);
        assert_eq!(second.value(), FIRST_TOKEN_ID + 1);
        assert_eq!(registry.token_count(), 2);
    }

    #[test]
    fn mint_empty_uri_rejected() {
        let mut registry = TokenRegistry::new();
        let result = registry.mint(alice(), "");
        assert!(matches!(
            result.unwrap_err(),
            RegistryError::InvalidMetadata
        ));
        assert_eq!(registry.token_count(), 0);
    }

    #[test]
    fn token_uri_returns_exactly_the_minted_string() {
        let mut registry = TokenRegistry::new();
        let id = registry.mint(alice(), "ipfs://abc").unwrap();
        assert_eq!(registry.token_uri(id).unwrap(), "ipfs://abc");
    }

    #[test]
    fn owner_of_unknown_token_rejected() {
        let registry = TokenRegistry::new();
        let mut minted = TokenRegistry::new();
        let id = minted.mint(alice(), "ipfs://abc").unwrap();
        assert!(matches!(
            registry.owner_of(id).unwrap_err(),
            RegistryError::UnknownToken(_)
        ));
    }

    #[test]
    fn transfer_reassigns_owner() {
        let mut registry = TokenRegistry::new();
        let id = registry.mint(alice(), "ipfs://abc").unwrap();
        registry.transfer(id, &alice(), bob()).unwrap();
        assert_eq!(registry.owner_of(id).unwrap(), &bob());
    }

    #[test]
    fn transfer_by_non_owner_rejected() {
        let mut registry = TokenRegistry::new();
        let id = registry.mint(alice(), "ipfs://abc").unwrap();
        let result = registry.transfer(id, &bob(), bob());
        assert!(matches!(
            result.unwrap_err(),
            RegistryError::NotOwner { .. }
        ));
        // Ownership unchanged after the failed transfer.
        assert_eq!(registry.owner_of(id).unwrap(), &alice());
    }

    #[test]
    fn transfer_unknown_token_rejected() {
        let mut registry = TokenRegistry::new();
        let id = registry.mint(alice(), "ipfs://abc").unwrap();
        let mut empty = TokenRegistry::new();
        assert!(matches!(
            empty.transfer(id, &alice(), bob()).unwrap_err(),
            RegistryError::UnknownToken(_)
        ));
    }

    #[test]
    fn minted_at_is_recorded() {
        let mut registry = TokenRegistry::new();
        let before = Utc::now();
        let id = registry.mint(alice(), "ipfs://abc").unwrap();
        let record = registry.get(id).unwrap();
        assert!(record.minted_at >= before);
    }
}
