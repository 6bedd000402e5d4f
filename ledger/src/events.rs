//! # Market Events
//!
//! State-change notifications for external observers — indexers, UIs, or
//! whatever else the host wires up downstream. The marketplace core appends
//! one event per committed state change, in commit order, to an in-memory
//! log that observers drain with
//! [`Marketplace::take_events`](crate::marketplace::Marketplace::take_events).
//!
//! Failed operations emit nothing.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::account::AccountId;
use crate::listing::ListingId;
use crate::registry::TokenId;

/// A committed marketplace state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarketEvent {
    /// A token was minted.
    TokenMinted {
        token_id: TokenId,
        owner: AccountId,
        metadata_uri: String,
    },
    /// A token changed hands. Emitted for every registry transfer: into
    /// escrow on listing and resale, out of escrow on sale.
    OwnershipTransferred {
        token_id: TokenId,
        from: AccountId,
        to: AccountId,
    },
    /// A new listing went on the market.
    ListingCreated {
        listing_id: ListingId,
        token_id: TokenId,
        seller: AccountId,
        price: u64,
    },
    /// A sale settled: funds routed, token delivered.
    SaleExecuted {
        listing_id: ListingId,
        token_id: TokenId,
        seller: AccountId,
        buyer: AccountId,
        price: u64,
        fee: u64,
    },
    /// A previously sold item went back on the market.
    ListingRelisted {
        listing_id: ListingId,
        token_id: TokenId,
        seller: AccountId,
        price: u64,
    },
}

impl MarketEvent {
    /// The event's wire name, matching its serialized `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            MarketEvent::TokenMinted { .. } => "token_minted",
            MarketEvent::OwnershipTransferred { .. } => "ownership_transferred",
            MarketEvent::ListingCreated { .. } => "listing_created",
            MarketEvent::SaleExecuted { .. } => "sale_executed",
            MarketEvent::ListingRelisted { .. } => "listing_relisted",
        }
    }
}

impl fmt::Display for MarketEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketEvent::TokenMinted {
                token_id, owner, ..
            } => write!(f, "token {} minted to {}", token_id, owner),
            MarketEvent::OwnershipTransferred { token_id, from, to } => {
                write!(f, "token {} transferred {} -> {}", token_id, from, to)
            }
            MarketEvent::ListingCreated {
                listing_id, price, ..
            } => write!(f, "listing {} created at {} photons", listing_id, price),
            MarketEvent::SaleExecuted {
                listing_id,
                buyer,
                price,
                ..
            } => write!(
                f,
                "listing {} sold to {} for {} photons",
                listing_id, buyer, price
            ),
            MarketEvent::ListingRelisted {
                listing_id, price, ..
            } => write!(f, "listing {} relisted at {} photons", listing_id, price),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FIRST_LISTING_ID, FIRST_TOKEN_ID};
    use crate::marketplace::{MarketError, Marketplace};
    use crate::registry::RegistryError;

    fn sample_sale_event() -> MarketEvent {
        // Build real events by driving a marketplace rather than hand-rolling
        // ids, so the serialized shape stays honest.
        let mut market = Marketplace::with_fee(250, AccountId::new("lumen1operator")).unwrap();
        let (_, listing_id) = market
            .create_token("ipfs://abc", 100, &AccountId::new("lumen1alice"))
            .unwrap();
        market
            .execute_sale(listing_id, &AccountId::new("lumen1bob"), 100)
            .unwrap();
        market
            .take_events()
            .into_iter()
            .find(|event| event.name() == "sale_executed")
            .unwrap()
    }

    #[test]
    fn serializes_with_type_tag() {
        let event = sample_sale_event();
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "sale_executed");
        assert_eq!(json["listing_id"], FIRST_LISTING_ID);
        assert_eq!(json["token_id"], FIRST_TOKEN_ID);
        assert_eq!(json["price"], 100);
        assert_eq!(json["fee"], 2);
    }

    #[test]
    fn roundtrips_through_json() {
        let event = sample_sale_event();
        let json = serde_json::to_string(&event).unwrap();
        let recovered: MarketEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, recovered);
    }

    #[test]
    fn display_is_human_readable() {
        let event = sample_sale_event();
        let line = event.to_string();
        assert!(line.contains("sold to"));
        assert!(line.contains("100 photons"));
    }

    #[test]
    fn failed_operations_emit_nothing() {
        let mut market = Marketplace::with_fee(250, AccountId::new("lumen1operator")).unwrap();
        let result = market.create_token("", 100, &AccountId::new("lumen1alice"));
        assert!(matches!(
            result.unwrap_err(),
            MarketError::Registry(RegistryError::InvalidMetadata)
        ));
        assert!(market.events().is_empty());
    }
}
