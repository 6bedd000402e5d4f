//! # Market Item Ledger
//!
//! Owns the market item table: one entry per listing, recording the seller,
//! the current holder, the asking price, and where the item is in its sale
//! lifecycle. The lifecycle per item is a two-state machine:
//!
//! ```text
//! Unlisted -> Listed (create_listing) -> Sold (record_sale)
//!                 ^                         |
//!                 +------- relist ----------+
//! ```
//!
//! `Unlisted` is transient — only `Listed` and `Sold` are ever persisted.
//! While an item is `Listed`, the marketplace's escrow account holds it;
//! after a sale, the buyer does. A sold item is frozen except through
//! [`relist`](ListingBook::relist), which starts a fresh listing cycle under
//! the same id with a new seller (the previous buyer) and a new price.
//!
//! The ledger records sale-state only. Moving the underlying token and
//! routing funds is the marketplace core's job.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::AccountId;
use crate::config::FIRST_LISTING_ID;
use crate::registry::TokenId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during market item ledger operations.
#[derive(Debug, Error)]
pub enum ListingError {
    /// A listing must cost at least one photon.
    #[error("invalid price: a listing price must be positive")]
    InvalidPrice,

    /// The referenced listing does not exist.
    #[error("unknown listing: no market item with id {0}")]
    UnknownListing(ListingId),

    /// The listing has already completed its sale this cycle.
    #[error("already sold: listing {0} has completed its sale")]
    AlreadySold(ListingId),

    /// Relist requires a completed sale to reset.
    #[error("not sold: listing {0} is still on the market")]
    NotSold(ListingId),

    /// The account is not the listing's current holder.
    #[error("not the holder: listing {listing_id} is held by {holder}, not {claimed}")]
    NotHolder {
        /// The listing in question.
        listing_id: ListingId,
        /// The account that actually holds the item.
        holder: AccountId,
        /// The account that claimed to hold it.
        claimed: AccountId,
    },
}

// ---------------------------------------------------------------------------
// ListingId
// ---------------------------------------------------------------------------

/// Unique identifier for a market item.
///
/// Monotonically increasing, allocated at listing creation. A resale reuses
/// the same id for a new listing cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(u64);

impl ListingId {
    /// Returns the raw numeric id.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ListingStatus
// ---------------------------------------------------------------------------

/// Where a market item is in its sale lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingStatus {
    /// On the market: the escrow account custodies the item.
    Listed,
    /// Sale completed: the buyer holds the item until (and unless) they
    /// relist it.
    Sold,
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingStatus::Listed => write!(f, "Listed"),
            ListingStatus::Sold => write!(f, "Sold"),
        }
    }
}

// ---------------------------------------------------------------------------
// MarketItem
// ---------------------------------------------------------------------------

/// A single market item: a sale offer referencing a token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketItem {
    /// The listing's unique id.
    pub listing_id: ListingId,
    /// The token being sold. Fixed at creation.
    pub token_id: TokenId,
    /// The party entitled to the sale proceeds this cycle.
    pub seller: AccountId,
    /// The escrow account while listed; the buyer after the sale.
    pub holder: AccountId,
    /// Asking price in photons. Immutable within a listing cycle.
    pub price: u64,
    /// Current lifecycle state.
    pub status: ListingStatus,
    /// Timestamp when the item was first listed.
    pub listed_at: DateTime<Utc>,
    /// Timestamp of the most recent state change.
    pub updated_at: DateTime<Utc>,
}

impl MarketItem {
    /// Returns `true` once the current listing cycle's sale has completed.
    pub fn is_sold(&self) -> bool {
        self.status == ListingStatus::Sold
    }
}

// ---------------------------------------------------------------------------
// ListingBook
// ---------------------------------------------------------------------------

/// The market item table and its id allocator.
///
/// Backed by an ordered map so the query iterators walk items in ascending
/// listing id (insertion order) without sorting on demand, and repeated
/// calls see the same order absent mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingBook {
    /// Market items keyed by listing id.
    listings: BTreeMap<ListingId, MarketItem>,
    /// The id the next listing will receive.
    next_listing_id: u64,
}

impl ListingBook {
    /// Creates an empty book with the id sequence at its origin.
    pub fn new() -> Self {
        Self {
            listings: BTreeMap::new(),
            next_listing_id: FIRST_LISTING_ID,
        }
    }

    /// Creates a new listing for `token_id` at `price`, held in escrow.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError::InvalidPrice`] if `price` is zero.
    pub fn create_listing(
        &mut self,
        token_id: TokenId,
        seller: AccountId,
        price: u64,
    ) -> Result<ListingId, ListingError> {
        if price == 0 {
            return Err(ListingError::InvalidPrice);
        }

        let listing_id = ListingId(self.next_listing_id);
        self.next_listing_id += 1;

        let now = Utc::now();
        self.listings.insert(
            listing_id,
            MarketItem {
                listing_id,
                token_id,
                seller,
                holder: AccountId::escrow(),
                price,
                status: ListingStatus::Listed,
                listed_at: now,
                updated_at: now,
            },
        );

        Ok(listing_id)
    }

    /// Records a completed sale: the buyer becomes the holder.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError::UnknownListing`] if the listing does not
    /// exist, or [`ListingError::AlreadySold`] if its sale has already
    /// completed. On error the item is unchanged.
    pub fn record_sale(
        &mut self,
        listing_id: ListingId,
        buyer: AccountId,
    ) -> Result<(), ListingError> {
        let item = self
            .listings
            .get_mut(&listing_id)
            .ok_or(ListingError::UnknownListing(listing_id))?;

        if item.is_sold() {
            return Err(ListingError::AlreadySold(listing_id));
        }

        item.holder = buyer;
        item.status = ListingStatus::Sold;
        item.updated_at = Utc::now();
        Ok(())
    }

    /// Resets a sold item to a fresh listing cycle.
    ///
    /// The previous buyer becomes the seller, the escrow account takes
    /// custody again, and the price is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError::UnknownListing`] if the listing does not
    /// exist, [`ListingError::NotSold`] if the item has no completed sale to
    /// reset, [`ListingError::NotHolder`] if `new_seller` is not the current
    /// holder, or [`ListingError::InvalidPrice`] if `new_price` is zero. On
    /// error the item is unchanged.
    pub fn relist(
        &mut self,
        listing_id: ListingId,
        new_seller: AccountId,
        new_price: u64,
    ) -> Result<(), ListingError> {
        let item = self
            .listings
            .get_mut(&listing_id)
            .ok_or(ListingError::UnknownListing(listing_id))?;

        if !item.is_sold() {
            return Err(ListingError::NotSold(listing_id));
        }
        if item.holder != new_seller {
            return Err(ListingError::NotHolder {
                listing_id,
                holder: item.holder.clone(),
                claimed: new_seller,
            });
        }
        if new_price == 0 {
            return Err(ListingError::InvalidPrice);
        }

        item.seller = new_seller;
        item.holder = AccountId::escrow();
        item.price = new_price;
        item.status = ListingStatus::Listed;
        item.updated_at = Utc::now();
        Ok(())
    }

    /// Returns the market item, or `None` if the listing does not exist.
    pub fn get(&self, listing_id: ListingId) -> Option<&MarketItem> {
        self.listings.get(&listing_id)
    }

    /// Items currently on the market, ascending listing id.
    pub fn unsold(&self) -> impl Iterator<Item = &MarketItem> + '_ {
        self.listings.values().filter(|item| !item.is_sold())
    }

    /// Items whose current holder is `account`, ascending listing id.
    ///
    /// While an item is listed its holder is the escrow account, so for an
    /// ordinary account this yields the items they have bought and not yet
    /// relisted.
    pub fn held_by<'a>(
        &'a self,
        account: &'a AccountId,
    ) -> impl Iterator<Item = &'a MarketItem> + 'a {
        self.listings
            .values()
            .filter(move |item| item.holder == *account)
    }

    /// Items whose current-cycle seller is `seller`, ascending listing id.
    pub fn sold_by<'a>(
        &'a self,
        seller: &'a AccountId,
    ) -> impl Iterator<Item = &'a MarketItem> + 'a {
        self.listings
            .values()
            .filter(move |item| item.seller == *seller)
    }

    /// Returns the number of market items ever created.
    pub fn listing_count(&self) -> usize {
        self.listings.len()
    }
}

impl Default for ListingBook {
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
    use crate::registry::TokenRegistry;

    fn alice() -> AccountId {
        AccountId::new("lumen1alice")
    }

    fn bob() -> AccountId {
        AccountId::new("lumen1bob")
    }

    fn token(registry: &mut TokenRegistry) -> TokenId {
        registry.mint(alice(), "ipfs://item").unwrap()
    }

    #[test]
    fn create_listing_starts_in_escrow() {
        let mut registry = TokenRegistry::new();
        let mut book = ListingBook::new();
        let token_id = token(&mut registry);

        let listing_id = book.create_listing(token_id, alice(), 100).unwrap();
        let item = book.get(listing_id).unwrap();

        assert_eq!(item.status, ListingStatus::Listed);
        assert_eq!(item.seller, alice());
        assert!(item.holder.is_escrow());
        assert_eq!(item.price, 100);
    }

    #[test]
    fn listing_ids_are_sequential_from_one() {
        let mut registry = TokenRegistry::new();
        let mut book = ListingBook::new();
        let first = book
            .create_listing(token(&mut registry), alice(), 10)
            .unwrap();
        let second = book
            .create_listing(token(&mut registry), alice(), 20)
            .unwrap();
        assert_eq!(first.value(), FIRST_LISTING_ID);
        assert_eq!(second.value(), FIRST_LISTING_ID + 1);
    }

    #[test]
    fn zero_price_rejected() {
        let mut registry = TokenRegistry::new();
        let mut book = ListingBook::new();
        let result = book.create_listing(token(&mut registry), alice(), 0);
        assert!(matches!(result.unwrap_err(), ListingError::InvalidPrice));
        assert_eq!(book.listing_count(), 0);
    }

    #[test]
    fn record_sale_hands_item_to_buyer() {
        let mut registry = TokenRegistry::new();
        let mut book = ListingBook::new();
        let id = book
            .create_listing(token(&mut registry), alice(), 100)
            .unwrap();

        book.record_sale(id, bob()).unwrap();
        let item = book.get(id).unwrap();

        assert!(item.is_sold());
        assert_eq!(item.holder, bob());
        // The seller is still the original lister this cycle.
        assert_eq!(item.seller, alice());
    }

    #[test]
    fn second_sale_on_same_cycle_rejected() {
        let mut registry = TokenRegistry::new();
        let mut book = ListingBook::new();
        let id = book
            .create_listing(token(&mut registry), alice(), 100)
            .unwrap();

        book.record_sale(id, bob()).unwrap();
        let result = book.record_sale(id, bob());
        assert!(matches!(result.unwrap_err(), ListingError::AlreadySold(_)));
    }

    #[test]
    fn record_sale_unknown_listing_rejected() {
        let mut book = ListingBook::new();
        let mut other = ListingBook::new();
        let mut registry = TokenRegistry::new();
        let id = other
            .create_listing(token(&mut registry), alice(), 100)
            .unwrap();
        assert!(matches!(
            book.record_sale(id, bob()).unwrap_err(),
            ListingError::UnknownListing(_)
        ));
    }

    #[test]
    fn relist_resets_the_cycle() {
        let mut registry = TokenRegistry::new();
        let mut book = ListingBook::new();
        let id = book
            .create_listing(token(&mut registry), alice(), 100)
            .unwrap();
        book.record_sale(id, bob()).unwrap();

        book.relist(id, bob(), 250).unwrap();
        let item = book.get(id).unwrap();

        assert_eq!(item.status, ListingStatus::Listed);
        assert_eq!(item.seller, bob());
        assert!(item.holder.is_escrow());
        assert_eq!(item.price, 250);
        // Same identifier across cycles.
        assert_eq!(item.listing_id, id);
    }

    #[test]
    fn relist_while_still_listed_rejected() {
        let mut registry = TokenRegistry::new();
        let mut book = ListingBook::new();
        let id = book
            .create_listing(token(&mut registry), alice(), 100)
            .unwrap();
        let result = book.relist(id, alice(), 200);
        assert!(matches!(result.unwrap_err(), ListingError::NotSold(_)));
    }

    #[test]
    fn relist_by_non_holder_rejected() {
        let mut registry = TokenRegistry::new();
        let mut book = ListingBook::new();
        let id = book
            .create_listing(token(&mut registry), alice(), 100)
            .unwrap();
        book.record_sale(id, bob()).unwrap();

        let result = book.relist(id, alice(), 200);
        assert!(matches!(result.unwrap_err(), ListingError::NotHolder { .. }));
        // Item untouched by the failed relist.
        assert!(book.get(id).unwrap().is_sold());
    }

    #[test]
    fn relist_zero_price_rejected() {
        let mut registry = TokenRegistry::new();
        let mut book = ListingBook::new();
        let id = book
            .create_listing(token(&mut registry), alice(), 100)
            .unwrap();
        book.record_sale(id, bob()).unwrap();
        assert!(matches!(
            book.relist(id, bob(), 0).unwrap_err(),
            ListingError::InvalidPrice
        ));
    }

    #[test]
    fn queries_filter_and_keep_insertion_order() {
        let mut registry = TokenRegistry::new();
        let mut book = ListingBook::new();
        let first = book
            .create_listing(token(&mut registry), alice(), 10)
            .unwrap();
        let second = book
            .create_listing(token(&mut registry), alice(), 20)
            .unwrap();
        let third = book
            .create_listing(token(&mut registry), alice(), 30)
            .unwrap();

        book.record_sale(second, bob()).unwrap();

        let unsold: Vec<ListingId> = book.unsold().map(|item| item.listing_id).collect();
        assert_eq!(unsold, vec![first, third]);

        let bobs: Vec<ListingId> = book.held_by(&bob()).map(|item| item.listing_id).collect();
        assert_eq!(bobs, vec![second]);

        let listed_by_alice: Vec<ListingId> =
            book.sold_by(&alice()).map(|item| item.listing_id).collect();
        assert_eq!(listed_by_alice, vec![first, second, third]);
    }

    #[test]
    fn queries_are_restartable() {
        let mut registry = TokenRegistry::new();
        let mut book = ListingBook::new();
        book.create_listing(token(&mut registry), alice(), 10)
            .unwrap();
        book.create_listing(token(&mut registry), alice(), 20)
            .unwrap();

        let first_pass: Vec<ListingId> = book.unsold().map(|item| item.listing_id).collect();
        let second_pass: Vec<ListingId> = book.unsold().map(|item| item.listing_id).collect();
        assert_eq!(first_pass, second_pass);
    }
}
