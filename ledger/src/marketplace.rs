//! # Marketplace Core
//!
//! The public entry surface of the ledger. Every mutating operation —
//! [`create_token`](Marketplace::create_token),
//! [`execute_sale`](Marketplace::execute_sale),
//! [`resell_token`](Marketplace::resell_token) — orchestrates the token
//! registry, the listing book, the treasury, and the proceeds book as one
//! indivisible unit of work: either every effect lands or none do.
//!
//! ## Atomicity discipline
//!
//! Each composite operation runs in two phases. The validation phase reads
//! state, checks every precondition, and computes every value the commit
//! will need — including arithmetic headroom for the credits about to be
//! applied. Only then does the commit phase mutate, in an order where no
//! step can fail after an earlier step has changed state: the sale status
//! flips before any value moves. Failed operations return the specific
//! error and leave the ledger exactly as it was.
//!
//! ## Reentrancy
//!
//! The host serializes calls, and every mutating operation takes
//! `&mut self`, so nested entry into the core mid-operation is rejected by
//! the borrow checker at compile time. No runtime guard flag is needed, and
//! no intermediate state is ever observable: when porting to a threaded
//! host, wrap the [`Marketplace`] in a lock and the per-operation commit
//! contract carries over unchanged.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::account::AccountId;
use crate::config::{ConfigError, MarketConfig};
use crate::events::MarketEvent;
use crate::funds::{FundsError, ProceedsBook};
use crate::listing::{ListingBook, ListingError, ListingId, MarketItem};
use crate::registry::{RegistryError, TokenId, TokenRegistry};
use crate::treasury::{Treasury, TreasuryError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors surfaced by marketplace operations.
///
/// Component failures pass through transparently so callers match on the
/// specific kind; every variant is a caller-correctable validation failure,
/// never a sign of corrupted ledger state.
#[derive(Debug, Error)]
pub enum MarketError {
    /// A sale requires the exact asking price — no change-making, no tips.
    #[error("insufficient payment: listing price is {price} photons, payment was {payment}")]
    InsufficientPayment {
        /// The listing's asking price.
        price: u64,
        /// The payment the buyer conveyed.
        payment: u64,
    },

    /// A token registry failure.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A market item ledger failure.
    #[error(transparent)]
    Listing(#[from] ListingError),

    /// A treasury bookkeeping failure.
    #[error(transparent)]
    Treasury(#[from] TreasuryError),

    /// A proceeds bookkeeping failure.
    #[error(transparent)]
    Funds(#[from] FundsError),
}

// ---------------------------------------------------------------------------
// Marketplace
// ---------------------------------------------------------------------------

/// The marketplace ledger: all persisted state for one deployment.
///
/// Serializable as a whole so a host can checkpoint and restore — the token
/// table, the market item table, both fund books, the id counters, and any
/// undrained events survive a round-trip intact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Marketplace {
    /// Immutable deployment parameters.
    config: MarketConfig,
    /// The token table.
    registry: TokenRegistry,
    /// The market item table.
    listings: ListingBook,
    /// Collected marketplace fees.
    treasury: Treasury,
    /// Cumulative seller payouts.
    proceeds: ProceedsBook,
    /// Committed state changes not yet drained by an observer.
    events: Vec<MarketEvent>,
}

impl Marketplace {
    /// Creates an empty marketplace under the given deployment parameters.
    pub fn new(config: MarketConfig) -> Self {
        let treasury = Treasury::new(config.operator().clone());
        Self {
            config,
            registry: TokenRegistry::new(),
            listings: ListingBook::new(),
            treasury,
            proceeds: ProceedsBook::new(),
            events: Vec::new(),
        }
    }

    /// Convenience constructor: validates the fee rate and builds the
    /// marketplace in one step.
    pub fn with_fee(fee_bps: u32, operator: AccountId) -> Result<Self, ConfigError> {
        Ok(Self::new(MarketConfig::new(fee_bps, operator)?))
    }

    // -----------------------------------------------------------------------
    // Mutating operations
    // -----------------------------------------------------------------------

    /// Mints a token for `caller`, parks it in escrow, and lists it.
    ///
    /// Three registry/ledger steps as one atomic unit: mint to the caller,
    /// transfer to the escrow account, create the listing with the caller
    /// as seller.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidMetadata`] if the URI is empty, or
    /// [`ListingError::InvalidPrice`] if `price` is zero. On error nothing
    /// is minted and nothing is listed.
    pub fn create_token(
        &mut self,
        metadata_uri: impl Into<String>,
        price: u64,
        caller: &AccountId,
    ) -> Result<(TokenId, ListingId), MarketError> {
        let metadata_uri = metadata_uri.into();

        // Validate the listing half up front -- a mint must not survive a
        // rejected listing. The mint itself validates the URI.
        if price == 0 {
            return Err(ListingError::InvalidPrice.into());
        }

        let token_id = self.registry.mint(caller.clone(), metadata_uri.clone())?;
        // Freshly minted to the caller, so this transfer cannot fail.
        self.registry
            .transfer(token_id, caller, AccountId::escrow())?;
        let listing_id = self
            .listings
            .create_listing(token_id, caller.clone(), price)?;

        self.events.push(MarketEvent::TokenMinted {
            token_id,
            owner: caller.clone(),
            metadata_uri,
        });
        self.events.push(MarketEvent::OwnershipTransferred {
            token_id,
            from: caller.clone(),
            to: AccountId::escrow(),
        });
        self.events.push(MarketEvent::ListingCreated {
            listing_id,
            token_id,
            seller: caller.clone(),
            price,
        });

        info!(%token_id, %listing_id, seller = %caller, price, "token minted and listed");
        Ok((token_id, listing_id))
    }

    /// Settles a sale: routes funds and delivers the token to `buyer`.
    ///
    /// `payment` is the value conveyed with the call. It must equal the
    /// asking price exactly. On success the seller's proceeds grow by
    /// `price - fee`, the treasury by `fee`, the buyer owns the token, and
    /// the listing is marked sold — all as one atomic unit.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError::UnknownListing`], [`ListingError::AlreadySold`],
    /// or [`MarketError::InsufficientPayment`]. On error no funds move and
    /// no ownership changes.
    pub fn execute_sale(
        &mut self,
        listing_id: ListingId,
        buyer: &AccountId,
        payment: u64,
    ) -> Result<(), MarketError> {
        // -- validate --
        let item = self
            .listings
            .get(listing_id)
            .ok_or(ListingError::UnknownListing(listing_id))?;
        if item.is_sold() {
            return Err(ListingError::AlreadySold(listing_id).into());
        }
        let price = item.price;
        let token_id = item.token_id;
        let seller = item.seller.clone();
        if payment != price {
            return Err(MarketError::InsufficientPayment { price, payment });
        }

        let fee = self.config.fee_for(price);
        let payout = price - fee; // fee <= price by construction
        self.treasury.ensure_headroom(fee)?;
        self.proceeds.ensure_headroom(&seller, payout)?;

        // -- commit: status flips before any value moves --
        self.listings.record_sale(listing_id, buyer.clone())?;
        // Listing invariant: the escrow account owns the token while listed.
        self.registry
            .transfer(token_id, &AccountId::escrow(), buyer.clone())?;
        self.treasury.credit(fee)?;
        self.proceeds.credit(&seller, payout)?;

        self.events.push(MarketEvent::OwnershipTransferred {
            token_id,
            from: AccountId::escrow(),
            to: buyer.clone(),
        });
        self.events.push(MarketEvent::SaleExecuted {
            listing_id,
            token_id,
            seller: seller.clone(),
            buyer: buyer.clone(),
            price,
            fee,
        });

        info!(
            %listing_id,
            %token_id,
            seller = %seller,
            buyer = %buyer,
            price,
            fee,
            "sale executed"
        );
        Ok(())
    }

    /// Puts a previously bought token back on the market at `new_price`.
    ///
    /// The caller — the current owner — becomes the new seller, and the
    /// token returns to escrow custody. Atomic like every other composite
    /// operation.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError::UnknownListing`], [`ListingError::NotSold`],
    /// [`ListingError::NotHolder`] if `caller` does not own the token, or
    /// [`ListingError::InvalidPrice`]. On error custody and the listing are
    /// unchanged.
    pub fn resell_token(
        &mut self,
        listing_id: ListingId,
        new_price: u64,
        caller: &AccountId,
    ) -> Result<(), MarketError> {
        // -- validate --
        let item = self
            .listings
            .get(listing_id)
            .ok_or(ListingError::UnknownListing(listing_id))?;
        if !item.is_sold() {
            return Err(ListingError::NotSold(listing_id).into());
        }
        let token_id = item.token_id;
        let owner = self.registry.owner_of(token_id)?.clone();
        if owner != *caller {
            return Err(ListingError::NotHolder {
                listing_id,
                holder: owner,
                claimed: caller.clone(),
            }
            .into());
        }
        if new_price == 0 {
            return Err(ListingError::InvalidPrice.into());
        }

        // -- commit --
        self.registry
            .transfer(token_id, caller, AccountId::escrow())?;
        // Sold invariant: the listing's holder is the token's owner, i.e.
        // the caller we just verified, so the relist cannot fail.
        self.listings
            .relist(listing_id, caller.clone(), new_price)?;

        self.events.push(MarketEvent::OwnershipTransferred {
            token_id,
            from: caller.clone(),
            to: AccountId::escrow(),
        });
        self.events.push(MarketEvent::ListingRelisted {
            listing_id,
            token_id,
            seller: caller.clone(),
            price: new_price,
        });

        info!(%listing_id, %token_id, seller = %caller, price = new_price, "listing relisted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Read-only queries
    // -----------------------------------------------------------------------

    /// Current owner of a token.
    pub fn owner_of(&self, token_id: TokenId) -> Result<&AccountId, MarketError> {
        Ok(self.registry.owner_of(token_id)?)
    }

    /// The metadata URI supplied when the token was minted.
    pub fn token_uri(&self, token_id: TokenId) -> Result<&str, MarketError> {
        Ok(self.registry.token_uri(token_id)?)
    }

    /// The market item for a listing, or `None` if it does not exist.
    pub fn listing(&self, listing_id: ListingId) -> Option<&MarketItem> {
        self.listings.get(listing_id)
    }

    /// Items currently on the market, ascending listing id.
    pub fn unsold_listings(&self) -> impl Iterator<Item = &MarketItem> + '_ {
        self.listings.unsold()
    }

    /// Items currently held by `account` (their purchases), ascending
    /// listing id.
    pub fn listings_held_by<'a>(
        &'a self,
        account: &'a AccountId,
    ) -> impl Iterator<Item = &'a MarketItem> + 'a {
        self.listings.held_by(account)
    }

    /// Items `seller` is the current-cycle seller of, ascending listing id.
    pub fn listings_sold_by<'a>(
        &'a self,
        seller: &'a AccountId,
    ) -> impl Iterator<Item = &'a MarketItem> + 'a {
        self.listings.sold_by(seller)
    }

    /// Total marketplace fees collected so far.
    pub fn treasury_balance(&self) -> u64 {
        self.treasury.balance()
    }

    /// Cumulative proceeds credited to a seller.
    pub fn proceeds_of(&self, account: &AccountId) -> u64 {
        self.proceeds.balance_of(account)
    }

    /// The deployment parameters this marketplace runs under.
    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    /// Number of tokens ever minted.
    pub fn token_count(&self) -> usize {
        self.registry.token_count()
    }

    /// Number of market items ever created.
    pub fn listing_count(&self) -> usize {
        self.listings.listing_count()
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Committed state changes not yet drained, in commit order.
    pub fn events(&self) -> &[MarketEvent] {
        &self.events
    }

    /// Drains the event log, handing the events to the observer.
    pub fn take_events(&mut self) -> Vec<MarketEvent> {
        std::mem::take(&mut self.events)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
