// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # LUMEN — Marketplace Ledger Core
//!
//! LUMEN is the ledger behind a fixed-price NFT marketplace: it mints
//! uniquely identified tokens, keeps an immutable metadata pointer per
//! token, and brokers listing/sale transactions between sellers and buyers,
//! with the marketplace's own escrow account custodying each token from
//! listing until the sale settles.
//!
//! The host environment feeds calls into [`marketplace::Marketplace`] one at
//! a time — execution is strictly serialized, so there is no locking here,
//! only the contract that each public operation is a single indivisible
//! commit.
//!
//! ## Architecture
//!
//! The crate is split into modules that mirror the actual concerns of a
//! marketplace ledger:
//!
//! - **registry** — the token table: who owns what, and which URI it points to.
//! - **listing** — the market item table: seller, holder, price, sale status.
//! - **treasury** — the operator's collected-fee accumulator.
//! - **funds** — cumulative seller proceeds, so payouts are auditable.
//! - **marketplace** — the public entry surface tying the above together.
//! - **events** — state-change notifications for external observers.
//! - **account** — typed account identifiers, including the escrow account.
//! - **config** — deployment parameters and marketplace constants.
//!
//! ## Design Philosophy
//!
//! 1. All monetary operations check for overflow — wrapping arithmetic and
//!    money do not mix.
//! 2. State transitions are explicit: enum variants, not boolean flags.
//! 3. Composite operations validate everything before mutating anything.
//! 4. Every public type is serializable (serde) so a host can checkpoint
//!    and restore a deployment.

pub mod account;
pub mod config;
pub mod events;
pub mod funds;
pub mod listing;
pub mod marketplace;
pub mod registry;
pub mod treasury;
