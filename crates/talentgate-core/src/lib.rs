//! Core types for the TalentGate credit service.
//!
//! This crate provides the foundational types used throughout the credit
//! subsystem:
//!
//! - **Identifiers**: `AccountId`, `EntryId`
//! - **Accounts**: `Account`, `Plan`
//! - **Ledger**: `LedgerEntry`, `LedgerReason`
//! - **Usage**: `UsageRecord`
//! - **Events**: `ProcessedExternalEvent`, `ReplenishmentEffect`
//!
//! # Credit Unit
//!
//! **1 credit = 1 profile analysis.**
//!
//! Balances are stored as `i64` whole credits. A metered account spends one
//! credit per analyzed profile; an unlimited account records usage without
//! spending. Every balance change is mirrored by an immutable ledger entry,
//! and `credits == sum(ledger deltas)` holds for every metered account.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod account;
pub mod events;
pub mod ids;
pub mod ledger;
pub mod usage;

pub use account::{Account, Plan, SIGNUP_BONUS_CREDITS};
pub use events::{ProcessedExternalEvent, ReplenishmentEffect};
pub use ids::{AccountId, EntryId, IdError};
pub use ledger::{LedgerEntry, LedgerReason};
pub use usage::UsageRecord;
