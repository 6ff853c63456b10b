//! Single-sided transaction ledger.
//!
//! This module implements the ledger the posting engine writes to:
//! - Accounts, categories, and entries
//! - Signed amounts and per-account entry effects
//! - Balance derivation
//! - Manual entry validation
//! - The store-backed journal

pub mod balance;
pub mod entry;
pub mod error;
pub mod journal;
pub mod service;
pub mod types;

#[cfg(test)]
mod balance_props;

pub use balance::{AccountBalance, derive_balance};
pub use entry::{Direction, SignedAmount};
pub use error::LedgerError;
pub use journal::Journal;
pub use service::LedgerService;
pub use types::{
    Account, AccountKind, Category, EntryFilter, LedgerEntry, NewLedgerEntry, TransactionKind,
};
