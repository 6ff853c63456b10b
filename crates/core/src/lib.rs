//! Core business logic for Tally.
//!
//! This crate contains the invoice lifecycle and the accounts-receivable
//! posting engine, with ZERO web or database driver dependencies.
//! Persistence goes through the [`store::Store`] abstraction.
//!
//! # Modules
//!
//! - `ledger` - Accounts, categories, entries, and balance derivation
//! - `invoice` - Documents, totals, and numbering
//! - `posting` - Receivables posting planner and engine
//! - `store` - Unit-of-work abstraction and an in-memory store
//! - `dashboard` - Period summary over the ledger

pub mod dashboard;
pub mod invoice;
pub mod ledger;
pub mod posting;
pub mod store;

pub use invoice::{InvoiceError, Step};
pub use ledger::{Journal, LedgerError};
pub use posting::ArPostingEngine;
pub use store::{MemoryStore, Store, StoreError, StoreResult, UnitOfWork};
