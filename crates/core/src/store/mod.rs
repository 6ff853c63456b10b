//! Persistence abstraction for the ledger and invoice stores.
//!
//! The engine never talks to a database directly. It opens a
//! [`UnitOfWork`] from a [`Store`], performs every read and write of one
//! operation through it, and commits at the end. A unit of work dropped
//! without `commit` rolls back, so a failed step leaves no partial state.

mod memory;

use async_trait::async_trait;
use thiserror::Error;

use tally_shared::types::{AccountId, EntryId, InvoiceId, PageRequest};

use crate::invoice::{DocumentType, Invoice, InvoiceFilter, InvoiceItem};
use crate::ledger::{Account, AccountKind, Category, EntryFilter, LedgerEntry, NewLedgerEntry, TransactionKind};

pub use memory::MemoryStore;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend failed (connection, query, serialization).
    #[error("store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A uniqueness or referential constraint rejected the write.
    #[error("store constraint violated: {0}")]
    Constraint(String),

    /// The unit of work was already committed.
    #[error("unit of work is closed")]
    Closed,
}

impl StoreError {
    /// Wraps any backend error.
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Backend(_) => "STORE_BACKEND",
            Self::Constraint(_) => "STORE_CONSTRAINT",
            Self::Closed => "STORE_CLOSED",
        }
    }
}

/// A transactional store.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Opens a new unit of work.
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>>;
}

/// One atomic scope of reads and writes.
///
/// Writes become visible to other units of work only after `commit`.
#[async_trait]
pub trait UnitOfWork: Send {
    // ---- accounts ----

    /// Returns the account with this name and kind, creating it with a zero
    /// opening balance if absent. Safe against concurrent first use.
    async fn find_or_create_account(&mut self, name: &str, kind: AccountKind) -> StoreResult<Account>;

    /// Loads an account with its derived balance.
    async fn find_account(&mut self, id: AccountId) -> StoreResult<Option<Account>>;

    /// Lists all accounts with derived balances, ordered by name.
    async fn list_accounts(&mut self) -> StoreResult<Vec<Account>>;

    // ---- categories ----

    /// Returns the category with this name and kind, creating it if absent.
    async fn find_or_create_category(
        &mut self,
        name: &str,
        kind: TransactionKind,
    ) -> StoreResult<Category>;

    /// Lists all categories, ordered by name.
    async fn list_categories(&mut self) -> StoreResult<Vec<Category>>;

    // ---- ledger ----

    /// Appends an entry and returns its ID.
    async fn insert_entry(&mut self, entry: NewLedgerEntry) -> StoreResult<EntryId>;

    /// Deletes every entry owned by the invoice. Returns the count removed.
    async fn delete_entries_by_invoice(&mut self, invoice_id: InvoiceId) -> StoreResult<u64>;

    /// Lists entries matching the filter, ordered by date then insertion.
    async fn list_entries(&mut self, filter: &EntryFilter) -> StoreResult<Vec<LedgerEntry>>;

    // ---- invoices ----

    /// Loads an invoice header and holds it against concurrent writers
    /// until the unit of work ends.
    async fn lock_invoice(&mut self, id: InvoiceId) -> StoreResult<Option<Invoice>>;

    /// Loads an invoice header.
    async fn get_invoice(&mut self, id: InvoiceId) -> StoreResult<Option<Invoice>>;

    /// Inserts a new invoice header.
    async fn insert_invoice(&mut self, invoice: &Invoice) -> StoreResult<()>;

    /// Overwrites an existing invoice header.
    async fn update_invoice(&mut self, invoice: &Invoice) -> StoreResult<()>;

    /// Replaces all items of an invoice.
    async fn replace_items(&mut self, invoice_id: InvoiceId, items: &[InvoiceItem]) -> StoreResult<()>;

    /// Loads items ordered by `sort_order`.
    async fn load_items(&mut self, invoice_id: InvoiceId) -> StoreResult<Vec<InvoiceItem>>;

    /// Deletes all items of an invoice. Returns the count removed.
    async fn delete_items(&mut self, invoice_id: InvoiceId) -> StoreResult<u64>;

    /// Deletes an invoice header. Returns false if it did not exist.
    async fn delete_invoice(&mut self, id: InvoiceId) -> StoreResult<bool>;

    /// Document number of the most recently created document of this type.
    async fn latest_document_number(
        &mut self,
        document_type: DocumentType,
    ) -> StoreResult<Option<String>>;

    /// Lists invoices newest first. Returns the page and the total count.
    async fn list_invoices(
        &mut self,
        filter: &InvoiceFilter,
        page: PageRequest,
    ) -> StoreResult<(Vec<Invoice>, u64)>;

    // ---- lifecycle ----

    /// Makes all writes durable. Any further call fails with
    /// [`StoreError::Closed`].
    async fn commit(&mut self) -> StoreResult<()>;
}

