//! Postgres-backed [`Store`].
//!
//! Each unit of work owns one database transaction. Dropping it without
//! `commit` rolls the transaction back.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::debug;

use tally_core::invoice::{DocumentType, Invoice, InvoiceFilter, InvoiceItem};
use tally_core::ledger::{
    Account, AccountKind, Category, EntryFilter, LedgerEntry, NewLedgerEntry, TransactionKind,
};
use tally_core::{Store, StoreError, StoreResult, UnitOfWork};
use tally_shared::types::{AccountId, EntryId, InvoiceId, PageRequest};

use crate::repositories::{accounts, invoices, ledger, map_db_err};

/// A [`Store`] over a Postgres connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    db: DatabaseConnection,
}

impl PgStore {
    /// Wraps a connection pool.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Creates an account with an opening balance, or returns the existing
    /// one with that name and kind unchanged.
    pub async fn open_account(
        &self,
        name: &str,
        kind: AccountKind,
        opening_balance: Decimal,
    ) -> StoreResult<Account> {
        accounts::find_or_create_account(&self.db, name, kind.into(), opening_balance)
            .await
            .map_err(map_db_err)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        let txn = self.db.begin().await.map_err(map_db_err)?;
        Ok(Box::new(PgUnitOfWork { txn: Some(txn) }))
    }
}

struct PgUnitOfWork {
    txn: Option<DatabaseTransaction>,
}

impl PgUnitOfWork {
    fn txn(&self) -> StoreResult<&DatabaseTransaction> {
        self.txn.as_ref().ok_or(StoreError::Closed)
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn find_or_create_account(&mut self, name: &str, kind: AccountKind) -> StoreResult<Account> {
        accounts::find_or_create_account(self.txn()?, name, kind.into(), Decimal::ZERO)
            .await
            .map_err(map_db_err)
    }

    async fn find_account(&mut self, id: AccountId) -> StoreResult<Option<Account>> {
        accounts::find_account(self.txn()?, id.into_inner())
            .await
            .map_err(map_db_err)
    }

    async fn list_accounts(&mut self) -> StoreResult<Vec<Account>> {
        accounts::list_accounts(self.txn()?).await.map_err(map_db_err)
    }

    async fn find_or_create_category(
        &mut self,
        name: &str,
        kind: TransactionKind,
    ) -> StoreResult<Category> {
        accounts::find_or_create_category(self.txn()?, name, kind.into())
            .await
            .map_err(map_db_err)
    }

    async fn list_categories(&mut self) -> StoreResult<Vec<Category>> {
        accounts::list_categories(self.txn()?).await.map_err(map_db_err)
    }

    async fn insert_entry(&mut self, entry: NewLedgerEntry) -> StoreResult<EntryId> {
        ledger::insert_entry(self.txn()?, entry).await.map_err(map_db_err)
    }

    async fn delete_entries_by_invoice(&mut self, invoice_id: InvoiceId) -> StoreResult<u64> {
        ledger::delete_by_invoice(self.txn()?, invoice_id.into_inner())
            .await
            .map_err(map_db_err)
    }

    async fn list_entries(&mut self, filter: &EntryFilter) -> StoreResult<Vec<LedgerEntry>> {
        ledger::list_entries(self.txn()?, filter).await.map_err(map_db_err)
    }

    async fn lock_invoice(&mut self, id: InvoiceId) -> StoreResult<Option<Invoice>> {
        invoices::find_invoice(self.txn()?, id.into_inner(), true)
            .await
            .map_err(map_db_err)
    }

    async fn get_invoice(&mut self, id: InvoiceId) -> StoreResult<Option<Invoice>> {
        invoices::find_invoice(self.txn()?, id.into_inner(), false)
            .await
            .map_err(map_db_err)
    }

    async fn insert_invoice(&mut self, invoice: &Invoice) -> StoreResult<()> {
        invoices::insert_invoice(self.txn()?, invoice)
            .await
            .map_err(map_db_err)
    }

    async fn update_invoice(&mut self, invoice: &Invoice) -> StoreResult<()> {
        invoices::update_invoice(self.txn()?, invoice)
            .await
            .map_err(map_db_err)
    }

    async fn replace_items(&mut self, invoice_id: InvoiceId, items: &[InvoiceItem]) -> StoreResult<()> {
        invoices::replace_items(self.txn()?, invoice_id.into_inner(), items)
            .await
            .map_err(map_db_err)
    }

    async fn load_items(&mut self, invoice_id: InvoiceId) -> StoreResult<Vec<InvoiceItem>> {
        invoices::load_items(self.txn()?, invoice_id.into_inner())
            .await
            .map_err(map_db_err)
    }

    async fn delete_items(&mut self, invoice_id: InvoiceId) -> StoreResult<u64> {
        invoices::delete_items(self.txn()?, invoice_id.into_inner())
            .await
            .map_err(map_db_err)
    }

    async fn delete_invoice(&mut self, id: InvoiceId) -> StoreResult<bool> {
        invoices::delete_invoice(self.txn()?, id.into_inner())
            .await
            .map_err(map_db_err)
    }

    async fn latest_document_number(
        &mut self,
        document_type: DocumentType,
    ) -> StoreResult<Option<String>> {
        let txn = self.txn()?;
        invoices::lock_numbering(txn, document_type.as_str())
            .await
            .map_err(map_db_err)?;
        invoices::latest_document_number(txn, document_type.into())
            .await
            .map_err(map_db_err)
    }

    async fn list_invoices(
        &mut self,
        filter: &InvoiceFilter,
        page: PageRequest,
    ) -> StoreResult<(Vec<Invoice>, u64)> {
        invoices::list_invoices(self.txn()?, filter, page)
            .await
            .map_err(map_db_err)
    }

    async fn commit(&mut self) -> StoreResult<()> {
        let txn = self.txn.take().ok_or(StoreError::Closed)?;
        txn.commit().await.map_err(map_db_err)?;
        debug!("Unit of work committed");
        Ok(())
    }
}
