//! Concurrent access tests for the posting engine.
//!
//! Tasks are released together from a barrier so that updates, first-use
//! account creation and number allocation actually race.
//!
//! The in-memory store serializes whole units of work, which would hide a
//! missing engine lock. Races on a single invoice or on numbering therefore
//! run on [`AutocommitStore`], where every call commits on its own and
//! `lock_invoice` is a plain read followed by a pause.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::Barrier;

use tally_core::invoice::{
    CreateInvoiceInput, DocumentType, Invoice, InvoiceFilter, InvoiceItem, InvoiceItemInput,
    InvoiceStatus, UpdateInvoiceInput,
};
use tally_core::ledger::{
    Account, AccountKind, Category, EntryFilter, LedgerEntry, NewLedgerEntry, TransactionKind,
};
use tally_core::{ArPostingEngine, MemoryStore, Store, StoreResult, UnitOfWork};
use tally_shared::PostingConfig;
use tally_shared::types::{AccountId, EntryId, InvoiceId, PageRequest};

const TASKS: usize = 16;

/// Long enough for every racing task to read before any of them writes.
const READ_WINDOW: Duration = Duration::from_millis(20);

/// Runs one call in its own unit of work and commits it immediately.
macro_rules! autocommit {
    ($store:expr, |$uow:ident| $call:expr) => {{
        let mut $uow = $store.begin().await?;
        let out = $call.await?;
        $uow.commit().await?;
        Ok(out)
    }};
}

/// A store without isolation or row locks: reads see whatever is committed
/// and writes land one call at a time.
#[derive(Debug, Clone, Default)]
struct AutocommitStore(MemoryStore);

#[async_trait]
impl Store for AutocommitStore {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        Ok(Box::new(self.clone()))
    }
}

#[async_trait]
impl UnitOfWork for AutocommitStore {
    async fn find_or_create_account(&mut self, name: &str, kind: AccountKind) -> StoreResult<Account> {
        autocommit!(self.0, |uow| uow.find_or_create_account(name, kind))
    }
    async fn find_account(&mut self, id: AccountId) -> StoreResult<Option<Account>> {
        autocommit!(self.0, |uow| uow.find_account(id))
    }
    async fn list_accounts(&mut self) -> StoreResult<Vec<Account>> {
        autocommit!(self.0, |uow| uow.list_accounts())
    }
    async fn find_or_create_category(&mut self, name: &str, kind: TransactionKind) -> StoreResult<Category> {
        autocommit!(self.0, |uow| uow.find_or_create_category(name, kind))
    }
    async fn list_categories(&mut self) -> StoreResult<Vec<Category>> {
        autocommit!(self.0, |uow| uow.list_categories())
    }
    async fn insert_entry(&mut self, entry: NewLedgerEntry) -> StoreResult<EntryId> {
        autocommit!(self.0, |uow| uow.insert_entry(entry))
    }
    async fn delete_entries_by_invoice(&mut self, invoice_id: InvoiceId) -> StoreResult<u64> {
        autocommit!(self.0, |uow| uow.delete_entries_by_invoice(invoice_id))
    }
    async fn list_entries(&mut self, filter: &EntryFilter) -> StoreResult<Vec<LedgerEntry>> {
        autocommit!(self.0, |uow| uow.list_entries(filter))
    }
    async fn lock_invoice(&mut self, id: InvoiceId) -> StoreResult<Option<Invoice>> {
        let found = self.get_invoice(id).await?;
        tokio::time::sleep(READ_WINDOW).await;
        Ok(found)
    }
    async fn get_invoice(&mut self, id: InvoiceId) -> StoreResult<Option<Invoice>> {
        autocommit!(self.0, |uow| uow.get_invoice(id))
    }
    async fn insert_invoice(&mut self, invoice: &Invoice) -> StoreResult<()> {
        autocommit!(self.0, |uow| uow.insert_invoice(invoice))
    }
    async fn update_invoice(&mut self, invoice: &Invoice) -> StoreResult<()> {
        autocommit!(self.0, |uow| uow.update_invoice(invoice))
    }
    async fn replace_items(&mut self, invoice_id: InvoiceId, items: &[InvoiceItem]) -> StoreResult<()> {
        autocommit!(self.0, |uow| uow.replace_items(invoice_id, items))
    }
    async fn load_items(&mut self, invoice_id: InvoiceId) -> StoreResult<Vec<InvoiceItem>> {
        autocommit!(self.0, |uow| uow.load_items(invoice_id))
    }
    async fn delete_items(&mut self, invoice_id: InvoiceId) -> StoreResult<u64> {
        autocommit!(self.0, |uow| uow.delete_items(invoice_id))
    }
    async fn delete_invoice(&mut self, id: InvoiceId) -> StoreResult<bool> {
        autocommit!(self.0, |uow| uow.delete_invoice(id))
    }
    async fn latest_document_number(&mut self, document_type: DocumentType) -> StoreResult<Option<String>> {
        let latest: StoreResult<Option<String>> =
            autocommit!(self.0, |uow| uow.latest_document_number(document_type));
        tokio::time::sleep(READ_WINDOW).await;
        latest
    }
    async fn list_invoices(
        &mut self,
        filter: &InvoiceFilter,
        page: PageRequest,
    ) -> StoreResult<(Vec<Invoice>, u64)> {
        autocommit!(self.0, |uow| uow.list_invoices(filter, page))
    }
    async fn commit(&mut self) -> StoreResult<()> {
        Ok(())
    }
}

fn engine() -> ArPostingEngine<MemoryStore> {
    ArPostingEngine::new(Arc::new(MemoryStore::new()), PostingConfig::default())
}

fn unisolated_engine() -> ArPostingEngine<AutocommitStore> {
    ArPostingEngine::new(Arc::new(AutocommitStore::default()), PostingConfig::default())
}

fn sent_invoice(number: &str, amount: Decimal) -> CreateInvoiceInput {
    CreateInvoiceInput {
        status: Some(InvoiceStatus::Sent),
        ..CreateInvoiceInput::new(
            DocumentType::Invoice,
            number,
            NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            vec![InvoiceItemInput::new("Retainer", dec!(1), amount)],
        )
    }
}

async fn revenue_for<S: Store>(engine: &ArPostingEngine<S>, id: InvoiceId) -> Decimal {
    engine
        .journal()
        .list_entries(&EntryFilter::for_invoice(id))
        .await
        .unwrap()
        .iter()
        .filter(|e| e.kind == TransactionKind::Revenue)
        .map(|e| e.amount)
        .sum()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_keep_revenue_in_step() {
    let engine = unisolated_engine();
    let id = engine
        .create_invoice(sent_invoice("INV 0001", dec!(1000)))
        .await
        .unwrap()
        .invoice
        .id;

    let barrier = Arc::new(Barrier::new(TASKS));
    let handles = (0..TASKS).map(|n| {
        let engine = engine.clone();
        let barrier = Arc::clone(&barrier);
        tokio::spawn(async move {
            barrier.wait().await;
            let amount = Decimal::from(1000 + 25 * n as i64);
            engine
                .update_invoice(
                    id,
                    UpdateInvoiceInput {
                        items: Some(vec![InvoiceItemInput::new("Retainer", dec!(1), amount)]),
                        ..Default::default()
                    },
                )
                .await
        })
    });

    for result in join_all(handles).await {
        result.unwrap().unwrap();
    }

    let final_total = engine.get_invoice(id).await.unwrap().totals().grand_total;
    assert_eq!(revenue_for(&engine, id).await, final_total);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_posts_share_one_receivable_account() {
    let engine = engine();
    let barrier = Arc::new(Barrier::new(TASKS));

    let handles = (0..TASKS).map(|n| {
        let engine = engine.clone();
        let barrier = Arc::clone(&barrier);
        tokio::spawn(async move {
            barrier.wait().await;
            engine
                .create_invoice(sent_invoice(&format!("INV {:04}", n + 1), dec!(100)))
                .await
        })
    });
    for result in join_all(handles).await {
        result.unwrap().unwrap();
    }

    let journal = engine.journal();
    let accounts = journal.list_accounts().await.unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].name, "Accounts Receivable");
    assert_eq!(accounts[0].balance, dec!(1600));
    assert_eq!(journal.list_categories().await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_conversions_get_distinct_numbers() {
    let engine = unisolated_engine();
    let mut quotations = Vec::with_capacity(TASKS);
    for n in 0..TASKS {
        let input = CreateInvoiceInput::new(
            DocumentType::Quotation,
            format!("QUO {:04}", n + 1),
            NaiveDate::from_ymd_opt(2026, 4, 2).unwrap(),
            vec![InvoiceItemInput::new("Survey", dec!(1), dec!(40))],
        );
        quotations.push(engine.create_invoice(input).await.unwrap().invoice.id);
    }

    let barrier = Arc::new(Barrier::new(TASKS));
    let handles = quotations.into_iter().map(|quotation_id| {
        let engine = engine.clone();
        let barrier = Arc::clone(&barrier);
        tokio::spawn(async move {
            barrier.wait().await;
            engine.convert_quotation_to_invoice(quotation_id).await
        })
    });

    let numbers: HashSet<String> = join_all(handles)
        .await
        .into_iter()
        .map(|result| result.unwrap().unwrap().invoice.document_number)
        .collect();
    assert_eq!(numbers.len(), TASKS);
    assert!(numbers.contains("INV 0001"));
    assert!(numbers.contains(&format!("INV {TASKS:04}")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_delete_succeeds_once() {
    let engine = unisolated_engine();
    let id = engine
        .create_invoice(sent_invoice("INV 0001", dec!(500)))
        .await
        .unwrap()
        .invoice
        .id;

    let barrier = Arc::new(Barrier::new(4));
    let handles = (0..4).map(|_| {
        let engine = engine.clone();
        let barrier = Arc::clone(&barrier);
        tokio::spawn(async move {
            barrier.wait().await;
            engine.delete_invoice(id).await
        })
    });

    let deleted = join_all(handles)
        .await
        .into_iter()
        .filter(|result| matches!(result, Ok(Ok(()))))
        .count();
    assert_eq!(deleted, 1);
    assert!(
        engine
            .journal()
            .list_entries(&EntryFilter::for_invoice(id))
            .await
            .unwrap()
            .is_empty()
    );
}
