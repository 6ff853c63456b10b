//! In-process store.
//!
//! A unit of work takes the store-wide lock, works on a private copy of the
//! state, and writes the copy back on commit. Units of work are therefore
//! fully serialized, and a dropped unit discards its copy.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};

use tally_shared::types::{AccountId, CategoryId, EntryId, InvoiceId, PageRequest};

use super::{StoreError, StoreResult, UnitOfWork};
use crate::invoice::{DocumentType, Invoice, InvoiceFilter, InvoiceItem};
use crate::ledger::{
    Account, AccountKind, Category, EntryFilter, LedgerEntry, NewLedgerEntry, TransactionKind,
    derive_balance,
};

#[derive(Debug, Clone)]
struct AccountRow {
    id: AccountId,
    name: String,
    kind: AccountKind,
    opening_balance: Decimal,
    description: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    accounts: Vec<AccountRow>,
    categories: Vec<Category>,
    entries: Vec<LedgerEntry>,
    /// Creation order.
    invoices: Vec<Invoice>,
    items: Vec<InvoiceItem>,
}

impl MemoryState {
    fn materialize(&self, row: &AccountRow) -> Account {
        Account {
            id: row.id,
            name: row.name.clone(),
            kind: row.kind,
            opening_balance: row.opening_balance,
            balance: derive_balance(row.id, row.opening_balance, &self.entries),
            description: row.description.clone(),
        }
    }

    fn ensure_account(&mut self, name: &str, kind: AccountKind, opening_balance: Decimal) -> Account {
        let existing = self
            .accounts
            .iter()
            .position(|a| a.name == name && a.kind == kind);
        let idx = existing.unwrap_or_else(|| {
            self.accounts.push(AccountRow {
                id: AccountId::new(),
                name: name.to_string(),
                kind,
                opening_balance,
                description: None,
            });
            self.accounts.len() - 1
        });
        self.materialize(&self.accounts[idx])
    }
}

/// A [`Store`](super::Store) held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an account with an opening balance, or returns the existing
    /// one with that name and kind unchanged.
    pub async fn open_account(&self, name: &str, kind: AccountKind, opening_balance: Decimal) -> Account {
        let mut state = self.state.lock().await;
        state.ensure_account(name, kind, opening_balance)
    }
}

#[async_trait]
impl super::Store for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryUnitOfWork {
            guard: Some(guard),
            working,
        }))
    }
}

struct MemoryUnitOfWork {
    guard: Option<OwnedMutexGuard<MemoryState>>,
    working: MemoryState,
}

impl MemoryUnitOfWork {
    fn state(&mut self) -> StoreResult<&mut MemoryState> {
        if self.guard.is_some() {
            Ok(&mut self.working)
        } else {
            Err(StoreError::Closed)
        }
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn find_or_create_account(&mut self, name: &str, kind: AccountKind) -> StoreResult<Account> {
        Ok(self.state()?.ensure_account(name, kind, Decimal::ZERO))
    }

    async fn find_account(&mut self, id: AccountId) -> StoreResult<Option<Account>> {
        let state = self.state()?;
        Ok(state
            .accounts
            .iter()
            .find(|a| a.id == id)
            .map(|row| state.materialize(row)))
    }

    async fn list_accounts(&mut self) -> StoreResult<Vec<Account>> {
        let state = self.state()?;
        let mut accounts: Vec<Account> = state.accounts.iter().map(|row| state.materialize(row)).collect();
        accounts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(accounts)
    }

    async fn find_or_create_category(
        &mut self,
        name: &str,
        kind: TransactionKind,
    ) -> StoreResult<Category> {
        let state = self.state()?;
        if let Some(existing) = state.categories.iter().find(|c| c.name == name && c.kind == kind) {
            return Ok(existing.clone());
        }
        let category = Category {
            id: CategoryId::new(),
            name: name.to_string(),
            kind,
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn list_categories(&mut self) -> StoreResult<Vec<Category>> {
        let mut categories = self.state()?.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn insert_entry(&mut self, entry: NewLedgerEntry) -> StoreResult<EntryId> {
        let state = self.state()?;
        let known = |id: AccountId| state.accounts.iter().any(|a| a.id == id);
        if !known(entry.account_id) || entry.to_account_id.is_some_and(|id| !known(id)) {
            return Err(StoreError::Constraint(
                "ledger entry references an unknown account".to_string(),
            ));
        }
        let id = EntryId::new();
        state.entries.push(entry.into_entry(id));
        Ok(id)
    }

    async fn delete_entries_by_invoice(&mut self, invoice_id: InvoiceId) -> StoreResult<u64> {
        let state = self.state()?;
        let before = state.entries.len();
        state.entries.retain(|e| e.invoice_id != Some(invoice_id));
        Ok((before - state.entries.len()) as u64)
    }

    async fn list_entries(&mut self, filter: &EntryFilter) -> StoreResult<Vec<LedgerEntry>> {
        let mut entries: Vec<LedgerEntry> = self
            .state()?
            .entries
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        // Stable: insertion order breaks ties within a date.
        entries.sort_by_key(|e| e.date);
        Ok(entries)
    }

    async fn lock_invoice(&mut self, id: InvoiceId) -> StoreResult<Option<Invoice>> {
        // The whole store is already held by this unit of work.
        self.get_invoice(id).await
    }

    async fn get_invoice(&mut self, id: InvoiceId) -> StoreResult<Option<Invoice>> {
        Ok(self.state()?.invoices.iter().find(|i| i.id == id).cloned())
    }

    async fn insert_invoice(&mut self, invoice: &Invoice) -> StoreResult<()> {
        let state = self.state()?;
        if state.invoices.iter().any(|i| i.id == invoice.id) {
            return Err(StoreError::Constraint(format!("duplicate invoice id {}", invoice.id)));
        }
        state.invoices.push(invoice.clone());
        Ok(())
    }

    async fn update_invoice(&mut self, invoice: &Invoice) -> StoreResult<()> {
        let state = self.state()?;
        let slot = state
            .invoices
            .iter_mut()
            .find(|i| i.id == invoice.id)
            .ok_or_else(|| StoreError::Constraint(format!("invoice {} does not exist", invoice.id)))?;
        *slot = Invoice {
            updated_at: Utc::now(),
            ..invoice.clone()
        };
        Ok(())
    }

    async fn replace_items(&mut self, invoice_id: InvoiceId, items: &[InvoiceItem]) -> StoreResult<()> {
        let state = self.state()?;
        state.items.retain(|i| i.invoice_id != invoice_id);
        state.items.extend(items.iter().cloned());
        Ok(())
    }

    async fn load_items(&mut self, invoice_id: InvoiceId) -> StoreResult<Vec<InvoiceItem>> {
        let mut items: Vec<InvoiceItem> = self
            .state()?
            .items
            .iter()
            .filter(|i| i.invoice_id == invoice_id)
            .cloned()
            .collect();
        items.sort_by_key(|i| i.sort_order);
        Ok(items)
    }

    async fn delete_items(&mut self, invoice_id: InvoiceId) -> StoreResult<u64> {
        let state = self.state()?;
        let before = state.items.len();
        state.items.retain(|i| i.invoice_id != invoice_id);
        Ok((before - state.items.len()) as u64)
    }

    async fn delete_invoice(&mut self, id: InvoiceId) -> StoreResult<bool> {
        let state = self.state()?;
        if state.entries.iter().any(|e| e.invoice_id == Some(id)) {
            return Err(StoreError::Constraint(format!(
                "invoice {id} still owns ledger entries"
            )));
        }
        let before = state.invoices.len();
        state.invoices.retain(|i| i.id != id);
        Ok(state.invoices.len() < before)
    }

    async fn latest_document_number(
        &mut self,
        document_type: DocumentType,
    ) -> StoreResult<Option<String>> {
        Ok(self
            .state()?
            .invoices
            .iter()
            .rev()
            .find(|i| i.document_type == document_type)
            .map(|i| i.document_number.clone()))
    }

    async fn list_invoices(
        &mut self,
        filter: &InvoiceFilter,
        page: PageRequest,
    ) -> StoreResult<(Vec<Invoice>, u64)> {
        let matching: Vec<&Invoice> = self
            .state()?
            .invoices
            .iter()
            .rev()
            .filter(|i| filter.matches(i))
            .collect();
        let total = matching.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        let data = matching.into_iter().skip(offset).take(limit).cloned().collect();
        Ok((data, total))
    }

    async fn commit(&mut self) -> StoreResult<()> {
        let mut guard = self.guard.take().ok_or(StoreError::Closed)?;
        *guard = std::mem::take(&mut self.working);
        Ok(())
    }
}
