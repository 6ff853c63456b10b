//! Store-backed ledger operations: manual entries, lookups, and queries.

use std::sync::Arc;

use rust_decimal::Decimal;
use tally_shared::PostingConfig;
use tally_shared::types::{AccountId, round_stored};

use super::error::LedgerError;
use super::service::LedgerService;
use super::types::{Account, AccountKind, Category, EntryFilter, LedgerEntry, NewLedgerEntry, TransactionKind};
use crate::dashboard::{DashboardSummary, DateRange, summarize};
use crate::store::Store;

/// The transaction journal.
#[derive(Debug)]
pub struct Journal<S> {
    store: Arc<S>,
    config: PostingConfig,
}

impl<S> Clone for Journal<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S: Store> Journal<S> {
    /// Creates a journal over `store`.
    pub fn new(store: Arc<S>, config: PostingConfig) -> Self {
        Self { store, config }
    }

    /// Records a user-entered entry.
    ///
    /// # Errors
    ///
    /// Returns a validation error, `AccountNotFound` if either account is
    /// unknown, or a store error.
    pub async fn record_entry(&self, entry: NewLedgerEntry) -> Result<LedgerEntry, LedgerError> {
        let entry = NewLedgerEntry {
            amount: round_stored(entry.amount),
            ..entry
        };
        LedgerService::validate_manual_entry(&entry)?;

        let mut uow = self.store.begin().await?;
        for account in std::iter::once(entry.account_id).chain(entry.to_account_id) {
            if uow.find_account(account).await?.is_none() {
                return Err(LedgerError::AccountNotFound(account));
            }
        }
        let id = uow.insert_entry(entry.clone()).await?;
        uow.commit().await?;

        tracing::info!(
            entry_id = %id,
            kind = %entry.kind,
            amount = %entry.amount,
            "Recorded manual ledger entry"
        );
        Ok(entry.into_entry(id))
    }

    /// Lists entries matching `filter`, ordered by date then insertion.
    pub async fn list_entries(&self, filter: &EntryFilter) -> Result<Vec<LedgerEntry>, LedgerError> {
        let mut uow = self.store.begin().await?;
        Ok(uow.list_entries(filter).await?)
    }

    /// Lists all accounts with their derived balances.
    pub async fn list_accounts(&self) -> Result<Vec<Account>, LedgerError> {
        let mut uow = self.store.begin().await?;
        Ok(uow.list_accounts().await?)
    }

    /// Current derived balance of one account.
    pub async fn account_balance(&self, id: AccountId) -> Result<Decimal, LedgerError> {
        let mut uow = self.store.begin().await?;
        uow.find_account(id)
            .await?
            .map(|account| account.balance)
            .ok_or(LedgerError::AccountNotFound(id))
    }

    /// Returns the named account, creating it if absent.
    pub async fn find_or_create_account(&self, name: &str, kind: AccountKind) -> Result<Account, LedgerError> {
        let mut uow = self.store.begin().await?;
        let account = uow.find_or_create_account(name, kind).await?;
        uow.commit().await?;
        Ok(account)
    }

    /// Returns the named category, creating it if absent.
    pub async fn find_or_create_category(
        &self,
        name: &str,
        kind: TransactionKind,
    ) -> Result<Category, LedgerError> {
        let mut uow = self.store.begin().await?;
        let category = uow.find_or_create_category(name, kind).await?;
        uow.commit().await?;
        Ok(category)
    }

    /// Lists all categories.
    pub async fn list_categories(&self) -> Result<Vec<Category>, LedgerError> {
        let mut uow = self.store.begin().await?;
        Ok(uow.list_categories().await?)
    }

    /// Dashboard summary for `period`, or the current month.
    pub async fn summary(&self, period: Option<DateRange>) -> Result<DashboardSummary, LedgerError> {
        let period = period.unwrap_or_default();
        let mut uow = self.store.begin().await?;
        let accounts = uow.list_accounts().await?;
        let entries = uow.list_entries(&EntryFilter::default()).await?;
        Ok(summarize(period, accounts, &entries, &self.config.cash_accounts))
    }
}
