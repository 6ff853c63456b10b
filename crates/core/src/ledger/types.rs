//! Ledger domain types: accounts, categories, and journal entries.
//!
//! The ledger is a single-sided journal. Each entry moves money on one
//! account (revenue, expense, capital) or between two accounts (transfer,
//! loan). Account balances are always derived from the entries.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, CategoryId, ClientId, EntryId, InvoiceId};

/// Account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Something the business owns (cash, bank, receivables).
    Asset,
    /// Something the business owes.
    Liability,
}

impl AccountKind {
    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
        }
    }
}

/// Transaction classification, shared by entries and the categories that
/// label them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Income; increases the affected account.
    Revenue,
    /// Spending; decreases the affected account.
    Expense,
    /// Owner contribution; increases the affected account.
    Capital,
    /// Movement from `account_id` to `to_account_id`.
    Transfer,
    /// Borrowing or lending between two accounts; moves like a transfer.
    Loan,
}

impl TransactionKind {
    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::Expense => "expense",
            Self::Capital => "capital",
            Self::Transfer => "transfer",
            Self::Loan => "loan",
        }
    }

    /// Returns true if entries of this kind move money between two accounts.
    #[must_use]
    pub const fn is_two_sided(self) -> bool {
        matches!(self, Self::Transfer | Self::Loan)
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named financial account with its derived balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account ID.
    pub id: AccountId,
    /// Account name, unique together with `kind`.
    pub name: String,
    /// Asset or liability.
    pub kind: AccountKind,
    /// Balance before any ledger entry.
    pub opening_balance: Decimal,
    /// `opening_balance` plus the effect of every entry touching the account.
    pub balance: Decimal,
    /// Optional description.
    pub description: Option<String>,
}

/// A named category used to classify entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category ID.
    pub id: CategoryId,
    /// Category name, unique together with `kind`.
    pub name: String,
    /// The transaction kind this category labels.
    pub kind: TransactionKind,
}

/// A persisted ledger entry.
///
/// `amount` is signed: a negative amount reverses the normal direction of
/// its kind (a negative revenue reduces the account, a negative transfer
/// moves money back from `to_account_id` to `account_id`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Entry ID (time-ordered).
    pub id: EntryId,
    /// Value date.
    pub date: NaiveDate,
    /// Entry kind.
    pub kind: TransactionKind,
    /// Classifying category.
    pub category_id: Option<CategoryId>,
    /// Signed amount.
    pub amount: Decimal,
    /// Primary affected account (the source for two-sided kinds).
    pub account_id: AccountId,
    /// Destination account for two-sided kinds.
    pub to_account_id: Option<AccountId>,
    /// Client the money relates to.
    pub client_id: Option<ClientId>,
    /// Owning invoice, when the entry was synthesized by the posting engine.
    pub invoice_id: Option<InvoiceId>,
    /// Human-readable description.
    pub description: String,
}

/// Input for a new ledger entry; the store assigns the ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLedgerEntry {
    /// Value date.
    pub date: NaiveDate,
    /// Entry kind.
    pub kind: TransactionKind,
    /// Classifying category.
    pub category_id: Option<CategoryId>,
    /// Signed amount.
    pub amount: Decimal,
    /// Primary affected account.
    pub account_id: AccountId,
    /// Destination account for two-sided kinds.
    pub to_account_id: Option<AccountId>,
    /// Client the money relates to.
    pub client_id: Option<ClientId>,
    /// Owning invoice.
    pub invoice_id: Option<InvoiceId>,
    /// Human-readable description.
    pub description: String,
}

impl NewLedgerEntry {
    /// Materializes the entry under the given ID.
    #[must_use]
    pub fn into_entry(self, id: EntryId) -> LedgerEntry {
        LedgerEntry {
            id,
            date: self.date,
            kind: self.kind,
            category_id: self.category_id,
            amount: self.amount,
            account_id: self.account_id,
            to_account_id: self.to_account_id,
            client_id: self.client_id,
            invoice_id: self.invoice_id,
            description: self.description,
        }
    }
}

/// Filter options for listing ledger entries. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    /// Only entries owned by this invoice.
    pub invoice_id: Option<InvoiceId>,
    /// Only entries of this kind.
    pub kind: Option<TransactionKind>,
    /// Only entries in this category.
    pub category_id: Option<CategoryId>,
    /// Only entries touching this account on either side.
    pub account_id: Option<AccountId>,
    /// Only entries dated on or after this day.
    pub date_from: Option<NaiveDate>,
    /// Only entries dated on or before this day.
    pub date_to: Option<NaiveDate>,
}

impl EntryFilter {
    /// Filter for every entry owned by an invoice.
    #[must_use]
    pub fn for_invoice(invoice_id: InvoiceId) -> Self {
        Self {
            invoice_id: Some(invoice_id),
            ..Self::default()
        }
    }

    /// Returns true if the entry passes every set criterion.
    #[must_use]
    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        self.invoice_id.is_none_or(|id| entry.invoice_id == Some(id))
            && self.kind.is_none_or(|kind| entry.kind == kind)
            && self
                .category_id
                .is_none_or(|id| entry.category_id == Some(id))
            && self
                .account_id
                .is_none_or(|id| entry.account_id == id || entry.to_account_id == Some(id))
            && self.date_from.is_none_or(|from| entry.date >= from)
            && self.date_to.is_none_or(|to| entry.date <= to)
    }
}
