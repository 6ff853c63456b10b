//! Decides which ledger entries an invoice change implies.
//!
//! The planner compares the stored header with the header about to be
//! written and emits only the difference:
//!
//! | change                                   | posting                          |
//! |------------------------------------------|----------------------------------|
//! | not recognized -> recognized             | revenue for the new grand total  |
//! | was recognized, grand total moved        | revenue for the signed delta     |
//! | recognized before or after, advance moved| transfer receivable -> payment   |
//!
//! Recognition always posts, zero totals included. Adjustments and
//! payments post only a non-zero change.
//!
//! Draft invoices and quotations never post. An advance recorded on a draft
//! is stored but only a later change to it posts a transfer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, CategoryId, ClientId, InvoiceId};

use crate::invoice::Invoice;
use crate::ledger::{Direction, NewLedgerEntry, SignedAmount, TransactionKind};

/// Why an entry is posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostingPurpose {
    /// First recognition of the invoice total.
    Recognition,
    /// Change of an already recognized total.
    Adjustment,
    /// Change of the amount received.
    Payment,
}

/// One entry the engine must write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPosting {
    /// Why.
    pub purpose: PostingPurpose,
    /// Revenue for recognition and adjustments, transfer for payments.
    pub kind: TransactionKind,
    /// Direction and magnitude.
    pub amount: SignedAmount,
    /// Destination of a payment transfer.
    pub payment_account: Option<AccountId>,
    /// Entry date.
    pub date: NaiveDate,
    /// Client the money relates to.
    pub client_id: Option<ClientId>,
    /// Entry description.
    pub description: String,
}

impl PlannedPosting {
    /// Turns the plan into a ledger entry against the receivables account.
    /// Revenue entries are filed under `sales_category`.
    #[must_use]
    pub fn into_entry(
        self,
        invoice_id: InvoiceId,
        receivable: AccountId,
        sales_category: Option<CategoryId>,
    ) -> NewLedgerEntry {
        let category_id = match self.kind {
            TransactionKind::Revenue => sales_category,
            _ => None,
        };
        NewLedgerEntry {
            date: self.date,
            kind: self.kind,
            category_id,
            amount: self.amount.to_signed(),
            account_id: receivable,
            to_account_id: self.payment_account,
            client_id: self.client_id,
            invoice_id: Some(invoice_id),
            description: self.description,
        }
    }

    /// Returns true if the posting needs the sales category.
    #[must_use]
    pub fn needs_sales_category(&self) -> bool {
        self.kind == TransactionKind::Revenue
    }
}

/// Stateless planner for receivables postings.
pub struct PostingPlanner;

impl PostingPlanner {
    /// Postings for a newly created document.
    ///
    /// A recognized invoice posts its grand total as revenue, even when that
    /// total is zero. The advance is never posted on create.
    #[must_use]
    pub fn for_create(invoice: &Invoice) -> Vec<PlannedPosting> {
        if !invoice.is_recognized() {
            return Vec::new();
        }
        vec![PlannedPosting {
            purpose: PostingPurpose::Recognition,
            kind: TransactionKind::Revenue,
            amount: SignedAmount::from_total(invoice.totals().grand_total),
            payment_account: None,
            date: invoice.date,
            client_id: invoice.client_id,
            description: recognition_description(&invoice.document_number),
        }]
    }

    /// Postings for an update from `old` to `new`.
    ///
    /// Entries are dated at the new header date and described with the
    /// stored document number. A payment transfer needs `payment_account`.
    #[must_use]
    pub fn for_update(
        old: &Invoice,
        new: &Invoice,
        payment_account: Option<AccountId>,
    ) -> Vec<PlannedPosting> {
        let old_is_sent = old.is_recognized();
        let new_is_sent = new.is_recognized();
        let old_total = old.totals().grand_total;
        let new_total = new.totals().grand_total;
        let number = old.document_number.as_str();
        let client_id = new.client_id.or(old.client_id);

        let posting = |purpose, kind, amount, payment_account, description| PlannedPosting {
            purpose,
            kind,
            amount,
            payment_account,
            date: new.date,
            client_id,
            description,
        };

        let mut plan = Vec::new();

        if !old_is_sent && new_is_sent {
            plan.push(posting(
                PostingPurpose::Recognition,
                TransactionKind::Revenue,
                SignedAmount::from_total(new_total),
                None,
                recognition_description(number),
            ));
        }

        if old_is_sent && let Some(amount) = SignedAmount::from_delta(new_total - old_total) {
            plan.push(posting(
                PostingPurpose::Adjustment,
                TransactionKind::Revenue,
                amount,
                None,
                adjustment_description(number, amount),
            ));
        }

        if (old_is_sent || new_is_sent)
            && let Some(amount) = SignedAmount::from_delta(new.advance_paid - old.advance_paid)
            && let Some(account) = payment_account
        {
            plan.push(posting(
                PostingPurpose::Payment,
                TransactionKind::Transfer,
                amount,
                Some(account),
                payment_description(number, amount),
            ));
        }

        plan
    }
}

fn recognition_description(number: &str) -> String {
    format!("Invoice {number} - Revenue recognition")
}

fn adjustment_description(number: &str, amount: SignedAmount) -> String {
    match amount.direction {
        Direction::Increase => format!("Invoice {number} - AR adjustment (increase)"),
        Direction::Decrease => format!("Invoice {number} - AR adjustment (decrease)"),
    }
}

fn payment_description(number: &str, amount: SignedAmount) -> String {
    match amount.direction {
        Direction::Increase => format!("Payment received for {number}"),
        Direction::Decrease => format!("Payment reversal for {number}"),
    }
}
