//! Invoice and quotation documents.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, ClientId, InvoiceId, InvoiceItemId, round_stored};

use super::totals::InvoiceTotals;

/// Kind of commercial document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// A price offer. Never posts to the ledger.
    Quotation,
    /// A bill. Posts receivables once sent.
    Invoice,
}

impl DocumentType {
    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quotation => "quotation",
            Self::Invoice => "invoice",
        }
    }

    /// Prefix used for generated document numbers.
    #[must_use]
    pub const fn number_prefix(self) -> &'static str {
        match self {
            Self::Quotation => "QUO",
            Self::Invoice => "INV",
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document status.
///
/// Transitions are not enforced; callers may move a document to any status,
/// including back to `Draft`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Being prepared.
    Draft,
    /// Sent to the client.
    Sent,
    /// Quotation accepted (set by conversion).
    Accepted,
    /// Quotation no longer valid.
    Expired,
    /// Fully paid.
    Paid,
}

impl InvoiceStatus {
    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Accepted => "accepted",
            Self::Expired => "expired",
            Self::Paid => "paid",
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invoice header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Invoice ID.
    pub id: InvoiceId,
    /// Quotation or invoice. Fixed at creation.
    pub document_type: DocumentType,
    /// Caller-visible number, e.g. `INV 0012`. Uniqueness is not enforced.
    pub document_number: String,
    /// Document date.
    pub date: NaiveDate,
    /// Billed client.
    pub client_id: Option<ClientId>,
    /// Sum of item totals. Only ever computed from items.
    pub subtotal: Decimal,
    /// Absolute discount taken off the subtotal.
    pub discount: Decimal,
    /// Tax percentage applied after discount.
    pub tax_rate: Decimal,
    /// Shipping added after tax.
    pub shipping: Decimal,
    /// Amount already received.
    pub advance_paid: Decimal,
    /// Current status.
    pub status: InvoiceStatus,
    /// Free-form remarks.
    pub remarks: Option<String>,
    /// Source quotation when this invoice was produced by conversion.
    pub quotation_id: Option<InvoiceId>,
    /// Creation time; orders documents for numbering.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Derived monetary fields.
    #[must_use]
    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals::compute(
            self.subtotal,
            self.discount,
            self.tax_rate,
            self.shipping,
            self.advance_paid,
        )
    }

    /// Returns true if the document counts as recognized revenue: an
    /// invoice (never a quotation) that is sent or paid.
    #[must_use]
    pub fn is_recognized(&self) -> bool {
        self.document_type == DocumentType::Invoice
            && matches!(self.status, InvoiceStatus::Sent | InvoiceStatus::Paid)
    }
}

/// A line item. Owned by its invoice and replaced wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceItem {
    /// Item ID.
    pub id: InvoiceItemId,
    /// Owning invoice.
    pub invoice_id: InvoiceId,
    /// What was sold.
    pub description: String,
    /// Quantity.
    pub quantity: Decimal,
    /// Price per unit.
    pub unit_price: Decimal,
    /// `quantity * unit_price`.
    pub total: Decimal,
    /// Position within the document.
    pub sort_order: i32,
}

/// Caller-supplied line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceItemInput {
    /// What was sold.
    pub description: String,
    /// Quantity.
    pub quantity: Decimal,
    /// Price per unit.
    pub unit_price: Decimal,
}

impl InvoiceItemInput {
    /// Convenience constructor.
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
        }
    }

    /// Quantity and price rounded to stored precision.
    #[must_use]
    pub fn at_stored_precision(self) -> Self {
        Self {
            quantity: round_stored(self.quantity),
            unit_price: round_stored(self.unit_price),
            ..self
        }
    }
}

fn items_at_stored_precision(items: Vec<InvoiceItemInput>) -> Vec<InvoiceItemInput> {
    items
        .into_iter()
        .map(InvoiceItemInput::at_stored_precision)
        .collect()
}

/// An invoice together with its items, sorted by `sort_order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceWithItems {
    /// Header.
    #[serde(flatten)]
    pub invoice: Invoice,
    /// Line items.
    pub items: Vec<InvoiceItem>,
}

impl InvoiceWithItems {
    /// Derived monetary fields of the header.
    #[must_use]
    pub fn totals(&self) -> InvoiceTotals {
        self.invoice.totals()
    }
}

/// Input for creating a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateInvoiceInput {
    /// Quotation or invoice.
    pub document_type: DocumentType,
    /// Caller-supplied number.
    pub document_number: String,
    /// Document date.
    pub date: NaiveDate,
    /// Billed client.
    pub client_id: Option<ClientId>,
    /// Discount.
    #[serde(default)]
    pub discount: Decimal,
    /// Tax percentage.
    #[serde(default)]
    pub tax_rate: Decimal,
    /// Shipping.
    #[serde(default)]
    pub shipping: Decimal,
    /// Amount already received. Never posts on create.
    #[serde(default)]
    pub advance_paid: Decimal,
    /// Initial status; `Draft` when omitted.
    pub status: Option<InvoiceStatus>,
    /// Remarks.
    pub remarks: Option<String>,
    /// Source quotation link.
    pub quotation_id: Option<InvoiceId>,
    /// Line items.
    #[serde(default)]
    pub items: Vec<InvoiceItemInput>,
}

impl CreateInvoiceInput {
    /// A draft with no charges beyond its items.
    pub fn new(
        document_type: DocumentType,
        document_number: impl Into<String>,
        date: NaiveDate,
        items: Vec<InvoiceItemInput>,
    ) -> Self {
        Self {
            document_type,
            document_number: document_number.into(),
            date,
            client_id: None,
            discount: Decimal::ZERO,
            tax_rate: Decimal::ZERO,
            shipping: Decimal::ZERO,
            advance_paid: Decimal::ZERO,
            status: None,
            remarks: None,
            quotation_id: None,
            items,
        }
    }

    /// Every amount, rate and quantity rounded to stored precision.
    #[must_use]
    pub fn at_stored_precision(self) -> Self {
        Self {
            discount: round_stored(self.discount),
            tax_rate: round_stored(self.tax_rate),
            shipping: round_stored(self.shipping),
            advance_paid: round_stored(self.advance_paid),
            items: items_at_stored_precision(self.items),
            ..self
        }
    }
}

/// Partial update of a document. Unset fields keep their stored value.
///
/// Nullable fields use `Option<Option<_>>`: `Some(None)` clears the value.
/// The document type cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateInvoiceInput {
    /// New number.
    pub document_number: Option<String>,
    /// New date; also dates any synthesized ledger entry.
    pub date: Option<NaiveDate>,
    /// New client.
    pub client_id: Option<Option<ClientId>>,
    /// New discount.
    pub discount: Option<Decimal>,
    /// New tax percentage.
    pub tax_rate: Option<Decimal>,
    /// New shipping.
    pub shipping: Option<Decimal>,
    /// New advance. A change posts a payment transfer once recognized.
    pub advance_paid: Option<Decimal>,
    /// New status.
    pub status: Option<InvoiceStatus>,
    /// New remarks.
    pub remarks: Option<Option<String>>,
    /// Replacement items; recomputes the subtotal.
    pub items: Option<Vec<InvoiceItemInput>>,
    /// Account receiving payment movements. Without it, advance changes
    /// are stored but not posted.
    pub payment_account_id: Option<AccountId>,
}

impl UpdateInvoiceInput {
    /// Every supplied amount, rate and quantity rounded to stored precision.
    #[must_use]
    pub fn at_stored_precision(self) -> Self {
        Self {
            discount: self.discount.map(round_stored),
            tax_rate: self.tax_rate.map(round_stored),
            shipping: self.shipping.map(round_stored),
            advance_paid: self.advance_paid.map(round_stored),
            items: self.items.map(items_at_stored_precision),
            ..self
        }
    }
}

/// Filter for listing documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceFilter {
    /// Only this document type.
    pub document_type: Option<DocumentType>,
    /// Only this status.
    pub status: Option<InvoiceStatus>,
    /// Only this client.
    pub client_id: Option<ClientId>,
}

impl InvoiceFilter {
    /// Returns true if the invoice passes every set criterion.
    #[must_use]
    pub fn matches(&self, invoice: &Invoice) -> bool {
        self.document_type.is_none_or(|t| invoice.document_type == t)
            && self.status.is_none_or(|s| invoice.status == s)
            && self.client_id.is_none_or(|c| invoice.client_id == Some(c))
    }
}
