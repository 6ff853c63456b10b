//! Invoice monetary computations.
//!
//! ```text
//! taxable     = subtotal - discount
//! tax         = taxable * tax_rate / 100
//! grand_total = taxable + tax + shipping
//! balance_due = grand_total - advance_paid
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{InvoiceId, InvoiceItemId, round_money};

use super::types::{InvoiceItem, InvoiceItemInput};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Derived monetary fields of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Sum of item totals.
    pub subtotal: Decimal,
    /// Discount.
    pub discount: Decimal,
    /// `subtotal - discount`.
    pub taxable: Decimal,
    /// Tax on the taxable amount.
    pub tax: Decimal,
    /// Shipping.
    pub shipping: Decimal,
    /// `taxable + tax + shipping`.
    pub grand_total: Decimal,
    /// Amount already received.
    pub advance_paid: Decimal,
    /// `grand_total - advance_paid`.
    pub balance_due: Decimal,
}

impl InvoiceTotals {
    /// Computes all derived fields. Tax is rounded to money precision.
    #[must_use]
    pub fn compute(
        subtotal: Decimal,
        discount: Decimal,
        tax_rate: Decimal,
        shipping: Decimal,
        advance_paid: Decimal,
    ) -> Self {
        let taxable = subtotal - discount;
        let tax = round_money(taxable * tax_rate / HUNDRED);
        let grand_total = round_money(taxable + tax + shipping);
        Self {
            subtotal,
            discount,
            taxable,
            tax,
            shipping,
            grand_total,
            advance_paid,
            balance_due: grand_total - advance_paid,
        }
    }
}

/// `quantity * unit_price` at money precision.
#[must_use]
pub fn line_total(quantity: Decimal, unit_price: Decimal) -> Decimal {
    round_money(quantity * unit_price)
}

/// Sum of line totals over caller-supplied items.
#[must_use]
pub fn subtotal_of(items: &[InvoiceItemInput]) -> Decimal {
    items
        .iter()
        .map(|item| line_total(item.quantity, item.unit_price))
        .sum()
}

/// Materializes caller items for an invoice, numbering them in order.
#[must_use]
pub fn build_items(invoice_id: InvoiceId, items: &[InvoiceItemInput]) -> Vec<InvoiceItem> {
    items
        .iter()
        .zip(0i32..)
        .map(|(item, sort_order)| InvoiceItem {
            id: InvoiceItemId::new(),
            invoice_id,
            description: item.description.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            total: line_total(item.quantity, item.unit_price),
            sort_order,
        })
        .collect()
}
