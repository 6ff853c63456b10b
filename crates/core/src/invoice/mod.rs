//! Invoice and quotation documents.
//!
//! - Document, item, and input types
//! - Monetary totals
//! - Sequential numbering
//! - Lifecycle errors

pub mod error;
pub mod numbering;
pub mod totals;
pub mod types;

pub use error::{InvoiceError, Step};
pub use numbering::next_number;
pub use totals::InvoiceTotals;
pub use types::{
    CreateInvoiceInput, DocumentType, Invoice, InvoiceFilter, InvoiceItem, InvoiceItemInput,
    InvoiceStatus, InvoiceWithItems, UpdateInvoiceInput,
};
