//! `SeaORM` active enums backed by Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use tally_core::invoice as invoice_types;
use tally_core::ledger as ledger_types;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_kind")]
pub enum AccountKind {
    #[sea_orm(string_value = "asset")]
    Asset,
    #[sea_orm(string_value = "liability")]
    Liability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_kind")]
pub enum TransactionKind {
    #[sea_orm(string_value = "revenue")]
    Revenue,
    #[sea_orm(string_value = "expense")]
    Expense,
    #[sea_orm(string_value = "capital")]
    Capital,
    #[sea_orm(string_value = "transfer")]
    Transfer,
    #[sea_orm(string_value = "loan")]
    Loan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "document_type")]
pub enum DocumentType {
    #[sea_orm(string_value = "quotation")]
    Quotation,
    #[sea_orm(string_value = "invoice")]
    Invoice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_status")]
pub enum InvoiceStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "sent")]
    Sent,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "expired")]
    Expired,
    #[sea_orm(string_value = "paid")]
    Paid,
}

impl From<ledger_types::AccountKind> for AccountKind {
    fn from(kind: ledger_types::AccountKind) -> Self {
        match kind {
            ledger_types::AccountKind::Asset => Self::Asset,
            ledger_types::AccountKind::Liability => Self::Liability,
        }
    }
}

impl From<AccountKind> for ledger_types::AccountKind {
    fn from(kind: AccountKind) -> Self {
        match kind {
            AccountKind::Asset => Self::Asset,
            AccountKind::Liability => Self::Liability,
        }
    }
}

impl From<ledger_types::TransactionKind> for TransactionKind {
    fn from(kind: ledger_types::TransactionKind) -> Self {
        match kind {
            ledger_types::TransactionKind::Revenue => Self::Revenue,
            ledger_types::TransactionKind::Expense => Self::Expense,
            ledger_types::TransactionKind::Capital => Self::Capital,
            ledger_types::TransactionKind::Transfer => Self::Transfer,
            ledger_types::TransactionKind::Loan => Self::Loan,
        }
    }
}

impl From<TransactionKind> for ledger_types::TransactionKind {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Revenue => Self::Revenue,
            TransactionKind::Expense => Self::Expense,
            TransactionKind::Capital => Self::Capital,
            TransactionKind::Transfer => Self::Transfer,
            TransactionKind::Loan => Self::Loan,
        }
    }
}

impl From<invoice_types::DocumentType> for DocumentType {
    fn from(document_type: invoice_types::DocumentType) -> Self {
        match document_type {
            invoice_types::DocumentType::Quotation => Self::Quotation,
            invoice_types::DocumentType::Invoice => Self::Invoice,
        }
    }
}

impl From<DocumentType> for invoice_types::DocumentType {
    fn from(document_type: DocumentType) -> Self {
        match document_type {
            DocumentType::Quotation => Self::Quotation,
            DocumentType::Invoice => Self::Invoice,
        }
    }
}

impl From<invoice_types::InvoiceStatus> for InvoiceStatus {
    fn from(status: invoice_types::InvoiceStatus) -> Self {
        match status {
            invoice_types::InvoiceStatus::Draft => Self::Draft,
            invoice_types::InvoiceStatus::Sent => Self::Sent,
            invoice_types::InvoiceStatus::Accepted => Self::Accepted,
            invoice_types::InvoiceStatus::Expired => Self::Expired,
            invoice_types::InvoiceStatus::Paid => Self::Paid,
        }
    }
}

impl From<InvoiceStatus> for invoice_types::InvoiceStatus {
    fn from(status: InvoiceStatus) -> Self {
        match status {
            InvoiceStatus::Draft => Self::Draft,
            InvoiceStatus::Sent => Self::Sent,
            InvoiceStatus::Accepted => Self::Accepted,
            InvoiceStatus::Expired => Self::Expired,
            InvoiceStatus::Paid => Self::Paid,
        }
    }
}
