//! Ledger error types.

use tally_shared::AppError;
use tally_shared::types::AccountId;
use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Entry amount cannot be zero.
    #[error("Entry amount cannot be zero")]
    ZeroAmount,

    /// Manual entry amounts must be positive.
    #[error("Entry amount cannot be negative")]
    NegativeAmount,

    /// Transfers and loans need a destination account.
    #[error("{0} entries require a destination account")]
    MissingCounterAccount(&'static str),

    /// Only transfers and loans may name a destination account.
    #[error("{0} entries cannot have a destination account")]
    UnexpectedCounterAccount(&'static str),

    /// Source and destination are the same account.
    #[error("Cannot move money from account {0} to itself")]
    SameAccountTransfer(AccountId),

    /// Invoice-linked entries are written by the posting engine only.
    #[error("Invoice-linked entries cannot be recorded manually")]
    InvoiceLinked,

    // ========== Lookup Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    // ========== Store Errors ==========
    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::MissingCounterAccount(_) => "MISSING_COUNTER_ACCOUNT",
            Self::UnexpectedCounterAccount(_) => "UNEXPECTED_COUNTER_ACCOUNT",
            Self::SameAccountTransfer(_) => "SAME_ACCOUNT_TRANSFER",
            Self::InvoiceLinked => "INVOICE_LINKED",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::Store(e) => e.error_code(),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::AccountNotFound(_) => Self::NotFound(err.to_string()),
            LedgerError::Store(StoreError::Constraint(msg)) => Self::Conflict(msg),
            LedgerError::Store(StoreError::Closed) => Self::Internal(err.to_string()),
            LedgerError::Store(e) => Self::Database(e.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}
