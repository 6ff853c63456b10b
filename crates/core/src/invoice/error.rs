//! Invoice lifecycle errors.

use tally_shared::AppError;
use thiserror::Error;

use crate::store::StoreError;

/// The sub-step of a multi-step operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Opening the unit of work.
    Begin,
    /// Reading the current invoice header.
    LoadInvoice,
    /// Writing the invoice header.
    WriteHeader,
    /// Replacing line items.
    ReplaceItems,
    /// Finding or creating the receivables or payment account.
    ResolveAccount,
    /// Finding or creating the sales category.
    ResolveCategory,
    /// Writing a ledger entry.
    PostEntry,
    /// Deleting the invoice's ledger entries.
    DeleteEntries,
    /// Deleting line items.
    DeleteItems,
    /// Deleting the invoice header.
    DeleteInvoice,
    /// Computing the next document number.
    AllocateNumber,
    /// Reading the result back.
    Reload,
    /// Committing the unit of work.
    Commit,
}

impl Step {
    /// Human-readable step name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Begin => "begin transaction",
            Self::LoadInvoice => "load invoice",
            Self::WriteHeader => "write invoice header",
            Self::ReplaceItems => "replace invoice items",
            Self::ResolveAccount => "resolve account",
            Self::ResolveCategory => "resolve sales category",
            Self::PostEntry => "post ledger entry",
            Self::DeleteEntries => "delete ledger entries",
            Self::DeleteItems => "delete invoice items",
            Self::DeleteInvoice => "delete invoice",
            Self::AllocateNumber => "allocate document number",
            Self::Reload => "reload invoice",
            Self::Commit => "commit transaction",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by invoice operations.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// A referenced row does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// What was looked up (`invoice`, `quotation`, `account`).
        entity: &'static str,
        /// The missing ID.
        id: String,
    },

    /// The request is not acceptable.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The store failed during `step`. Nothing was committed.
    #[error("failed to {step}: {source}")]
    Store {
        /// The failing step.
        step: Step,
        /// Underlying error.
        #[source]
        source: StoreError,
    },
}

impl InvoiceError {
    /// Creates a not found error.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Store { .. } => "STORE_FAILURE",
        }
    }

    /// The failing step, for store failures.
    #[must_use]
    pub const fn step(&self) -> Option<Step> {
        match self {
            Self::Store { step, .. } => Some(*step),
            _ => None,
        }
    }
}

/// Attaches the failing step to a store result.
pub(crate) trait StepContext<T> {
    fn during(self, step: Step) -> Result<T, InvoiceError>;
}

impl<T> StepContext<T> for Result<T, StoreError> {
    fn during(self, step: Step) -> Result<T, InvoiceError> {
        self.map_err(|source| InvoiceError::Store { step, source })
    }
}

impl From<InvoiceError> for AppError {
    fn from(err: InvoiceError) -> Self {
        match err {
            InvoiceError::NotFound { .. } => Self::NotFound(err.to_string()),
            InvoiceError::Validation(msg) => Self::Validation(msg),
            InvoiceError::Store {
                source: StoreError::Constraint(_),
                ..
            } => Self::Conflict(err.to_string()),
            InvoiceError::Store {
                source: StoreError::Closed,
                ..
            } => Self::Internal(err.to_string()),
            InvoiceError::Store { .. } => Self::Database(err.to_string()),
        }
    }
}
