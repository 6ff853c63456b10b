//! Validation rules for manually recorded ledger entries.
//!
//! Entries synthesized by the posting engine bypass these rules: they may
//! carry negative amounts (reversals) and are always invoice-linked.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::NewLedgerEntry;

/// Ledger service with pure validation logic.
pub struct LedgerService;

impl LedgerService {
    /// Validates a user-entered entry before it is persisted.
    ///
    /// # Errors
    ///
    /// Returns the first rule the entry breaks.
    pub fn validate_manual_entry(entry: &NewLedgerEntry) -> Result<(), LedgerError> {
        Self::validate_amount(entry.amount)?;

        if entry.invoice_id.is_some() {
            return Err(LedgerError::InvoiceLinked);
        }

        match (entry.kind.is_two_sided(), entry.to_account_id) {
            (true, None) => Err(LedgerError::MissingCounterAccount(entry.kind.as_str())),
            (true, Some(to)) if to == entry.account_id => {
                Err(LedgerError::SameAccountTransfer(to))
            }
            (false, Some(_)) => Err(LedgerError::UnexpectedCounterAccount(entry.kind.as_str())),
            _ => Ok(()),
        }
    }

    /// Manual amounts must be strictly positive.
    ///
    /// # Errors
    ///
    /// Returns `ZeroAmount` or `NegativeAmount`.
    pub fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
        if amount.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        if amount.is_sign_negative() {
            return Err(LedgerError::NegativeAmount);
        }
        Ok(())
    }
}
