//! Signed amounts and per-account entry effects.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::AccountId;

use super::types::{LedgerEntry, TransactionKind};

/// Direction of a movement relative to the normal direction of its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Normal direction (positive stored amount).
    Increase,
    /// Reversed direction (negative stored amount).
    Decrease,
}

/// A non-negative magnitude tagged with a direction.
///
/// The posting engine works in these and only converts to the signed
/// storage form when an entry is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedAmount {
    /// Increase or decrease.
    pub direction: Direction,
    /// Absolute amount, never negative.
    pub magnitude: Decimal,
}

impl SignedAmount {
    /// A movement in the normal direction.
    #[must_use]
    pub fn increase(magnitude: Decimal) -> Self {
        Self {
            direction: Direction::Increase,
            magnitude: magnitude.abs(),
        }
    }

    /// A reversed movement.
    #[must_use]
    pub fn decrease(magnitude: Decimal) -> Self {
        Self {
            direction: Direction::Decrease,
            magnitude: magnitude.abs(),
        }
    }

    /// Splits a signed delta into direction and magnitude.
    ///
    /// Returns `None` for a zero delta, which never produces an entry.
    #[must_use]
    pub fn from_delta(delta: Decimal) -> Option<Self> {
        if delta.is_zero() {
            None
        } else if delta.is_sign_negative() {
            Some(Self::decrease(delta))
        } else {
            Some(Self::increase(delta))
        }
    }

    /// The movement for a whole amount rather than a change. Zero is an
    /// increase of nothing.
    #[must_use]
    pub fn from_total(total: Decimal) -> Self {
        if total < Decimal::ZERO {
            Self::decrease(total)
        } else {
            Self::increase(total)
        }
    }

    /// The signed storage form.
    #[must_use]
    pub fn to_signed(self) -> Decimal {
        match self.direction {
            Direction::Increase => self.magnitude,
            Direction::Decrease => -self.magnitude,
        }
    }
}

impl LedgerEntry {
    /// The change this entry makes to the balance of `account`.
    ///
    /// Revenue and capital add to their account, expense subtracts.
    /// Transfers and loans subtract from the source and add to the
    /// destination. A negative amount inverts all of the above.
    #[must_use]
    pub fn effect_on(&self, account: AccountId) -> Decimal {
        let mut effect = Decimal::ZERO;
        match self.kind {
            TransactionKind::Revenue | TransactionKind::Capital => {
                if self.account_id == account {
                    effect += self.amount;
                }
            }
            TransactionKind::Expense => {
                if self.account_id == account {
                    effect -= self.amount;
                }
            }
            TransactionKind::Transfer | TransactionKind::Loan => {
                if self.account_id == account {
                    effect -= self.amount;
                }
                if self.to_account_id == Some(account) {
                    effect += self.amount;
                }
            }
        }
        effect
    }

    /// Returns true if the entry moves money on `account`.
    #[must_use]
    pub fn touches(&self, account: AccountId) -> bool {
        self.account_id == account
            || (self.kind.is_two_sided() && self.to_account_id == Some(account))
    }
}
