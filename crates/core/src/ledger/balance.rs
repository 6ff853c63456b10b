//! Account balance derivation.
//!
//! Balances are never stored as counters. Every read recomputes
//! `opening_balance + Σ effect` over the entries touching the account, so
//! deleting an invoice's entries unwinds its balances automatically.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::AccountId;

use super::types::LedgerEntry;

/// Balance of one account and the entries that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// The account ID.
    pub account_id: AccountId,
    /// Balance before any entry.
    pub opening_balance: Decimal,
    /// Sum of all increases.
    pub increases: Decimal,
    /// Sum of all decreases, as a positive number.
    pub decreases: Decimal,
    /// `opening_balance + increases - decreases`.
    pub balance: Decimal,
    /// Number of entries touching the account.
    pub entry_count: usize,
}

impl AccountBalance {
    /// Starts a balance at the opening amount.
    #[must_use]
    pub fn opening(account_id: AccountId, opening_balance: Decimal) -> Self {
        Self {
            account_id,
            opening_balance,
            increases: Decimal::ZERO,
            decreases: Decimal::ZERO,
            balance: opening_balance,
            entry_count: 0,
        }
    }

    /// Folds one entry into the balance. Entries not touching the account
    /// are ignored.
    pub fn apply(&mut self, entry: &LedgerEntry) {
        if !entry.touches(self.account_id) {
            return;
        }
        let effect = entry.effect_on(self.account_id);
        if effect.is_sign_negative() {
            self.decreases -= effect;
        } else {
            self.increases += effect;
        }
        self.balance += effect;
        self.entry_count += 1;
    }
}

/// Derives the balance of `account_id` from its opening amount and the
/// full entry log.
#[must_use]
pub fn derive_balance<'a, I>(account_id: AccountId, opening_balance: Decimal, entries: I) -> Decimal
where
    I: IntoIterator<Item = &'a LedgerEntry>,
{
    let mut balance = AccountBalance::opening(account_id, opening_balance);
    for entry in entries {
        balance.apply(entry);
    }
    balance.balance
}
