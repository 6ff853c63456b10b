//! Dashboard summary types.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::{Account, LedgerEntry};

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day.
    pub from: NaiveDate,
    /// Last day.
    pub to: NaiveDate,
}

impl DateRange {
    /// Creates a range. The bounds are swapped if given in reverse.
    #[must_use]
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        if from <= to {
            Self { from, to }
        } else {
            Self { from: to, to: from }
        }
    }

    /// The calendar month containing `day`.
    #[must_use]
    pub fn month_of(day: NaiveDate) -> Self {
        let from = day.with_day(1).unwrap_or(day);
        let to = from
            .checked_add_months(chrono::Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(day);
        Self { from, to }
    }

    /// The current calendar month (UTC).
    #[must_use]
    pub fn current_month() -> Self {
        Self::month_of(chrono::Utc::now().date_naive())
    }

    /// Returns true if `day` falls inside the range.
    #[must_use]
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.from <= day && day <= self.to
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::current_month()
    }
}

/// Financial overview for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Period the flow figures cover.
    pub period: DateRange,
    /// Sum of asset balances.
    pub total_assets: Decimal,
    /// Sum of liability balances.
    pub total_liabilities: Decimal,
    /// `total_assets - total_liabilities`.
    pub net_worth: Decimal,
    /// Balance of the first configured cash account found.
    pub cash_balance: Decimal,
    /// Revenue entries in the period (adjustments included).
    pub revenue: Decimal,
    /// Expense entries in the period.
    pub expenses: Decimal,
    /// Capital entries in the period.
    pub capital: Decimal,
    /// `revenue - expenses`.
    pub net_profit: Decimal,
    /// Every account with its balance.
    pub account_balances: Vec<Account>,
    /// Most recently recorded entries, newest first.
    pub recent_entries: Vec<LedgerEntry>,
}
