use rust_decimal::Decimal;

use super::types::{DashboardSummary, DateRange};
use crate::ledger::{Account, AccountKind, LedgerEntry, TransactionKind};

/// Number of entries listed under recent activity.
pub const RECENT_ENTRIES: usize = 10;

/// Builds the dashboard from account balances and the full entry log.
///
/// Flow figures (revenue, expenses, capital) sum the signed amounts of
/// entries dated within `period`, so negative AR adjustments reduce
/// revenue. `cash_accounts` is searched in order; the first asset account
/// with a matching name supplies the cash balance.
#[must_use]
pub fn summarize(
    period: DateRange,
    accounts: Vec<Account>,
    entries: &[LedgerEntry],
    cash_accounts: &[String],
) -> DashboardSummary {
    let sum_kind = |kind: AccountKind| -> Decimal {
        accounts
            .iter()
            .filter(|a| a.kind == kind)
            .map(|a| a.balance)
            .sum()
    };
    let total_assets = sum_kind(AccountKind::Asset);
    let total_liabilities = sum_kind(AccountKind::Liability);

    let cash_balance = cash_accounts
        .iter()
        .find_map(|name| {
            accounts
                .iter()
                .find(|a| a.kind == AccountKind::Asset && &a.name == name)
        })
        .map_or(Decimal::ZERO, |a| a.balance);

    let flow = |kind: TransactionKind| -> Decimal {
        entries
            .iter()
            .filter(|e| e.kind == kind && period.contains(e.date))
            .map(|e| e.amount)
            .sum()
    };
    let revenue = flow(TransactionKind::Revenue);
    let expenses = flow(TransactionKind::Expense);
    let capital = flow(TransactionKind::Capital);

    let mut recent_entries = entries.to_vec();
    recent_entries.sort_by(|a, b| b.id.cmp(&a.id));
    recent_entries.truncate(RECENT_ENTRIES);

    DashboardSummary {
        period,
        total_assets,
        total_liabilities,
        net_worth: total_assets - total_liabilities,
        cash_balance,
        revenue,
        expenses,
        capital,
        net_profit: revenue - expenses,
        account_balances: accounts,
        recent_entries,
    }
}
