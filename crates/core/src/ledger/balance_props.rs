//! Property-based tests for balance derivation.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::{AccountId, EntryId};

use super::balance::{AccountBalance, derive_balance};
use super::types::{LedgerEntry, TransactionKind};

/// Signed amounts from -10,000.00 to 10,000.00.
fn signed_amount() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn kind_strategy() -> impl Strategy<Value = TransactionKind> {
    prop_oneof![
        Just(TransactionKind::Revenue),
        Just(TransactionKind::Expense),
        Just(TransactionKind::Capital),
        Just(TransactionKind::Transfer),
        Just(TransactionKind::Loan),
    ]
}

/// Builds a log over a fixed set of accounts from index tuples.
fn build_log(accounts: &[AccountId], raw: &[(TransactionKind, Decimal, usize, usize)]) -> Vec<LedgerEntry> {
    raw.iter()
        .map(|&(kind, amount, from, to)| {
            let from = accounts[from % accounts.len()];
            let mut to = accounts[to % accounts.len()];
            if to == from {
                to = accounts[(accounts.iter().position(|a| *a == from).unwrap_or(0) + 1) % accounts.len()];
            }
            LedgerEntry {
                id: EntryId::new(),
                date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                kind,
                category_id: None,
                amount,
                account_id: from,
                to_account_id: kind.is_two_sided().then_some(to),
                client_id: None,
                invoice_id: None,
                description: String::new(),
            }
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Transfers and loans only move money, so the sum of all balances
    /// changes by the single-sided entries alone.
    #[test]
    fn prop_two_sided_entries_net_to_zero(
        raw in prop::collection::vec((kind_strategy(), signed_amount(), 0usize..4, 0usize..4), 0..40),
    ) {
        let accounts: Vec<AccountId> = (0..4).map(|_| AccountId::new()).collect();
        let log = build_log(&accounts, &raw);

        let total: Decimal = accounts
            .iter()
            .map(|a| derive_balance(*a, Decimal::ZERO, &log))
            .sum();
        let single_sided: Decimal = log
            .iter()
            .map(|e| match e.kind {
                TransactionKind::Revenue | TransactionKind::Capital => e.amount,
                TransactionKind::Expense => -e.amount,
                TransactionKind::Transfer | TransactionKind::Loan => Decimal::ZERO,
            })
            .sum();

        prop_assert_eq!(total, single_sided);
    }

    /// Removing a subset of entries and re-deriving equals subtracting
    /// their effects from the full balance.
    #[test]
    fn prop_removal_unwinds_exactly(
        raw in prop::collection::vec((kind_strategy(), signed_amount(), 0usize..3, 0usize..3), 1..30),
        split in 0usize..30,
        opening in signed_amount(),
    ) {
        let accounts: Vec<AccountId> = (0..3).map(|_| AccountId::new()).collect();
        let log = build_log(&accounts, &raw);
        let split = split % (log.len() + 1);
        let (kept, removed) = log.split_at(split);

        for account in &accounts {
            let full = derive_balance(*account, opening, &log);
            let removed_effect: Decimal = removed.iter().map(|e| e.effect_on(*account)).sum();
            prop_assert_eq!(derive_balance(*account, opening, kept), full - removed_effect);
        }
    }

    /// The running breakdown always reconciles with the net balance.
    #[test]
    fn prop_breakdown_reconciles(
        raw in prop::collection::vec((kind_strategy(), signed_amount(), 0usize..2, 0usize..2), 0..30),
        opening in signed_amount(),
    ) {
        let accounts: Vec<AccountId> = (0..2).map(|_| AccountId::new()).collect();
        let log = build_log(&accounts, &raw);

        let mut balance = AccountBalance::opening(accounts[0], opening);
        for entry in &log {
            balance.apply(entry);
        }

        prop_assert!(balance.increases >= Decimal::ZERO);
        prop_assert!(balance.decreases >= Decimal::ZERO);
        prop_assert_eq!(balance.balance, opening + balance.increases - balance.decreases);
        prop_assert_eq!(balance.balance, derive_balance(accounts[0], opening, &log));
    }
}
