//! Decimal money helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every amount in the system is a `rust_decimal::Decimal`.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places stored for monetary amounts (`NUMERIC(19,4)`).
pub const MONEY_SCALE: u32 = 4;

/// Rounds a derived amount to the stored precision using Banker's Rounding.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount
        .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
        .normalize()
}

/// Rounds a caller-supplied value to the stored precision, half away from
/// zero, matching what a `NUMERIC(_, 4)` column keeps on insert.
///
/// Inputs go through this once before anything is derived from them, so
/// the value computed with is the value read back.
#[must_use]
pub fn round_stored(amount: Decimal) -> Decimal {
    amount
        .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}
