//! Property-based tests for the posting planner.
//!
//! - Recognized revenue always equals the latest grand total
//! - Posted payments equal the advance received since recognition
//! - Quotations never post

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::{AccountId, InvoiceId};

use super::plan::{PostingPlanner, PostingPurpose};
use crate::invoice::{DocumentType, Invoice, InvoiceStatus};
use crate::ledger::TransactionKind;

/// Amounts from 0.00 to 5,000.00.
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..500_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn tax_rate() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        Just(Decimal::ZERO),
        Just(Decimal::new(5, 0)),
        Just(Decimal::new(75, 1)),
        Just(Decimal::new(20, 0)),
    ]
}

/// One edit: subtotal, tax rate, advance.
fn edit() -> impl Strategy<Value = (Decimal, Decimal, Decimal)> {
    (amount(), tax_rate(), amount())
}

fn header(document_type: DocumentType, status: InvoiceStatus) -> Invoice {
    Invoice {
        id: InvoiceId::new(),
        document_type,
        document_number: "INV 0042".to_string(),
        date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
        client_id: None,
        subtotal: Decimal::ZERO,
        discount: Decimal::ZERO,
        tax_rate: Decimal::ZERO,
        shipping: Decimal::ZERO,
        advance_paid: Decimal::ZERO,
        status,
        remarks: None,
        quotation_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Draft edits followed by sending and further sent or paid edits:
    /// revenue postings always sum to the final grand total, and payment
    /// postings to the advance received from the send onwards.
    #[test]
    fn prop_revenue_tracks_grand_total(
        drafts in prop::collection::vec(edit(), 0..5),
        sent in prop::collection::vec((edit(), any::<bool>()), 1..8),
    ) {
        let bank = AccountId::new();
        let mut current = header(DocumentType::Invoice, InvoiceStatus::Draft);
        let mut revenue = Decimal::ZERO;
        let mut payments = Decimal::ZERO;

        for (subtotal, tax_rate, advance_paid) in drafts {
            let next = Invoice { subtotal, tax_rate, advance_paid, ..current.clone() };
            let plan = PostingPlanner::for_update(&current, &next, Some(bank));
            prop_assert!(plan.is_empty());
            current = next;
        }
        let advance_before_send = current.advance_paid;

        for ((subtotal, tax_rate, advance_paid), paid) in sent {
            let status = if paid { InvoiceStatus::Paid } else { InvoiceStatus::Sent };
            let next = Invoice { subtotal, tax_rate, advance_paid, status, ..current.clone() };
            for posting in PostingPlanner::for_update(&current, &next, Some(bank)) {
                match posting.kind {
                    TransactionKind::Revenue => revenue += posting.amount.to_signed(),
                    TransactionKind::Transfer => payments += posting.amount.to_signed(),
                    other => prop_assert!(false, "unexpected kind {other}"),
                }
            }
            current = next;
        }

        prop_assert_eq!(revenue, current.totals().grand_total);
        prop_assert_eq!(payments, current.advance_paid - advance_before_send);
    }

    /// At most one posting per purpose. Magnitudes are never negative, and
    /// only a recognition may be zero.
    #[test]
    fn prop_one_posting_per_purpose(
        old_edit in edit(),
        new_edit in edit(),
        old_status in prop_oneof![Just(InvoiceStatus::Draft), Just(InvoiceStatus::Sent), Just(InvoiceStatus::Paid)],
        new_status in prop_oneof![Just(InvoiceStatus::Draft), Just(InvoiceStatus::Sent), Just(InvoiceStatus::Paid)],
    ) {
        let base = header(DocumentType::Invoice, old_status);
        let old = Invoice { subtotal: old_edit.0, tax_rate: old_edit.1, advance_paid: old_edit.2, ..base };
        let new = Invoice {
            subtotal: new_edit.0,
            tax_rate: new_edit.1,
            advance_paid: new_edit.2,
            status: new_status,
            ..old.clone()
        };

        let plan = PostingPlanner::for_update(&old, &new, Some(AccountId::new()));
        for purpose in [PostingPurpose::Recognition, PostingPurpose::Adjustment, PostingPurpose::Payment] {
            prop_assert!(plan.iter().filter(|p| p.purpose == purpose).count() <= 1);
        }
        prop_assert!(plan.iter().all(|p| p.amount.magnitude >= Decimal::ZERO));
        prop_assert!(
            plan.iter()
                .filter(|p| p.purpose != PostingPurpose::Recognition)
                .all(|p| p.amount.magnitude > Decimal::ZERO)
        );
        let has = |purpose: PostingPurpose| plan.iter().any(|p| p.purpose == purpose);
        prop_assert!(!(has(PostingPurpose::Recognition) && has(PostingPurpose::Adjustment)));
        if old.is_recognized() {
            prop_assert!(plan.iter().all(|p| p.purpose != PostingPurpose::Recognition));
        }
    }

    /// Quotations never post, whatever the status or edits.
    #[test]
    fn prop_quotations_never_post(
        old_edit in edit(),
        new_edit in edit(),
        status in prop_oneof![Just(InvoiceStatus::Sent), Just(InvoiceStatus::Paid), Just(InvoiceStatus::Accepted)],
    ) {
        let base = header(DocumentType::Quotation, InvoiceStatus::Draft);
        let old = Invoice { subtotal: old_edit.0, tax_rate: old_edit.1, advance_paid: old_edit.2, ..base };
        let new = Invoice { subtotal: new_edit.0, tax_rate: new_edit.1, advance_paid: new_edit.2, status, ..old.clone() };

        prop_assert!(PostingPlanner::for_create(&new).is_empty());
        prop_assert!(PostingPlanner::for_update(&old, &new, Some(AccountId::new())).is_empty());
        prop_assert!(PostingPlanner::for_update(&new, &old, Some(AccountId::new())).is_empty());
    }
}
