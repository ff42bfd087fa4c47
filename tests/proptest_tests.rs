//! Property-based tests for the tax engine and the lifecycle table.
//!
//! Run with: `cargo test --test proptest_tests`

use comprobante::core::*;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn product(id: u64) -> Product {
    Product {
        id: ProductId(id),
        code: format!("P-{id}"),
        description: "Producto".into(),
        unit_price: Decimal::ZERO,
        unit_code: "NIU".into(),
        active: true,
    }
}

/// Quantities 0.001..=9999.999 and prices 0.00..=99999.99.
fn arb_line() -> impl Strategy<Value = (Decimal, Decimal)> {
    (1i64..=9_999_999, 0i64..=9_999_999).prop_map(|(q, p)| (Decimal::new(q, 3), Decimal::new(p, 2)))
}

fn arb_items() -> impl Strategy<Value = Vec<LineItem>> {
    prop::collection::vec(arb_line(), 1..20).prop_map(|lines| {
        lines
            .into_iter()
            .enumerate()
            .map(|(i, (q, p))| LineItem::snapshot(&product(i as u64), q, p).unwrap())
            .collect()
    })
}

fn arb_kind() -> impl Strategy<Value = DocumentKind> {
    prop_oneof![Just(DocumentKind::Sale), Just(DocumentKind::ProfessionalFee)]
}

fn arb_status() -> impl Strategy<Value = DocumentStatus> {
    prop_oneof![
        Just(DocumentStatus::Created),
        Just(DocumentStatus::XmlGenerated),
        Just(DocumentStatus::Signed),
        Just(DocumentStatus::Sent),
        Just(DocumentStatus::Accepted),
        Just(DocumentStatus::Rejected),
        Just(DocumentStatus::Annulled),
    ]
}

fn arb_transition() -> impl Strategy<Value = Transition> {
    prop_oneof![
        Just(Transition::GenerateXml),
        Just(Transition::Sign),
        Just(Transition::Send),
        Just(Transition::Accept),
        Just(Transition::Reject),
        Just(Transition::Annul),
    ]
}

proptest! {
    #[test]
    fn breakdown_identity_holds(items in arb_items(), kind in arb_kind()) {
        let b = compute_breakdown(&items, kind).unwrap();
        prop_assert!(b.is_consistent());
        prop_assert_eq!(b.subtotal + b.tax_amount - b.retention_amount, b.total_amount);
        prop_assert!(b.subtotal.scale() <= 2);
        prop_assert!(b.tax_amount.scale() <= 2);
        prop_assert!(b.retention_amount.scale() <= 2);
    }

    #[test]
    fn breakdown_is_deterministic(items in arb_items(), kind in arb_kind()) {
        prop_assert_eq!(
            compute_breakdown(&items, kind).unwrap(),
            compute_breakdown(&items, kind).unwrap()
        );
    }

    #[test]
    fn kind_rules(items in arb_items()) {
        let sale = compute_breakdown(&items, DocumentKind::Sale).unwrap();
        prop_assert_eq!(sale.retention_amount, Decimal::ZERO);

        let fee = compute_breakdown(&items, DocumentKind::ProfessionalFee).unwrap();
        prop_assert_eq!(fee.tax_amount, Decimal::ZERO);
        prop_assert_eq!(fee.subtotal, sale.subtotal);
        let rates = TaxRates::default();
        if fee.subtotal <= rates.retention_threshold {
            prop_assert_eq!(fee.retention_amount, Decimal::ZERO);
        } else {
            prop_assert!(fee.retention_amount > Decimal::ZERO);
        }
    }

    #[test]
    fn line_order_does_not_matter(items in arb_items(), kind in arb_kind()) {
        let mut reversed = items.clone();
        reversed.reverse();
        prop_assert_eq!(
            compute_breakdown(&items, kind).unwrap(),
            compute_breakdown(&reversed, kind).unwrap()
        );
    }

    #[test]
    fn terminal_statuses_never_move(status in arb_status(), t in arb_transition()) {
        if status.is_terminal() {
            prop_assert!(status.apply(t).is_err());
        }
        if let Ok(next) = status.apply(t) {
            prop_assert_ne!(next, status);
        }
    }

    #[test]
    fn next_action_is_always_legal(status in arb_status()) {
        if let Some(action) = next_legal_action(status) {
            prop_assert_eq!(status.apply(action.transition()).unwrap(), action.target_status());
        }
    }
}
