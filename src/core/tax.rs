use rust_decimal::{Decimal, RoundingStrategy};

use super::config::{MONEY_SCALE, TaxRates};
use super::error::{ComprobanteError, Result};
use super::types::*;

/// Compute the monetary breakdown of `items` under `kind` with the statutory
/// rates.
///
/// ```
/// use comprobante::core::*;
/// use rust_decimal_macros::dec;
///
/// let item = LineItem {
///     product_id: ProductId(1),
///     product_code: "P-1".into(),
///     description: "Widget".into(),
///     unit_code: "NIU".into(),
///     quantity: dec!(4),
///     unit_value: dec!(25),
/// };
/// let b = compute_breakdown(&[item], DocumentKind::Sale).unwrap();
/// assert_eq!(b.tax_amount, dec!(18.00));
/// assert_eq!(b.total_amount, dec!(118.00));
/// ```
pub fn compute_breakdown(items: &[LineItem], kind: DocumentKind) -> Result<MonetaryBreakdown> {
    compute_breakdown_with(items, kind, &TaxRates::default())
}

/// Same as [`compute_breakdown`] with explicit rates.
///
/// The subtotal is rounded once, after summing the unrounded line totals.
/// IGV and retention are each rounded half-up to two places.
pub fn compute_breakdown_with(
    items: &[LineItem],
    kind: DocumentKind,
    rates: &TaxRates,
) -> Result<MonetaryBreakdown> {
    if items.is_empty() {
        return Err(ComprobanteError::InvalidLineItem(
            "at least one line item is required".into(),
        ));
    }

    let mut sum = Decimal::ZERO;
    for (i, item) in items.iter().enumerate() {
        check_line(item, i)?;
        sum = item
            .checked_line_total()
            .and_then(|total| sum.checked_add(total))
            .ok_or_else(|| overflow(i))?;
    }
    let subtotal = round_half_up(sum);

    let breakdown = match kind {
        DocumentKind::Sale => {
            let tax_amount = round_half_up(
                subtotal
                    .checked_mul(rates.igv_rate)
                    .ok_or_else(|| overflow(items.len() - 1))?,
            );
            MonetaryBreakdown {
                subtotal,
                tax_amount,
                retention_amount: Decimal::ZERO,
                total_amount: subtotal
                    .checked_add(tax_amount)
                    .ok_or_else(|| overflow(items.len() - 1))?,
            }
        }
        DocumentKind::ProfessionalFee => {
            let retention_amount = if retention_applies(subtotal, rates) {
                round_half_up(
                    subtotal
                        .checked_mul(rates.retention_rate)
                        .ok_or_else(|| overflow(items.len() - 1))?,
                )
            } else {
                Decimal::ZERO
            };
            MonetaryBreakdown {
                subtotal,
                tax_amount: Decimal::ZERO,
                retention_amount,
                total_amount: subtotal - retention_amount,
            }
        }
    };

    Ok(breakdown)
}

/// Whether a fee receipt with this subtotal is subject to retention.
pub fn retention_applies(subtotal: Decimal, rates: &TaxRates) -> bool {
    subtotal > rates.retention_threshold
}

/// Round to [`MONEY_SCALE`] places using half-up (commercial rounding).
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

fn check_line(item: &LineItem, index: usize) -> Result<()> {
    if item.quantity <= Decimal::ZERO {
        return Err(ComprobanteError::InvalidLineItem(format!(
            "line {index}: quantity must be greater than zero, got {}",
            item.quantity
        )));
    }
    if item.unit_value < Decimal::ZERO {
        return Err(ComprobanteError::InvalidLineItem(format!(
            "line {index}: unit value must not be negative, got {}",
            item.unit_value
        )));
    }
    Ok(())
}

fn overflow(index: usize) -> ComprobanteError {
    ComprobanteError::InvalidLineItem(format!("line {index}: amount exceeds representable range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(quantity: Decimal, unit_value: Decimal) -> LineItem {
        LineItem {
            product_id: ProductId(1),
            product_code: "P-1".into(),
            description: "Item".into(),
            unit_code: "NIU".into(),
            quantity,
            unit_value,
        }
    }

    #[test]
    fn sale_applies_igv() {
        let b = compute_breakdown(&[item(dec!(1), dec!(100))], DocumentKind::Sale).unwrap();
        assert_eq!(b.subtotal, dec!(100.00));
        assert_eq!(b.tax_amount, dec!(18.00));
        assert_eq!(b.retention_amount, dec!(0));
        assert_eq!(b.total_amount, dec!(118.00));
    }

    #[test]
    fn fee_at_threshold_has_no_retention() {
        let b = compute_breakdown(&[item(dec!(1), dec!(1500.00))], DocumentKind::ProfessionalFee)
            .unwrap();
        assert_eq!(b.retention_amount, dec!(0));
        assert_eq!(b.tax_amount, dec!(0));
        assert_eq!(b.total_amount, dec!(1500.00));
    }

    #[test]
    fn fee_just_above_threshold_retains() {
        let b = compute_breakdown(&[item(dec!(1), dec!(1500.01))], DocumentKind::ProfessionalFee)
            .unwrap();
        // 1500.01 * 0.08 = 120.0008 → 120.00
        assert_eq!(b.retention_amount, dec!(120.00));
        assert_eq!(b.total_amount, dec!(1380.01));
    }

    #[test]
    fn subtotal_rounds_once_after_summation() {
        // Three lines of 0.005 each: per-line rounding would give 0.03,
        // summing first gives 0.015 → 0.02.
        let items = vec![
            item(dec!(1), dec!(0.005)),
            item(dec!(1), dec!(0.005)),
            item(dec!(1), dec!(0.005)),
        ];
        let b = compute_breakdown(&items, DocumentKind::ProfessionalFee).unwrap();
        assert_eq!(b.subtotal, dec!(0.02));
    }

    #[test]
    fn half_up_on_tax() {
        // 0.25 * 0.18 = 0.045 → 0.05
        let b = compute_breakdown(&[item(dec!(1), dec!(0.25))], DocumentKind::Sale).unwrap();
        assert_eq!(b.tax_amount, dec!(0.05));
        assert!(b.is_consistent());
    }

    #[test]
    fn empty_items_rejected() {
        assert!(matches!(
            compute_breakdown(&[], DocumentKind::Sale),
            Err(ComprobanteError::InvalidLineItem(_))
        ));
    }

    #[test]
    fn zero_quantity_rejected() {
        let err = compute_breakdown(&[item(dec!(0), dec!(10))], DocumentKind::Sale).unwrap_err();
        assert!(err.to_string().contains("quantity"));
    }

    #[test]
    fn negative_value_rejected() {
        assert!(compute_breakdown(&[item(dec!(1), dec!(-1))], DocumentKind::Sale).is_err());
    }

    #[test]
    fn zero_value_allowed() {
        let b = compute_breakdown(&[item(dec!(3), dec!(0))], DocumentKind::Sale).unwrap();
        assert_eq!(b.total_amount, dec!(0));
    }

    #[test]
    fn overflow_is_an_error_not_a_panic() {
        let err = compute_breakdown(&[item(Decimal::MAX, dec!(2))], DocumentKind::Sale).unwrap_err();
        assert!(err.to_string().contains("representable"));
    }

    #[test]
    fn custom_rates() {
        let rates = TaxRates {
            igv_rate: dec!(0.10),
            ..TaxRates::default()
        };
        let b = compute_breakdown_with(&[item(dec!(1), dec!(100))], DocumentKind::Sale, &rates)
            .unwrap();
        assert_eq!(b.tax_amount, dec!(10.00));
    }

    #[test]
    fn retention_follows_configured_threshold() {
        let rates = TaxRates {
            retention_threshold: dec!(1000),
            ..TaxRates::default()
        };
        assert!(retention_applies(dec!(1000.01), &rates));
        assert!(!retention_applies(dec!(1000.00), &rates));

        let b = compute_breakdown_with(
            &[item(dec!(1), dec!(1200))],
            DocumentKind::ProfessionalFee,
            &rates,
        )
        .unwrap();
        assert_eq!(b.retention_amount, dec!(96.00));
        assert_eq!(b.total_amount, dec!(1104.00));
    }
}
