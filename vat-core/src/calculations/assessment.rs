//! Re-assessment and unjust-refund derivation.
//!
//! Both tables compare an original declaration with its corrected counterpart
//! month by month and keep only the months where the correction moved money
//! against the taxpayer by more than [`AMOUNT_TOLERANCE`].
//!
//! [`AMOUNT_TOLERANCE`]: crate::calculations::common::AMOUNT_TOLERANCE

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{clamped_add, clamped_mul, clamped_sub, exceeds_tolerance};
use crate::models::{Declaration, LedgerRow, MONTHS, PenaltyMultiplier};

/// One month of additional payable VAT found by the correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReassessmentRow {
    /// Zero-based month index.
    pub month: usize,
    pub month_label: String,
    pub original_amount: Decimal,
    pub corrected_amount: Decimal,
    pub delta: Decimal,
    /// `delta` scaled by the penalty multiplier.
    pub penalty: Decimal,
}

/// One month of refund that the correction shows was not due.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnjustRefundRow {
    pub month: usize,
    pub month_label: String,
    pub delta: Decimal,
}

/// Column sums of a re-assessment table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReassessmentTotals {
    pub original_amount: Decimal,
    pub corrected_amount: Decimal,
    pub delta: Decimal,
    pub penalty: Decimal,
}

impl ReassessmentTotals {
    pub fn from_rows(rows: &[ReassessmentRow]) -> Self {
        rows.iter().fold(Self::default(), |acc, row| Self {
            original_amount: clamped_add(acc.original_amount, row.original_amount),
            corrected_amount: clamped_add(acc.corrected_amount, row.corrected_amount),
            delta: clamped_add(acc.delta, row.delta),
            penalty: clamped_add(acc.penalty, row.penalty),
        })
    }
}

/// Sum of the unjust refund deltas.
pub fn total_unjust_refund(rows: &[UnjustRefundRow]) -> Decimal {
    rows.iter()
        .fold(Decimal::ZERO, |acc, row| clamped_add(acc, row.delta))
}

/// Derives exposure tables from an original and a corrected declaration.
pub struct AssessmentDeriver;

impl AssessmentDeriver {
    /// Months whose payable VAT rose, with the penalty at `multiplier`.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use vat_core::calculations::AssessmentDeriver;
    /// use vat_core::models::{Declaration, LedgerRow, MetaData, PenaltyMultiplier};
    ///
    /// let labels = std::array::from_fn(|i| format!("M{}", i + 1));
    /// let mut original_payable = [dec!(0); 12];
    /// original_payable[11] = dec!(1000);
    /// let mut corrected_payable = original_payable;
    /// corrected_payable[11] = dec!(1500);
    ///
    /// let original = Declaration::new(MetaData::new(), labels.clone())
    ///     .with_values(LedgerRow::PayableVat.label(), original_payable);
    /// let corrected = Declaration::new(MetaData::new(), labels)
    ///     .with_values(LedgerRow::PayableVat.label(), corrected_payable);
    ///
    /// let rows =
    ///     AssessmentDeriver::derive_reassessment(&original, &corrected, PenaltyMultiplier::Triple);
    /// assert_eq!(rows.len(), 1);
    /// assert_eq!(rows[0].month_label, "M12");
    /// assert_eq!(rows[0].delta, dec!(500));
    /// assert_eq!(rows[0].penalty, dec!(1500));
    /// ```
    pub fn derive_reassessment(
        original: &Declaration,
        corrected: &Declaration,
        multiplier: PenaltyMultiplier,
    ) -> Vec<ReassessmentRow> {
        let factor = multiplier.factor();

        (0..MONTHS)
            .filter_map(|month| {
                let original_amount = original.ledger_amount(LedgerRow::PayableVat, month);
                let corrected_amount = corrected.ledger_amount(LedgerRow::PayableVat, month);
                let delta = clamped_sub(corrected_amount, original_amount);

                exceeds_tolerance(delta).then(|| ReassessmentRow {
                    month,
                    month_label: corrected.month_label(month).to_string(),
                    original_amount,
                    corrected_amount,
                    delta,
                    penalty: clamped_mul(delta, factor),
                })
            })
            .collect()
    }

    /// Months whose refund due fell.
    pub fn derive_unjust_refund(
        original: &Declaration,
        corrected: &Declaration,
    ) -> Vec<UnjustRefundRow> {
        (0..MONTHS)
            .filter_map(|month| {
                let delta = clamped_sub(
                    original.ledger_amount(LedgerRow::RefundDue, month),
                    corrected.ledger_amount(LedgerRow::RefundDue, month),
                );

                exceeds_tolerance(delta).then(|| UnjustRefundRow {
                    month,
                    month_label: corrected.month_label(month).to_string(),
                    delta,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::LedgerEngine;
    use crate::models::RawCorrectionInputs;
    use crate::test_support::{empty_declaration, opening_year};

    fn with_payable(payable: [Decimal; MONTHS]) -> Declaration {
        empty_declaration(2022).with_values(LedgerRow::PayableVat.label(), payable)
    }

    fn with_refund(refund: [Decimal; MONTHS]) -> Declaration {
        empty_declaration(2022).with_values(LedgerRow::RefundDue.label(), refund)
    }

    fn single_month(
        month: usize,
        amount: Decimal,
    ) -> [Decimal; MONTHS] {
        let mut values = [Decimal::ZERO; MONTHS];
        values[month] = amount;
        values
    }

    // =========================================================================
    // Re-assessment
    // =========================================================================

    #[test]
    fn december_increase_at_single_penalty() {
        let original = with_payable(single_month(11, dec!(1000)));
        let corrected = with_payable(single_month(11, dec!(1500)));

        let rows =
            AssessmentDeriver::derive_reassessment(&original, &corrected, PenaltyMultiplier::Single);

        assert_eq!(
            rows,
            vec![ReassessmentRow {
                month: 11,
                month_label: "Aralık".to_string(),
                original_amount: dec!(1000),
                corrected_amount: dec!(1500),
                delta: dec!(500),
                penalty: dec!(500),
            }]
        );
    }

    #[test]
    fn december_increase_at_triple_penalty() {
        let original = with_payable(single_month(11, dec!(1000)));
        let corrected = with_payable(single_month(11, dec!(1500)));

        let rows =
            AssessmentDeriver::derive_reassessment(&original, &corrected, PenaltyMultiplier::Triple);

        assert_eq!(rows[0].delta, dec!(500));
        assert_eq!(rows[0].penalty, dec!(1500));
    }

    #[test]
    fn reassessment_ignores_decreases_and_noise() {
        let mut original = [Decimal::ZERO; MONTHS];
        let mut corrected = [Decimal::ZERO; MONTHS];
        original[0] = dec!(400);
        corrected[0] = dec!(100);
        original[1] = dec!(100);
        corrected[1] = dec!(100.01);
        original[2] = dec!(100);
        corrected[2] = dec!(100.02);

        let rows = AssessmentDeriver::derive_reassessment(
            &with_payable(original),
            &with_payable(corrected),
            PenaltyMultiplier::Single,
        );

        let months: Vec<usize> = rows.iter().map(|r| r.month).collect();
        assert_eq!(months, vec![2]);
        assert_eq!(rows[0].delta, dec!(0.02));
    }

    #[test]
    fn reassessment_of_identical_declarations_is_empty() {
        let original = opening_year(2022);

        let rows =
            AssessmentDeriver::derive_reassessment(&original, &original, PenaltyMultiplier::Triple);

        assert_eq!(rows, vec![]);
    }

    #[test]
    fn reassessment_totals_sum_columns() {
        let mut original = [Decimal::ZERO; MONTHS];
        let mut corrected = [Decimal::ZERO; MONTHS];
        original[3] = dec!(300);
        corrected[3] = dec!(450);
        corrected[7] = dec!(99.50);

        let rows = AssessmentDeriver::derive_reassessment(
            &with_payable(original),
            &with_payable(corrected),
            PenaltyMultiplier::Triple,
        );
        let totals = ReassessmentTotals::from_rows(&rows);

        assert_eq!(
            totals,
            ReassessmentTotals {
                original_amount: dec!(300),
                corrected_amount: dec!(549.50),
                delta: dec!(249.50),
                penalty: dec!(748.50),
            }
        );
    }

    #[test]
    fn penalty_at_decimal_limit_saturates() {
        let original = with_payable([Decimal::ZERO; MONTHS]);
        let corrected = with_payable(single_month(0, Decimal::MAX));

        let rows =
            AssessmentDeriver::derive_reassessment(&original, &corrected, PenaltyMultiplier::Triple);

        assert_eq!(rows[0].delta, Decimal::MAX);
        assert_eq!(rows[0].penalty, Decimal::MAX);
    }

    #[test]
    fn totals_of_empty_table_are_zero() {
        assert_eq!(ReassessmentTotals::from_rows(&[]), ReassessmentTotals::default());
        assert_eq!(total_unjust_refund(&[]), Decimal::ZERO);
    }

    // =========================================================================
    // Unjust refund
    // =========================================================================

    #[test]
    fn march_refund_withdrawn() {
        let original = with_refund(single_month(2, dec!(200)));
        let corrected = with_refund([Decimal::ZERO; MONTHS]);

        let rows = AssessmentDeriver::derive_unjust_refund(&original, &corrected);

        assert_eq!(
            rows,
            vec![UnjustRefundRow {
                month: 2,
                month_label: "Mart".to_string(),
                delta: dec!(200),
            }]
        );
        assert_eq!(total_unjust_refund(&rows), dec!(200));
    }

    #[test]
    fn refund_increase_is_not_reported() {
        let original = with_refund([Decimal::ZERO; MONTHS]);
        let corrected = with_refund(single_month(4, dec!(50)));

        let rows = AssessmentDeriver::derive_unjust_refund(&original, &corrected);

        assert_eq!(rows, vec![]);
    }

    // =========================================================================
    // End to end
    // =========================================================================

    #[test]
    fn tables_follow_ledger_recomputation() {
        let original = opening_year(2022);
        let mut inputs = RawCorrectionInputs::new();
        inputs.month_mut(0).rejected_deductible = Some(dec!(800));
        inputs.month_mut(2).rejected_refund = Some(dec!(200));
        let corrected =
            LedgerEngine::recompute(&original, &inputs.build(), Decimal::ZERO, true).corrected;

        let reassessment =
            AssessmentDeriver::derive_reassessment(&original, &corrected, PenaltyMultiplier::Single);
        let refunds = AssessmentDeriver::derive_unjust_refund(&original, &corrected);

        let months: Vec<usize> = reassessment.iter().map(|r| r.month).collect();
        assert_eq!(months, vec![0, 1, 2]);
        assert_eq!(ReassessmentTotals::from_rows(&reassessment).delta, dec!(800));
        assert_eq!(total_unjust_refund(&refunds), dec!(200));
    }
}
