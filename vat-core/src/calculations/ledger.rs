//! Monthly carry-forward ledger recomputation.
//!
//! The engine applies a [`CorrectionSet`] to a fresh copy of an original
//! declaration and rebuilds the ten ledger rows month by month:
//!
//! | Step | Computation |
//! |------|-------------|
//! | 1    | Tax base total += base difference; computed VAT += VAT difference |
//! | 2    | Current-period deductible -= rejected deductible |
//! | 3    | Refund due -= rejected refund, floored at zero |
//! | 4    | Total VAT = computed VAT + additional VAT |
//! | 5    | Total deductions = carry from previous month + deductible |
//! | 6    | Difference = total VAT − total deductions |
//! | 7    | Difference ≥ 0 → payable; otherwise carried to the next month |
//!
//! January's carry comes from the previous year's December carry-out. The
//! first year of a chain has no predecessor: its January deductions use the
//! declaration's own declared carry-in, while the rebuilt carry-in row opens
//! at zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::common::{clamped_add, clamped_sub, floor_at_zero};
use crate::models::{
    CorrectedDeclaration, CorrectionSet, Declaration, LedgerRow, MONTHS, MonthlyAmounts,
};

/// A well-known ledger row was absent and has been computed as zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingRowDiagnostic {
    pub row: LedgerRow,
}

impl std::fmt::Display for MissingRowDiagnostic {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "\"{}\" row missing from declaration, computed with zeros",
            self.row
        )
    }
}

/// Result of a ledger recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerResult {
    pub corrected: CorrectedDeclaration,

    /// Ledger rows that had to be synthesized, in ledger order.
    pub diagnostics: Vec<MissingRowDiagnostic>,
}

/// Recomputes corrected declarations.
pub struct LedgerEngine;

impl LedgerEngine {
    /// Applies `corrections` to a copy of `original` and recomputes the
    /// twelve-month carry-forward chain.
    ///
    /// `inbound_carry_forward` is the opening balance of a year that has a
    /// predecessor in the chain; it feeds January and becomes January's
    /// carry-in cell. For a chain head (`is_chain_head`) it is not used:
    /// January's deductions count the declared carry-in of `original`, and
    /// the carry-in cell is written as zero.
    ///
    /// The original is never modified; calling this twice with the same
    /// arguments yields identical results.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use vat_core::calculations::LedgerEngine;
    /// use vat_core::models::{CorrectionSet, Declaration, LedgerRow, MetaData};
    ///
    /// let labels = std::array::from_fn(|i| format!("M{}", i + 1));
    /// let original = Declaration::new(MetaData::new(), labels)
    ///     .with_values(LedgerRow::ComputedVat.label(), [dec!(1800); 12])
    ///     .with_values(LedgerRow::CurrentPeriodDeductible.label(), [dec!(2000); 12]);
    ///
    /// let result = LedgerEngine::recompute(&original, &CorrectionSet::default(), dec!(0), true);
    /// let corrected = &result.corrected;
    ///
    /// // 200 of excess deductions roll forward every month.
    /// assert_eq!(corrected.ledger_amount(LedgerRow::NextPeriodCarryOut, 0), dec!(200));
    /// assert_eq!(corrected.ledger_amount(LedgerRow::NextPeriodCarryOut, 11), dec!(2400));
    /// assert_eq!(corrected.ledger_amount(LedgerRow::PayableVat, 11), dec!(0));
    /// // Every absent row except the chain head's carry-in is reported.
    /// assert_eq!(result.diagnostics.len(), 7);
    /// ```
    pub fn recompute(
        original: &Declaration,
        corrections: &CorrectionSet,
        inbound_carry_forward: Decimal,
        is_chain_head: bool,
    ) -> LedgerResult {
        let mut working = original.clone();
        let diagnostics = ensure_ledger_rows(&mut working, is_chain_head);

        let (carried_into_january, opening_cell) = if is_chain_head {
            (
                original.ledger_amount(LedgerRow::PriorPeriodCarryIn, 0),
                Decimal::ZERO,
            )
        } else {
            (inbound_carry_forward, inbound_carry_forward)
        };
        debug!(%carried_into_january, is_chain_head, "recomputing ledger");

        let mut ledger = Ledger::read(&working);
        ledger.apply(corrections, carried_into_january, opening_cell);
        ledger.write(&mut working);

        LedgerResult {
            corrected: CorrectedDeclaration::from_recomputed(working),
            diagnostics,
        }
    }
}

/// Adds a zero-filled row for every missing ledger row and reports the ones
/// whose absence is unexpected.
fn ensure_ledger_rows(
    working: &mut Declaration,
    is_chain_head: bool,
) -> Vec<MissingRowDiagnostic> {
    let mut diagnostics = Vec::new();

    for row in LedgerRow::ALL {
        if working.ledger_values(row).is_some() {
            continue;
        }
        // A chain head has nothing carried in; the row is often left out.
        let expected = is_chain_head && row == LedgerRow::PriorPeriodCarryIn;
        if !expected {
            warn!(row = row.label(), "ledger row missing, computing with zeros");
            diagnostics.push(MissingRowDiagnostic { row });
        }
        working.push_values(row.label(), [Decimal::ZERO; MONTHS]);
    }

    diagnostics
}

/// Working copy of the ledger rows.
struct Ledger {
    tax_base_total: MonthlyAmounts,
    computed_vat: MonthlyAmounts,
    additional_vat: MonthlyAmounts,
    total_vat: MonthlyAmounts,
    carry_in: MonthlyAmounts,
    deductible: MonthlyAmounts,
    total_deductions: MonthlyAmounts,
    payable: MonthlyAmounts,
    carry_out: MonthlyAmounts,
    refund_due: MonthlyAmounts,
}

impl Ledger {
    fn read(declaration: &Declaration) -> Self {
        let read = |row| {
            declaration
                .ledger_values(row)
                .copied()
                .unwrap_or([Decimal::ZERO; MONTHS])
        };
        Self {
            tax_base_total: read(LedgerRow::TaxBaseTotal),
            computed_vat: read(LedgerRow::ComputedVat),
            additional_vat: read(LedgerRow::AdditionalVat),
            total_vat: read(LedgerRow::TotalVat),
            carry_in: read(LedgerRow::PriorPeriodCarryIn),
            deductible: read(LedgerRow::CurrentPeriodDeductible),
            total_deductions: read(LedgerRow::TotalDeductions),
            payable: read(LedgerRow::PayableVat),
            carry_out: read(LedgerRow::NextPeriodCarryOut),
            refund_due: read(LedgerRow::RefundDue),
        }
    }

    /// `carried_into_january` feeds January's deductions; `opening_cell` is
    /// written to January's carry-in.
    fn apply(
        &mut self,
        corrections: &CorrectionSet,
        carried_into_january: Decimal,
        opening_cell: Decimal,
    ) {
        for month in 0..MONTHS {
            self.tax_base_total[month] =
                clamped_add(self.tax_base_total[month], corrections.base_difference()[month]);
            self.computed_vat[month] = clamped_add(
                self.computed_vat[month],
                corrections.computed_vat_difference()[month],
            );
            self.deductible[month] =
                clamped_sub(self.deductible[month], corrections.rejected_deductible()[month]);
            self.refund_due[month] = floor_at_zero(clamped_sub(
                self.refund_due[month],
                corrections.rejected_refund()[month],
            ));

            self.total_vat[month] = clamped_add(self.computed_vat[month], self.additional_vat[month]);

            let carried = if month == 0 {
                carried_into_january
            } else {
                self.carry_out[month - 1]
            };
            self.total_deductions[month] = clamped_add(carried, self.deductible[month]);

            let difference = clamped_sub(self.total_vat[month], self.total_deductions[month]);
            if difference >= Decimal::ZERO {
                self.payable[month] = difference;
                self.carry_out[month] = Decimal::ZERO;
            } else {
                self.payable[month] = Decimal::ZERO;
                self.carry_out[month] = -difference;
            }
        }

        // Rebuild the carry-in row so it mirrors the carry-out chain.
        for month in 0..MONTHS {
            self.carry_in[month] = if month == 0 {
                opening_cell
            } else {
                self.carry_out[month - 1]
            };
        }
    }

    fn write(
        &self,
        declaration: &mut Declaration,
    ) {
        let columns = [
            (LedgerRow::TaxBaseTotal, &self.tax_base_total),
            (LedgerRow::ComputedVat, &self.computed_vat),
            (LedgerRow::AdditionalVat, &self.additional_vat),
            (LedgerRow::TotalVat, &self.total_vat),
            (LedgerRow::PriorPeriodCarryIn, &self.carry_in),
            (LedgerRow::CurrentPeriodDeductible, &self.deductible),
            (LedgerRow::TotalDeductions, &self.total_deductions),
            (LedgerRow::PayableVat, &self.payable),
            (LedgerRow::NextPeriodCarryOut, &self.carry_out),
            (LedgerRow::RefundDue, &self.refund_due),
        ];
        for (row, values) in columns {
            if let Some(target) = declaration.ledger_values_mut(row) {
                *target = *values;
            }
        }
    }
}
