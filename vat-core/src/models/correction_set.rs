//! Per-month corrections applied by the tax authority.
//!
//! Corrections arrive as loosely-typed monthly inputs ([`RawCorrectionInputs`])
//! and are normalised into a [`CorrectionSet`] by [`build_corrections`]. The
//! normalisation enforces one validation rule: a tax-base difference only
//! counts when its month carries a positive VAT rate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::calculations::common::{clamped_mul, clamped_sum};
use crate::models::{Declaration, LedgerRow, MONTHS, MonthlyAmounts};

/// Errors that can occur while preparing corrections.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CorrectionError {
    /// A ledger row needed to prepare the corrections is absent.
    #[error("\"{0}\" row not found in declaration")]
    MissingRow(LedgerRow),
}

/// Correction inputs for a single month, as entered.
///
/// `None` means the field was left blank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCorrectionInput {
    /// Rejected part of the current-period deductible VAT.
    pub rejected_deductible: Option<Decimal>,

    /// Rejected part of other deductions.
    pub rejected_other_deduction: Option<Decimal>,

    /// Refund found not to be due.
    pub rejected_refund: Option<Decimal>,

    /// Undeclared tax-base difference.
    pub base_difference: Option<Decimal>,

    /// VAT rate for the base difference, in percent (e.g. `20`).
    pub rate: Option<Decimal>,
}

/// Raw correction inputs for a whole fiscal year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCorrectionInputs {
    pub months: [MonthlyCorrectionInput; MONTHS],
}

impl RawCorrectionInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable access to one month's inputs (0 = January).
    ///
    /// # Panics
    ///
    /// Panics if `month >= MONTHS`.
    pub fn month_mut(
        &mut self,
        month: usize,
    ) -> &mut MonthlyCorrectionInput {
        &mut self.months[month]
    }

    /// Inputs that reject the whole current-period deductible VAT of every
    /// month and leave every other correction blank.
    ///
    /// # Errors
    ///
    /// Returns [`CorrectionError::MissingRow`] if the declaration has no
    /// current-period deductible VAT row.
    pub fn reject_all_deductible(declaration: &Declaration) -> Result<Self, CorrectionError> {
        let deductible = declaration
            .ledger_values(LedgerRow::CurrentPeriodDeductible)
            .ok_or(CorrectionError::MissingRow(
                LedgerRow::CurrentPeriodDeductible,
            ))?;

        let mut inputs = Self::new();
        for (input, amount) in inputs.months.iter_mut().zip(deductible) {
            input.rejected_deductible = Some(*amount);
        }
        Ok(inputs)
    }

    /// Normalises the inputs into a [`CorrectionSet`].
    pub fn build(&self) -> CorrectionSet {
        build_corrections(self)
    }
}

/// Normalised corrections, one amount per month for each kind.
///
/// Built only through [`build_corrections`]; the default value is the no-op
/// correction set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionSet {
    rejected_deductible: MonthlyAmounts,
    rejected_other_deduction: MonthlyAmounts,
    rejected_refund: MonthlyAmounts,
    base_difference: MonthlyAmounts,
    computed_vat_difference: MonthlyAmounts,
}

/// Annual sums of each correction kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionTotals {
    pub rejected_deductible: Decimal,
    pub rejected_other_deduction: Decimal,
    pub rejected_refund: Decimal,
    pub base_difference: Decimal,
    pub computed_vat_difference: Decimal,
}

impl CorrectionSet {
    pub fn rejected_deductible(&self) -> &MonthlyAmounts {
        &self.rejected_deductible
    }

    pub fn rejected_other_deduction(&self) -> &MonthlyAmounts {
        &self.rejected_other_deduction
    }

    pub fn rejected_refund(&self) -> &MonthlyAmounts {
        &self.rejected_refund
    }

    pub fn base_difference(&self) -> &MonthlyAmounts {
        &self.base_difference
    }

    pub fn computed_vat_difference(&self) -> &MonthlyAmounts {
        &self.computed_vat_difference
    }

    /// True when applying this set changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn totals(&self) -> CorrectionTotals {
        CorrectionTotals {
            rejected_deductible: clamped_sum(&self.rejected_deductible),
            rejected_other_deduction: clamped_sum(&self.rejected_other_deduction),
            rejected_refund: clamped_sum(&self.rejected_refund),
            base_difference: clamped_sum(&self.base_difference),
            computed_vat_difference: clamped_sum(&self.computed_vat_difference),
        }
    }
}

/// Builds a [`CorrectionSet`] from raw monthly inputs.
///
/// Blank or zero inputs contribute nothing. A base difference without a
/// positive rate is dropped together with its VAT difference. Months never
/// influence each other.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use vat_core::models::{RawCorrectionInputs, build_corrections};
///
/// let mut inputs = RawCorrectionInputs::new();
/// inputs.month_mut(11).base_difference = Some(dec!(10000));
/// inputs.month_mut(11).rate = Some(dec!(20));
/// inputs.month_mut(10).base_difference = Some(dec!(5000)); // no rate
///
/// let corrections = build_corrections(&inputs);
///
/// assert_eq!(corrections.computed_vat_difference()[11], dec!(2000));
/// assert_eq!(corrections.base_difference()[10], dec!(0));
/// ```
pub fn build_corrections(inputs: &RawCorrectionInputs) -> CorrectionSet {
    let mut set = CorrectionSet::default();

    for (month, input) in inputs.months.iter().enumerate() {
        set.rejected_deductible[month] = or_zero(input.rejected_deductible);
        set.rejected_other_deduction[month] = or_zero(input.rejected_other_deduction);
        set.rejected_refund[month] = or_zero(input.rejected_refund);

        let base_difference = or_zero(input.base_difference);
        if base_difference.is_zero() {
            continue;
        }
        match input.rate.filter(|rate| *rate > Decimal::ZERO) {
            Some(rate) => {
                set.base_difference[month] = base_difference;
                set.computed_vat_difference[month] =
                    clamped_mul(base_difference, rate) / Decimal::ONE_HUNDRED;
            }
            None => {
                debug!(
                    month,
                    %base_difference,
                    "base difference ignored: no positive rate"
                );
            }
        }
    }

    set
}

fn or_zero(value: Option<Decimal>) -> Decimal {
    value.unwrap_or(Decimal::ZERO)
}
