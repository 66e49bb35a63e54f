//! Multi-year correction chain.
//!
//! A [`YearChain`] holds one entry per fiscal year, ordered ascending. Each
//! year's January opens with the December carry-forward of the year before
//! it, so years must be recalculated in ascending order: recalculating a year
//! whose predecessor has no corrected ledger yet is rejected with
//! [`YearChainError::ChainNotReady`].
//!
//! After a year is recalculated, its corrected December carry-forward is
//! written into the January carry-in of the following year, in both that
//! year's original declaration and its corrected one if present.

use std::collections::BTreeMap;
use std::ops::Bound;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::calculations::common::{clamped_sub, exceeds_tolerance};
use crate::calculations::{
    AssessmentDeriver, LedgerEngine, MissingRowDiagnostic, ReassessmentRow, UnjustRefundRow,
};
use crate::models::{
    CorrectedDeclaration, CorrectionSet, Declaration, LedgerRow, MONTHS, PenaltyMultiplier,
};

const DECEMBER: usize = MONTHS - 1;

/// Errors that can occur while building or recalculating a chain.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum YearChainError {
    #[error("declaration has no \"YIL\" value")]
    MissingYear,

    #[error("invalid year: \"{0}\"")]
    InvalidYear(String),

    #[error("year {0} is already in the chain")]
    DuplicateYear(i32),

    #[error("year {0} is not in the chain")]
    UnknownYear(i32),

    /// The predecessor must be recalculated first.
    #[error("year {predecessor} must be recalculated before year {year}")]
    ChainNotReady { year: i32, predecessor: i32 },

    #[error("year {0} has not been recalculated")]
    NotRecalculated(i32),
}

/// State held for one fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearEntry {
    year: i32,
    original: Declaration,
    corrected: Option<CorrectedDeclaration>,
    corrections: Option<CorrectionSet>,
}

impl YearEntry {
    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn original(&self) -> &Declaration {
        &self.original
    }

    pub fn corrected(&self) -> Option<&CorrectedDeclaration> {
        self.corrected.as_ref()
    }

    pub fn corrections(&self) -> Option<&CorrectionSet> {
        self.corrections.as_ref()
    }
}

/// December carry-forward before and after a recalculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarryForwardChange {
    pub original: Decimal,
    pub corrected: Decimal,
}

impl CarryForwardChange {
    pub fn changed(&self) -> bool {
        exceeds_tolerance(clamped_sub(self.corrected, self.original).abs())
    }
}

/// A carry-forward written into the following year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Propagation {
    /// The year that received the value.
    pub year: i32,

    /// January carry-in of the original declaration before the write, or
    /// `None` if the original has no carry-in row and was left alone.
    pub previous_original: Option<Decimal>,

    /// Same for the corrected declaration; `None` if it has not been
    /// recalculated.
    pub previous_corrected: Option<Decimal>,

    pub value: Decimal,
}

/// Outcome of [`YearChain::recalculate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recalculation {
    pub corrected: CorrectedDeclaration,
    pub diagnostics: Vec<MissingRowDiagnostic>,
    pub december_carry_forward: CarryForwardChange,
    pub propagation: Option<Propagation>,
}

/// Ordered collection of fiscal years under correction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct YearChain {
    entries: BTreeMap<i32, YearEntry>,
}

impl YearChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parsed declaration under the year named in its metadata and
    /// returns that year.
    ///
    /// A year other than [`YearChain::next_expected_year`] is accepted with a
    /// warning; gaps and earlier years are legal.
    pub fn add_year(
        &mut self,
        declaration: Declaration,
    ) -> Result<i32, YearChainError> {
        let raw = declaration
            .meta()
            .year()
            .ok_or(YearChainError::MissingYear)?;
        let year: i32 = raw
            .trim()
            .parse()
            .map_err(|_| YearChainError::InvalidYear(raw.to_string()))?;

        if self.entries.contains_key(&year) {
            return Err(YearChainError::DuplicateYear(year));
        }
        if let Some(expected) = self.next_expected_year() {
            if year != expected {
                warn!(year, expected, "added year is not the next in sequence");
            }
        }

        self.entries.insert(
            year,
            YearEntry {
                year,
                original: declaration,
                corrected: None,
                corrections: None,
            },
        );
        info!(year, "added year to chain");
        Ok(year)
    }

    /// The year following the latest one in the chain.
    pub fn next_expected_year(&self) -> Option<i32> {
        self.entries.keys().next_back().map(|year| year + 1)
    }

    pub fn set_corrections(
        &mut self,
        year: i32,
        corrections: CorrectionSet,
    ) -> Result<(), YearChainError> {
        let entry = self
            .entries
            .get_mut(&year)
            .ok_or(YearChainError::UnknownYear(year))?;
        entry.corrections = Some(corrections);
        Ok(())
    }

    /// Stores `corrections` for `year` and recalculates it.
    pub fn recalculate_with(
        &mut self,
        year: i32,
        corrections: CorrectionSet,
    ) -> Result<Recalculation, YearChainError> {
        self.set_corrections(year, corrections)?;
        self.recalculate(year)
    }

    /// Rebuilds the corrected declaration of `year` from its original and its
    /// stored corrections (none meaning the no-op set), then propagates the
    /// corrected December carry-forward into the following year.
    pub fn recalculate(
        &mut self,
        year: i32,
    ) -> Result<Recalculation, YearChainError> {
        let entry = self
            .entries
            .get(&year)
            .ok_or(YearChainError::UnknownYear(year))?;

        let predecessor = self.entries.range(..year).next_back().map(|(_, e)| e);
        let (inbound, is_chain_head) = match predecessor {
            None => (Decimal::ZERO, true),
            Some(previous) => {
                let corrected =
                    previous
                        .corrected
                        .as_ref()
                        .ok_or(YearChainError::ChainNotReady {
                            year,
                            predecessor: previous.year,
                        })?;
                (
                    corrected.ledger_amount(LedgerRow::NextPeriodCarryOut, DECEMBER),
                    false,
                )
            }
        };

        let corrections = entry.corrections.clone().unwrap_or_default();
        let result = LedgerEngine::recompute(&entry.original, &corrections, inbound, is_chain_head);
        let december_carry_forward = CarryForwardChange {
            original: entry
                .original
                .ledger_amount(LedgerRow::NextPeriodCarryOut, DECEMBER),
            corrected: result
                .corrected
                .ledger_amount(LedgerRow::NextPeriodCarryOut, DECEMBER),
        };

        info!(year, %inbound, is_chain_head, "recalculated year");
        if december_carry_forward.changed() {
            info!(
                year,
                original = %december_carry_forward.original,
                corrected = %december_carry_forward.corrected,
                "December carry-forward changed"
            );
        }

        if let Some(entry) = self.entries.get_mut(&year) {
            entry.corrected = Some(result.corrected.clone());
        }
        let propagation = self.propagate(year, december_carry_forward.corrected);

        Ok(Recalculation {
            corrected: result.corrected,
            diagnostics: result.diagnostics,
            december_carry_forward,
            propagation,
        })
    }

    /// Writes `value` into the January carry-in of the year after `year`.
    fn propagate(
        &mut self,
        year: i32,
        value: Decimal,
    ) -> Option<Propagation> {
        let (&next_year, next) = self
            .entries
            .range_mut((Bound::Excluded(year), Bound::Unbounded))
            .next()?;

        let previous_original = next.original.replace_opening_carry_in(value);
        if previous_original.is_none() {
            debug!(year = next_year, "no carry-in row in original, left unchanged");
        }
        let previous_corrected = next
            .corrected
            .as_mut()
            .and_then(|corrected| corrected.replace_opening_carry_in(value));

        if previous_original.is_none() && previous_corrected.is_none() {
            return None;
        }

        info!(from = year, to = next_year, %value, "propagated carry-forward");
        Some(Propagation {
            year: next_year,
            previous_original,
            previous_corrected,
            value,
        })
    }

    pub fn entry(
        &self,
        year: i32,
    ) -> Option<&YearEntry> {
        self.entries.get(&year)
    }

    /// Years in ascending order.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-assessment table of a recalculated year.
    pub fn reassessment(
        &self,
        year: i32,
        multiplier: PenaltyMultiplier,
    ) -> Result<Vec<ReassessmentRow>, YearChainError> {
        let (original, corrected) = self.compared(year)?;
        Ok(AssessmentDeriver::derive_reassessment(
            original, corrected, multiplier,
        ))
    }

    /// Unjust-refund table of a recalculated year.
    pub fn unjust_refund(
        &self,
        year: i32,
    ) -> Result<Vec<UnjustRefundRow>, YearChainError> {
        let (original, corrected) = self.compared(year)?;
        Ok(AssessmentDeriver::derive_unjust_refund(original, corrected))
    }

    fn compared(
        &self,
        year: i32,
    ) -> Result<(&Declaration, &Declaration), YearChainError> {
        let entry = self
            .entries
            .get(&year)
            .ok_or(YearChainError::UnknownYear(year))?;
        let corrected = entry
            .corrected
            .as_ref()
            .ok_or(YearChainError::NotRecalculated(year))?;
        Ok((&entry.original, corrected.declaration()))
    }
}
