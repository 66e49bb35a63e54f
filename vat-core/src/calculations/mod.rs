//! VAT correction calculations.
//!
//! This module provides the ledger recomputation that applies a
//! [`CorrectionSet`](crate::models::CorrectionSet) to a declaration, and the
//! derived re-assessment and unjust-refund tables.

mod assessment;
pub mod common;
mod ledger;

pub use assessment::{
    AssessmentDeriver, ReassessmentRow, ReassessmentTotals, UnjustRefundRow, total_unjust_refund,
};
pub use ledger::{LedgerEngine, LedgerResult, MissingRowDiagnostic};
