//! VAT declaration correction engine.
//!
//! Parses monthly VAT declarations, applies tax-authority corrections,
//! recomputes the carry-forward ledger across consecutive years and derives
//! re-assessment and unjust-refund tables.

pub mod calculations;
pub mod chain;
pub mod models;
pub mod parser;

#[cfg(test)]
mod test_support;

pub use chain::{CarryForwardChange, Propagation, Recalculation, YearChain, YearChainError};
pub use models::*;
pub use parser::{DeclarationParser, FormatError};
