mod correction_set;
mod declaration;
mod ledger_row;
mod penalty;

pub use correction_set::{
    CorrectionError, CorrectionSet, CorrectionTotals, MonthlyCorrectionInput, RawCorrectionInputs,
    build_corrections,
};
pub use declaration::{
    CorrectedDeclaration, Declaration, LabeledRow, MONTHS, MetaData, MonthlyAmounts, Row,
    TAX_ID_KEY, TITLE_KEY, YEAR_KEY,
};
pub use ledger_row::{LedgerRow, PERIOD_HEADER, SECTION_MARKERS, is_section_marker};
pub use penalty::PenaltyMultiplier;
