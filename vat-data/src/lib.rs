//! File and CSV adapters for the VAT correction engine.

mod files;
mod loader;
pub mod logging;

pub use files::{load_chain, read_corrections, read_declaration};
pub use loader::{CorrectionCsvError, CorrectionCsvLoader, CorrectionRecord};
