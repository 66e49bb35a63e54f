//! CSV loader for monthly correction inputs.
//!
//! ## CSV Format
//!
//! Headers are matched by name, so column order does not matter. Only `month`
//! is required; a missing value column or an empty cell leaves that input
//! blank.
//!
//! | Column                     | Required | Type    | Notes                          |
//! |----------------------------|----------|---------|--------------------------------|
//! | `month`                    | yes      | integer | 1 (January) to 12 (December)   |
//! | `rejected_deductible`      | no       | decimal | Rejected deductible VAT        |
//! | `rejected_other_deduction` | no       | decimal | Rejected other deductions      |
//! | `rejected_refund`          | no       | decimal | Rejected refund VAT            |
//! | `base_difference`          | no       | decimal | Tax-base difference            |
//! | `rate`                     | no       | decimal | VAT rate in percent, e.g. `20` |
//!
//! Months that do not appear keep blank inputs. Each month may appear once.
//!
//! ### Example
//!
//! ```csv
//! month,rejected_deductible,rejected_refund,base_difference,rate
//! 1,800.00,,,
//! 3,,200.00,,
//! 12,,,10000.00,20
//! ```

use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use vat_core::models::{MONTHS, MonthlyCorrectionInput, RawCorrectionInputs};

/// Errors that can occur while loading correction inputs.
#[derive(Debug, Error)]
pub enum CorrectionCsvError {
    /// The underlying CSV deserialisation failed (bad structure, missing
    /// `month` column, non-numeric cell, etc.).
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    /// `row` is 1-based, not counting the header.
    #[error("month {month} on row {row} is outside 1-12")]
    InvalidMonth { month: u32, row: usize },

    #[error("month {month} on row {row} appears more than once")]
    DuplicateMonth { month: u32, row: usize },
}

/// A single record of the corrections CSV file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CorrectionRecord {
    pub month: u32,
    #[serde(default)]
    pub rejected_deductible: Option<Decimal>,
    #[serde(default)]
    pub rejected_other_deduction: Option<Decimal>,
    #[serde(default)]
    pub rejected_refund: Option<Decimal>,
    #[serde(default)]
    pub base_difference: Option<Decimal>,
    #[serde(default)]
    pub rate: Option<Decimal>,
}

impl From<CorrectionRecord> for MonthlyCorrectionInput {
    fn from(record: CorrectionRecord) -> Self {
        Self {
            rejected_deductible: record.rejected_deductible,
            rejected_other_deduction: record.rejected_other_deduction,
            rejected_refund: record.rejected_refund,
            base_difference: record.base_difference,
            rate: record.rate,
        }
    }
}

/// Loader for correction inputs from CSV files.
pub struct CorrectionCsvLoader;

impl CorrectionCsvLoader {
    /// Parse correction inputs from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or a
    /// byte slice.
    pub fn parse<R: Read>(reader: R) -> Result<RawCorrectionInputs, CorrectionCsvError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut inputs = RawCorrectionInputs::new();
        let mut seen = [false; MONTHS];

        for (idx, result) in csv_reader.deserialize::<CorrectionRecord>().enumerate() {
            let record = result?;
            let row = idx + 1;
            let month = record.month;

            let index = match month {
                1..=12 => (month - 1) as usize,
                _ => return Err(CorrectionCsvError::InvalidMonth { month, row }),
            };
            if seen[index] {
                return Err(CorrectionCsvError::DuplicateMonth { month, row });
            }
            seen[index] = true;

            debug!(month, row, "loaded correction inputs");
            *inputs.month_mut(index) = record.into();
        }

        Ok(inputs)
    }

    /// Parse CSV text held in memory.
    pub fn load_from_str(input: &str) -> Result<RawCorrectionInputs, CorrectionCsvError> {
        Self::parse(input.as_bytes())
    }
}
