//! Parser for pasted periodic VAT declaration text.
//!
//! # Input Format
//!
//! ```text
//! UNVAN: ÖRNEK TİCARET A.Ş.
//! VERGİ NO: 1234567890
//! YIL: 2022
//! ...                          (six `key: value` lines in total)
//! DÖNEM        Ocak      Şubat     ...  Aralık
//! MATRAH TOPLAMI   10.000,00   10.000,00   ...
//! İNDİRİMLER
//! BU DÖN. AİT İND. KDV   2.300,00   1.500,00   ...
//! ```
//!
//! Columns are separated by a tab or by two or more spaces. Amounts use a dot
//! as thousands separator and a comma as decimal separator.
//!
//! | Line kind        | Treatment                                         |
//! |------------------|---------------------------------------------------|
//! | Metadata (1–6)   | split at the first colon, both halves trimmed     |
//! | Header (`DÖNEM`) | must carry exactly 12 month labels                |
//! | Section marker   | recorded as a row without values                  |
//! | Label + 12 cells | recorded as a value row                           |
//! | Anything else    | skipped                                           |

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{
    Declaration, LedgerRow, MONTHS, MetaData, MonthlyAmounts, PERIOD_HEADER, is_section_marker,
};

/// Minimum number of non-blank lines in a declaration.
pub const MIN_LINES: usize = 10;

/// Number of leading `key: value` metadata lines.
pub const META_LINES: usize = 6;

/// Older printouts use this label for the prior-period carry-in row.
const PRIOR_CARRY_IN_ALIAS: &str = "ÖNCEKİ DÖNEMDEN DEVREDEN KDV";

static COLUMN_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\t|\s{2,}").expect("column separator pattern is valid"));

/// Errors that make a declaration text unusable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    /// Not enough non-blank lines for metadata, header and ledger rows.
    #[error("declaration is incomplete: {found} non-blank lines, at least 10 required")]
    TooFewLines { found: usize },

    /// No line starts with the period header token.
    #[error("table header row (DÖNEM) not found")]
    MissingHeader,

    /// The header row does not name exactly twelve months.
    #[error("header must list exactly 12 months, found {found}")]
    MonthCount { found: usize },
}

/// Parser for periodic VAT declaration text.
pub struct DeclarationParser;

impl DeclarationParser {
    /// Parses declaration text into a [`Declaration`].
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if the text has fewer than [`MIN_LINES`]
    /// non-blank lines, has no header row, or the header does not list
    /// exactly twelve months. Malformed data lines and unparsable amounts do
    /// not fail the parse.
    ///
    /// # Example
    ///
    /// ```
    /// use vat_core::parser::DeclarationParser;
    ///
    /// let zeros = vec!["0,00"; 12].join("\t");
    /// let text = format!(
    ///     "UNVAN: ÖRNEK A.Ş.\nVERGİ NO: 1\nYIL: 2022\nA: 1\nB: 2\nC: 3\n\
    ///      DÖNEM\tOca\tŞub\tMar\tNis\tMay\tHaz\tTem\tAğu\tEyl\tEki\tKas\tAra\n\
    ///      MATRAH TOPLAMI\t{zeros}\nHESAPLANAN KDV\t{zeros}\nTOPLAM KDV\t{zeros}\n"
    /// );
    ///
    /// let declaration = DeclarationParser::parse(&text).unwrap();
    ///
    /// assert_eq!(declaration.meta().year(), Some("2022"));
    /// assert_eq!(declaration.rows().len(), 3);
    /// ```
    pub fn parse(text: &str) -> Result<Declaration, FormatError> {
        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        if lines.len() < MIN_LINES {
            return Err(FormatError::TooFewLines { found: lines.len() });
        }

        let mut meta = MetaData::new();
        for line in &lines[..META_LINES] {
            let (key, value) = split_meta_line(line);
            meta.insert(key, value);
        }

        let header_index = lines
            .iter()
            .position(|l| l.trim_start().starts_with(PERIOD_HEADER))
            .ok_or(FormatError::MissingHeader)?;

        let month_labels: Vec<String> = COLUMN_SEPARATOR
            .split(lines[header_index].trim())
            .skip(1)
            .map(|m| m.trim().to_string())
            .collect();
        let month_labels: [String; MONTHS] = month_labels
            .try_into()
            .map_err(|labels: Vec<String>| FormatError::MonthCount {
                found: labels.len(),
            })?;

        let mut declaration = Declaration::new(meta, month_labels);
        for line in &lines[header_index + 1..] {
            parse_table_line(&mut declaration, line.trim());
        }

        debug!(
            year = declaration.meta().year().unwrap_or_default(),
            rows = declaration.rows().len(),
            "declaration parsed"
        );
        Ok(declaration)
    }
}

impl FromStr for Declaration {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeclarationParser::parse(s)
    }
}

/// Splits a metadata line at its first colon. A line without a colon becomes
/// a key with an empty value.
fn split_meta_line(line: &str) -> (&str, &str) {
    match line.split_once(':') {
        Some((key, value)) => (key.trim(), value.trim()),
        None => (line.trim(), ""),
    }
}

fn parse_table_line(
    declaration: &mut Declaration,
    line: &str,
) {
    let Some(separator) = COLUMN_SEPARATOR.find(line) else {
        if is_section_marker(line) {
            declaration.push_section(line);
        } else {
            debug!(line, "skipping line without columns");
        }
        return;
    };

    let label = canonical_label(line[..separator.start()].trim());
    if label.is_empty() {
        return;
    }

    let cells: Vec<&str> = COLUMN_SEPARATOR
        .split(line[separator.start()..].trim())
        .collect();
    if cells.len() != MONTHS {
        debug!(label, cells = cells.len(), "skipping row without 12 amounts");
        return;
    }

    let values: MonthlyAmounts = std::array::from_fn(|month| parse_amount(cells[month]));
    if !declaration.push_values(label, values) {
        debug!(label, "duplicate row ignored");
    }
}

/// Maps label variants onto the canonical ledger row labels.
fn canonical_label(label: &str) -> &str {
    if label == PRIOR_CARRY_IN_ALIAS {
        return LedgerRow::PriorPeriodCarryIn.label();
    }
    let deductible = LedgerRow::CurrentPeriodDeductible.label();
    if label.starts_with(deductible) {
        return deductible;
    }
    label
}

/// Parses an amount written as `1.234.567,89`.
///
/// Blank input is zero. Unparsable input is logged and treated as zero.
pub fn parse_amount(token: &str) -> Decimal {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Decimal::ZERO;
    }
    let normalized = trimmed.replace('.', "").replacen(',', ".", 1);
    normalized.parse().unwrap_or_else(|e| {
        warn!(input = %token, "invalid amount, using zero: {}", e);
        Decimal::ZERO
    })
}
