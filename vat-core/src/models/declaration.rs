//! Typed representation of a periodic (monthly) VAT declaration.
//!
//! A [`Declaration`] is the parsed form of one fiscal year: a handful of
//! free-text metadata fields, the twelve month labels from the header row, and
//! an insertion-ordered list of rows. Rows are either section markers (pure
//! grouping labels) or value rows holding exactly one amount per month.
//!
//! A [`CorrectedDeclaration`] has the same shape but can only be obtained from
//! the ledger engine, which always rebuilds it from an original declaration.

use std::ops::Deref;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::LedgerRow;

/// Number of periods in a fiscal year.
pub const MONTHS: usize = 12;

/// One amount per calendar month, January first.
pub type MonthlyAmounts = [Decimal; MONTHS];

/// Metadata key holding the fiscal year.
pub const YEAR_KEY: &str = "YIL";

/// Metadata key holding the taxpayer's title.
pub const TITLE_KEY: &str = "UNVAN";

/// Metadata key holding the tax identification number.
pub const TAX_ID_KEY: &str = "VERGİ NO";

/// Free-text `key: value` pairs read from the top of a declaration, in line
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaData(Vec<(String, String)>);

impl MetaData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a pair. A key seen before keeps its position and takes the
    /// new value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(
        &self,
        key: &str,
    ) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Raw fiscal year text, if present and non-empty.
    pub fn year(&self) -> Option<&str> {
        self.get(YEAR_KEY).filter(|y| !y.is_empty())
    }

    pub fn title(&self) -> Option<&str> {
        self.get(TITLE_KEY)
    }

    pub fn tax_id(&self) -> Option<&str> {
        self.get(TAX_ID_KEY)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A single declaration row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum Row {
    /// Grouping label with no values.
    Section,
    /// Twelve monthly amounts.
    Values(MonthlyAmounts),
}

impl Row {
    pub fn values(&self) -> Option<&MonthlyAmounts> {
        match self {
            Row::Section => None,
            Row::Values(values) => Some(values),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledRow {
    pub label: String,
    pub row: Row,
}

/// A parsed periodic VAT declaration for one fiscal year.
///
/// Row labels are unique; the first row pushed under a label wins and later
/// pushes are ignored, mirroring how duplicate lines are treated when parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    meta: MetaData,
    month_labels: [String; MONTHS],
    rows: Vec<LabeledRow>,
}

impl Declaration {
    pub fn new(
        meta: MetaData,
        month_labels: [String; MONTHS],
    ) -> Self {
        Self {
            meta,
            month_labels,
            rows: Vec::new(),
        }
    }

    pub fn meta(&self) -> &MetaData {
        &self.meta
    }

    pub fn month_labels(&self) -> &[String; MONTHS] {
        &self.month_labels
    }

    /// Label of the month at `index` (0 = January).
    ///
    /// # Panics
    ///
    /// Panics if `index >= MONTHS`.
    pub fn month_label(
        &self,
        index: usize,
    ) -> &str {
        &self.month_labels[index]
    }

    /// Rows in insertion order.
    pub fn rows(&self) -> &[LabeledRow] {
        &self.rows
    }

    pub fn row(
        &self,
        label: &str,
    ) -> Option<&Row> {
        self.rows.iter().find(|r| r.label == label).map(|r| &r.row)
    }

    pub fn contains_row(
        &self,
        label: &str,
    ) -> bool {
        self.row(label).is_some()
    }

    /// Monthly amounts of a value row. Section markers yield `None`.
    pub fn values(
        &self,
        label: &str,
    ) -> Option<&MonthlyAmounts> {
        self.row(label).and_then(Row::values)
    }

    pub fn ledger_values(
        &self,
        row: LedgerRow,
    ) -> Option<&MonthlyAmounts> {
        self.values(row.label())
    }

    /// Amount of a well-known ledger row for one month, zero when the row is
    /// absent.
    pub fn ledger_amount(
        &self,
        row: LedgerRow,
        month: usize,
    ) -> Decimal {
        self.ledger_values(row)
            .map(|values| values[month])
            .unwrap_or(Decimal::ZERO)
    }

    /// Appends a section marker. Returns `false` if the label already exists.
    pub fn push_section(
        &mut self,
        label: impl Into<String>,
    ) -> bool {
        self.push(label.into(), Row::Section)
    }

    /// Appends a value row. Returns `false` if the label already exists.
    pub fn push_values(
        &mut self,
        label: impl Into<String>,
        values: MonthlyAmounts,
    ) -> bool {
        self.push(label.into(), Row::Values(values))
    }

    /// Builder form of [`Declaration::push_section`].
    pub fn with_section(
        mut self,
        label: impl Into<String>,
    ) -> Self {
        self.push_section(label);
        self
    }

    /// Builder form of [`Declaration::push_values`].
    pub fn with_values(
        mut self,
        label: impl Into<String>,
        values: MonthlyAmounts,
    ) -> Self {
        self.push_values(label, values);
        self
    }

    fn push(
        &mut self,
        label: String,
        row: Row,
    ) -> bool {
        if self.contains_row(&label) {
            return false;
        }
        self.rows.push(LabeledRow { label, row });
        true
    }

    pub(crate) fn ledger_values_mut(
        &mut self,
        row: LedgerRow,
    ) -> Option<&mut MonthlyAmounts> {
        self.rows
            .iter_mut()
            .find(|r| r.label == row.label())
            .and_then(|r| match &mut r.row {
                Row::Section => None,
                Row::Values(values) => Some(values),
            })
    }

    /// Overwrites January of the prior-period carry-in row.
    ///
    /// Returns the value that was replaced, or `None` when the row is absent
    /// (in which case nothing is written).
    pub(crate) fn replace_opening_carry_in(
        &mut self,
        value: Decimal,
    ) -> Option<Decimal> {
        self.ledger_values_mut(LedgerRow::PriorPeriodCarryIn)
            .map(|values| std::mem::replace(&mut values[0], value))
    }
}

/// A declaration recomputed by the ledger engine.
///
/// There is no public constructor: the only way to obtain one is
/// [`crate::calculations::LedgerEngine::recompute`], which always starts from a fresh copy
/// of the original.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorrectedDeclaration(Declaration);

impl CorrectedDeclaration {
    pub(crate) fn from_recomputed(declaration: Declaration) -> Self {
        Self(declaration)
    }

    pub fn declaration(&self) -> &Declaration {
        &self.0
    }

    pub fn into_inner(self) -> Declaration {
        self.0
    }

    pub(crate) fn replace_opening_carry_in(
        &mut self,
        value: Decimal,
    ) -> Option<Decimal> {
        self.0.replace_opening_carry_in(value)
    }
}

impl Deref for CorrectedDeclaration {
    type Target = Declaration;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Declaration> for CorrectedDeclaration {
    fn as_ref(&self) -> &Declaration {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn month_labels() -> [String; MONTHS] {
        std::array::from_fn(|i| format!("M{}", i + 1))
    }

    #[test]
    fn meta_year_ignores_empty_value() {
        let mut meta = MetaData::new();
        meta.insert(YEAR_KEY, "");

        assert_eq!(meta.year(), None);

        meta.insert(YEAR_KEY, "2022");

        assert_eq!(meta.year(), Some("2022"));
    }

    #[test]
    fn meta_keeps_insertion_order() {
        let mut meta = MetaData::new();
        assert!(meta.is_empty());

        meta.insert(TITLE_KEY, "ÖRNEK A.Ş.");
        meta.insert(YEAR_KEY, "");
        meta.insert(TAX_ID_KEY, "1234567890");
        meta.insert(YEAR_KEY, "2022");

        let pairs: Vec<(&str, &str)> = meta.iter().collect();
        assert_eq!(
            pairs,
            vec![
                (TITLE_KEY, "ÖRNEK A.Ş."),
                (YEAR_KEY, "2022"),
                (TAX_ID_KEY, "1234567890"),
            ]
        );
        assert_eq!(meta.len(), 3);
    }

    #[test]
    fn push_keeps_first_row_for_duplicate_label() {
        let mut declaration = Declaration::new(MetaData::new(), month_labels());

        assert!(declaration.push_values("A", [dec!(1); MONTHS]));
        assert!(!declaration.push_values("A", [dec!(2); MONTHS]));
        assert!(!declaration.push_section("A"));

        assert_eq!(declaration.rows().len(), 1);
        assert_eq!(declaration.values("A"), Some(&[dec!(1); MONTHS]));
    }

    #[test]
    fn section_rows_have_no_values() {
        let declaration = Declaration::new(MetaData::new(), month_labels()).with_section("İNDİRİMLER");

        assert!(declaration.contains_row("İNDİRİMLER"));
        assert_eq!(declaration.values("İNDİRİMLER"), None);
    }

    #[test]
    fn ledger_amount_defaults_to_zero_for_missing_row() {
        let declaration = Declaration::new(MetaData::new(), month_labels());

        assert_eq!(declaration.ledger_amount(LedgerRow::PayableVat, 3), Decimal::ZERO);
    }

    #[test]
    fn replace_opening_carry_in_returns_previous_value() {
        let mut declaration = Declaration::new(MetaData::new(), month_labels())
            .with_values(LedgerRow::PriorPeriodCarryIn.label(), [dec!(75); MONTHS]);

        let previous = declaration.replace_opening_carry_in(dec!(10));

        assert_eq!(previous, Some(dec!(75)));
        assert_eq!(declaration.ledger_amount(LedgerRow::PriorPeriodCarryIn, 0), dec!(10));
        assert_eq!(declaration.ledger_amount(LedgerRow::PriorPeriodCarryIn, 1), dec!(75));
    }

    #[test]
    fn replace_opening_carry_in_without_row_writes_nothing() {
        let mut declaration = Declaration::new(MetaData::new(), month_labels());

        assert_eq!(declaration.replace_opening_carry_in(dec!(10)), None);
        assert!(!declaration.contains_row(LedgerRow::PriorPeriodCarryIn.label()));
    }
}
