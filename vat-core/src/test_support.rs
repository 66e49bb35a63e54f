//! Shared declaration fixtures for unit tests.
//!
//! `opening_year` is internally consistent:
//!
//! | Month | Deductible | Total ded. | Payable | Carry-out | Refund |
//! |-------|-----------:|-----------:|--------:|----------:|-------:|
//! | Jan   | 2300       | 2300       | 0       | 500       | 0      |
//! | Feb   | 1500       | 2000       | 0       | 200       | 0      |
//! | Mar   | 1500       | 1700       | 100     | 0         | 200    |
//! | Apr–Nov | 1500     | 1500       | 300     | 0         | 0      |
//! | Dec   | 2000       | 2000       | 0       | 200       | 0      |
//!
//! with 1800 computed VAT on a 10000 base every month. `following_year`
//! opens with the 200 carried out of December.

use rust_decimal::Decimal;

use crate::models::{Declaration, LedgerRow, MONTHS, MetaData, MonthlyAmounts, YEAR_KEY};

pub(crate) fn month_labels() -> [String; MONTHS] {
    [
        "Ocak", "Şubat", "Mart", "Nisan", "Mayıs", "Haziran", "Temmuz", "Ağustos", "Eylül",
        "Ekim", "Kasım", "Aralık",
    ]
    .map(String::from)
}

pub(crate) fn amounts(values: [i64; MONTHS]) -> MonthlyAmounts {
    values.map(Decimal::from)
}

pub(crate) fn uniform(value: i64) -> MonthlyAmounts {
    [Decimal::from(value); MONTHS]
}

pub(crate) fn empty_declaration(year: i32) -> Declaration {
    let mut meta = MetaData::new();
    meta.insert("UNVAN", "ÖRNEK TİCARET A.Ş.");
    meta.insert(YEAR_KEY, year.to_string());
    Declaration::new(meta, month_labels())
}

pub(crate) fn opening_year(year: i32) -> Declaration {
    empty_declaration(year)
        .with_values(LedgerRow::TaxBaseTotal.label(), uniform(10000))
        .with_values(LedgerRow::ComputedVat.label(), uniform(1800))
        .with_values(LedgerRow::AdditionalVat.label(), uniform(0))
        .with_values(LedgerRow::TotalVat.label(), uniform(1800))
        .with_section("İNDİRİMLER")
        .with_values(
            LedgerRow::PriorPeriodCarryIn.label(),
            amounts([0, 500, 200, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
        )
        .with_values(
            LedgerRow::CurrentPeriodDeductible.label(),
            amounts([2300, 1500, 1500, 1500, 1500, 1500, 1500, 1500, 1500, 1500, 1500, 2000]),
        )
        .with_values(
            LedgerRow::TotalDeductions.label(),
            amounts([2300, 2000, 1700, 1500, 1500, 1500, 1500, 1500, 1500, 1500, 1500, 2000]),
        )
        .with_section("SONUÇ HESAPLARI")
        .with_values(
            LedgerRow::PayableVat.label(),
            amounts([0, 0, 100, 300, 300, 300, 300, 300, 300, 300, 300, 0]),
        )
        .with_values(
            LedgerRow::RefundDue.label(),
            amounts([0, 0, 200, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
        )
        .with_values(
            LedgerRow::NextPeriodCarryOut.label(),
            amounts([500, 200, 0, 0, 0, 0, 0, 0, 0, 0, 0, 200]),
        )
}

pub(crate) fn following_year(year: i32) -> Declaration {
    empty_declaration(year)
        .with_values(LedgerRow::TaxBaseTotal.label(), uniform(10000))
        .with_values(LedgerRow::ComputedVat.label(), uniform(1800))
        .with_values(LedgerRow::AdditionalVat.label(), uniform(0))
        .with_values(LedgerRow::TotalVat.label(), uniform(1800))
        .with_values(
            LedgerRow::PriorPeriodCarryIn.label(),
            amounts([200, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
        )
        .with_values(LedgerRow::CurrentPeriodDeductible.label(), uniform(1500))
        .with_values(
            LedgerRow::TotalDeductions.label(),
            amounts([1700, 1500, 1500, 1500, 1500, 1500, 1500, 1500, 1500, 1500, 1500, 1500]),
        )
        .with_values(
            LedgerRow::PayableVat.label(),
            amounts([100, 300, 300, 300, 300, 300, 300, 300, 300, 300, 300, 300]),
        )
        .with_values(LedgerRow::RefundDue.label(), uniform(0))
        .with_values(LedgerRow::NextPeriodCarryOut.label(), uniform(0))
}
