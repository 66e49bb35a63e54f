use serde::{Deserialize, Serialize};

/// Token that starts the header row of a declaration table.
pub const PERIOD_HEADER: &str = "DÖNEM";

/// Section markers recognised inside a declaration table.
pub const SECTION_MARKERS: [&str; 7] = [
    "İNDİRİMLER",
    "İHRAÇ KAYDIYLA TESLİMLER",
    "KISMİ İSTİSNA KAP. GİREN İŞLEMLER",
    "TAM İSTİSNA KAP. GİREN İŞLEMLER",
    "DİĞER İADE HAKKI DOĞURAN İŞLEMLER",
    "SONUÇ HESAPLARI",
    "DİĞER BİLGİLER",
];

pub fn is_section_marker(label: &str) -> bool {
    SECTION_MARKERS.contains(&label)
}

/// The ledger rows the correction engine reads and rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerRow {
    TaxBaseTotal,
    ComputedVat,
    AdditionalVat,
    TotalVat,
    PriorPeriodCarryIn,
    CurrentPeriodDeductible,
    TotalDeductions,
    PayableVat,
    NextPeriodCarryOut,
    RefundDue,
}

impl LedgerRow {
    pub const ALL: [LedgerRow; 10] = [
        LedgerRow::TaxBaseTotal,
        LedgerRow::ComputedVat,
        LedgerRow::AdditionalVat,
        LedgerRow::TotalVat,
        LedgerRow::PriorPeriodCarryIn,
        LedgerRow::CurrentPeriodDeductible,
        LedgerRow::TotalDeductions,
        LedgerRow::PayableVat,
        LedgerRow::NextPeriodCarryOut,
        LedgerRow::RefundDue,
    ];

    /// Canonical row label as it appears in a declaration.
    pub fn label(&self) -> &'static str {
        match self {
            Self::TaxBaseTotal => "MATRAH TOPLAMI",
            Self::ComputedVat => "HESAPLANAN KDV",
            Self::AdditionalVat => "İLAVE EDİLECEK KDV",
            Self::TotalVat => "TOPLAM KDV",
            Self::PriorPeriodCarryIn => "ÖNCEKİ DÖN. DEVR. İND. KDV",
            Self::CurrentPeriodDeductible => "BU DÖN. AİT İND. KDV",
            Self::TotalDeductions => "İNDİRİMLER TOPLAMI",
            Self::PayableVat => "ÖDENMESİ GEREKEN KDV",
            Self::NextPeriodCarryOut => "SONRAKİ DÖN. DEVREDEN KDV",
            Self::RefundDue => "İADE EDİLMESİ GEREKEN KDV",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|row| row.label() == label)
    }
}

impl std::fmt::Display for LedgerRow {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
