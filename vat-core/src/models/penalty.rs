use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tax-loss penalty multiplier applied to a re-assessed amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PenaltyMultiplier {
    #[default]
    Single,
    Triple,
}

impl PenaltyMultiplier {
    pub fn factor(&self) -> Decimal {
        match self {
            Self::Single => Decimal::ONE,
            Self::Triple => Decimal::from(3),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "1",
            Self::Triple => "3",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "1" => Some(Self::Single),
            "3" => Some(Self::Triple),
            _ => None,
        }
    }
}
