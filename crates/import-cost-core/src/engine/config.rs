use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ImportCostError;
use crate::numeric::to_local;
use crate::types::{Money, Rate};

/// Basis used to split a shared cost across product lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationMethod {
    /// Proportional to `unit_weight_kg * quantity`
    #[default]
    Weight,
    /// Proportional to `unit_price_source * quantity`
    #[serde(alias = "fobValue")]
    FobValue,
    /// Proportional to unit count
    Quantity,
}

impl AllocationMethod {
    pub const ALL: [AllocationMethod; 3] = [
        AllocationMethod::Weight,
        AllocationMethod::FobValue,
        AllocationMethod::Quantity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationMethod::Weight => "weight",
            AllocationMethod::FobValue => "fob_value",
            AllocationMethod::Quantity => "quantity",
        }
    }
}

impl fmt::Display for AllocationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AllocationMethod {
    type Err = ImportCostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weight" => Ok(AllocationMethod::Weight),
            "fob_value" | "fobvalue" | "fob-value" | "fob" => Ok(AllocationMethod::FobValue),
            "quantity" => Ok(AllocationMethod::Quantity),
            other => Err(ImportCostError::InvalidInput {
                field: "allocation_method".into(),
                reason: format!("Unknown allocation method '{other}' (expected weight, fob_value or quantity)"),
            }),
        }
    }
}

/// Currency in which the international freight total is quoted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreightCurrency {
    /// Same currency as the unit prices; converted with `exchange_rate`
    #[default]
    Source,
    /// Already in local currency
    Local,
}

impl fmt::Display for FreightCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FreightCurrency::Source => f.write_str("source"),
            FreightCurrency::Local => f.write_str("local"),
        }
    }
}

impl FromStr for FreightCurrency {
    type Err = ImportCostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "source" => Ok(FreightCurrency::Source),
            "local" => Ok(FreightCurrency::Local),
            other => Err(ImportCostError::InvalidInput {
                field: "freight_currency".into(),
                reason: format!("Unknown freight currency '{other}' (expected source or local)"),
            }),
        }
    }
}

/// Rates and shared landed-cost inputs applied across every product line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Source-to-local exchange rate (e.g. 5.0 BRL per USD)
    pub exchange_rate: Rate,
    /// Import duty rate as a fraction of the freight-inclusive base
    pub duty_rate: Rate,
    /// ICMS rate as a fraction of the cascading base
    pub icms_rate: Rate,
    /// Total international freight
    pub freight_total: Money,
    /// Currency `freight_total` is quoted in
    #[serde(default)]
    pub freight_currency: FreightCurrency,
    /// Miscellaneous customs fees, already in local currency
    #[serde(default)]
    pub other_fees_total: Money,
    #[serde(default)]
    pub freight_allocation_method: AllocationMethod,
    #[serde(default)]
    pub fees_allocation_method: AllocationMethod,
}

impl ImportConfig {
    /// Freight total in local currency.
    pub fn freight_total_local(&self) -> Money {
        match self.freight_currency {
            FreightCurrency::Source => to_local(self.freight_total, self.exchange_rate),
            FreightCurrency::Local => self.freight_total,
        }
    }

    /// True when every amount and rate is non-negative.
    pub fn is_non_negative(&self) -> bool {
        [
            self.exchange_rate,
            self.duty_rate,
            self.icms_rate,
            self.freight_total,
            self.other_fees_total,
        ]
        .iter()
        .all(|v| *v >= Decimal::ZERO)
    }
}
