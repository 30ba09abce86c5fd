use serde::{Deserialize, Serialize};

use crate::types::{Kilograms, Money};

/// A purchased product line, after boundary sanitisation.
///
/// All numeric fields are non-negative; see [`crate::engine::intake`] for the
/// clamp applied to user-entered values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductLineInput {
    /// Stable identifier, unique within a simulation
    pub id: String,
    /// Free-text description, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Customs classification code, opaque to the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ncm_code: Option<String>,
    pub quantity: u32,
    /// Unit price in the source currency
    pub unit_price_source: Money,
    pub unit_weight_kg: Kilograms,
}

impl ProductLineInput {
    pub fn total_weight_kg(&self) -> Kilograms {
        self.unit_weight_kg * Money::from(self.quantity)
    }

    /// FOB value in the source currency
    pub fn fob_value_source(&self) -> Money {
        self.unit_price_source * Money::from(self.quantity)
    }
}

/// A product line with every landed-cost field resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductLineResult {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ncm_code: Option<String>,
    pub quantity: u32,
    pub unit_price_source: Money,
    pub unit_weight_kg: Kilograms,

    pub total_weight_kg: Kilograms,
    pub fob_value_source: Money,
    /// FOB converted to local currency
    pub own_cost_local: Money,
    pub allocated_freight_local: Money,
    /// CFR: own cost plus allocated freight
    pub cost_plus_freight_local: Money,
    pub duty_base_local: Money,
    pub duty_local: Money,
    pub allocated_other_fees_local: Money,
    /// Cascading base: CFR + duty + allocated fees
    pub icms_base_local: Money,
    pub icms_local: Money,
    pub total_landed_cost_local: Money,
    /// CFR per unit (0 when quantity is 0)
    pub unit_cost_no_tax_local: Money,
    /// Landed cost per unit (0 when quantity is 0)
    pub unit_cost_with_tax_local: Money,
}
