//! Boundary sanitisation for user-entered product lines.
//!
//! The engine functions assume non-negative inputs. Front ends deserialize
//! [`ProductLineDraft`]s and pass them through [`sanitize_lines`] before
//! anything reaches [`crate::engine::simulate`].

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::line::ProductLineInput;
use crate::error::ImportCostError;
use crate::types::{Kilograms, Money};
use crate::ImportCostResult;

/// A product line as typed by a user: any sign, quantity not yet an integer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductLineDraft {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ncm_code: Option<String>,
    pub quantity: Decimal,
    pub unit_price_source: Money,
    pub unit_weight_kg: Kilograms,
}

/// Sanitised lines plus a count of the values that were clamped to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedLines {
    pub lines: Vec<ProductLineInput>,
    pub clamped_values: usize,
}

impl ProductLineDraft {
    /// Clamp negatives to zero and convert to an engine line.
    pub fn into_input(self) -> ImportCostResult<ProductLineInput> {
        self.into_input_counting().map(|(line, _)| line)
    }

    fn into_input_counting(self) -> ImportCostResult<(ProductLineInput, usize)> {
        let mut clamped = 0;
        let mut clamp = |value: Decimal| {
            if value < Decimal::ZERO {
                clamped += 1;
                Decimal::ZERO
            } else {
                value
            }
        };

        let quantity = clamp(self.quantity);
        let unit_price_source = clamp(self.unit_price_source);
        let unit_weight_kg = clamp(self.unit_weight_kg);

        if quantity.fract() != Decimal::ZERO {
            return Err(ImportCostError::InvalidInput {
                field: format!("lines[{}].quantity", self.id),
                reason: format!("Quantity must be a whole number of units, got {quantity}"),
            });
        }
        let quantity = quantity.to_u32().ok_or_else(|| ImportCostError::InvalidInput {
            field: format!("lines[{}].quantity", self.id),
            reason: format!("Quantity {quantity} exceeds the supported maximum of {}", u32::MAX),
        })?;

        Ok((
            ProductLineInput {
                id: self.id,
                description: self.description,
                ncm_code: self.ncm_code,
                quantity,
                unit_price_source,
                unit_weight_kg,
            },
            clamped,
        ))
    }
}

impl From<ProductLineInput> for ProductLineDraft {
    fn from(line: ProductLineInput) -> Self {
        ProductLineDraft {
            id: line.id,
            description: line.description,
            ncm_code: line.ncm_code,
            quantity: Decimal::from(line.quantity),
            unit_price_source: line.unit_price_source,
            unit_weight_kg: line.unit_weight_kg,
        }
    }
}

/// Sanitise every draft, preserving order.
pub fn sanitize_lines(drafts: Vec<ProductLineDraft>) -> ImportCostResult<SanitizedLines> {
    let mut lines = Vec::with_capacity(drafts.len());
    let mut clamped_values = 0;
    for draft in drafts {
        let (line, clamped) = draft.into_input_counting()?;
        clamped_values += clamped;
        lines.push(line);
    }
    Ok(SanitizedLines {
        lines,
        clamped_values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn draft(id: &str, quantity: Decimal, price: Decimal, weight: Decimal) -> ProductLineDraft {
        ProductLineDraft {
            id: id.into(),
            description: None,
            ncm_code: None,
            quantity,
            unit_price_source: price,
            unit_weight_kg: weight,
        }
    }

    #[test]
    fn test_valid_draft_passes_through() {
        let line = draft("A", dec!(10), dec!(10), dec!(2)).into_input().unwrap();
        assert_eq!(line.quantity, 10);
        assert_eq!(line.unit_price_source, dec!(10));
        assert_eq!(line.unit_weight_kg, dec!(2));
    }

    #[test]
    fn test_negatives_clamped_to_zero() {
        let out = sanitize_lines(vec![draft("A", dec!(-3), dec!(-1.5), dec!(-2))]).unwrap();
        let line = &out.lines[0];
        assert_eq!(line.quantity, 0);
        assert_eq!(line.unit_price_source, Decimal::ZERO);
        assert_eq!(line.unit_weight_kg, Decimal::ZERO);
        assert_eq!(out.clamped_values, 3);
    }

    #[test]
    fn test_whole_decimal_quantity_accepted() {
        let line = draft("A", dec!(4.000), dec!(1), dec!(1)).into_input().unwrap();
        assert_eq!(line.quantity, 4);
    }

    #[test]
    fn test_fractional_quantity_rejected() {
        let err = draft("A", dec!(2.5), dec!(1), dec!(1)).into_input();
        assert!(matches!(err, Err(ImportCostError::InvalidInput { .. })));
    }

    #[test]
    fn test_oversized_quantity_rejected() {
        assert!(draft("A", dec!(5000000000), dec!(1), dec!(1)).into_input().is_err());
    }

    #[test]
    fn test_order_preserved() {
        let out = sanitize_lines(vec![
            draft("first", dec!(1), dec!(1), dec!(1)),
            draft("second", dec!(2), dec!(1), dec!(1)),
            draft("third", dec!(3), dec!(1), dec!(1)),
        ])
        .unwrap();
        let ids: Vec<&str> = out.lines.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
        assert_eq!(out.clamped_values, 0);
    }

    #[test]
    fn test_missing_numeric_field_is_malformed() {
        let json = r#"{"id": "X", "quantity": 3}"#;
        assert!(serde_json::from_str::<ProductLineDraft>(json).is_err());
    }
}
