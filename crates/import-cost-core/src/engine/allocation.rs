//! Proportional allocation of a shared cost across product lines.
//!
//! Covers:
//! 1. **Weight basis** -- share_i = total_weight_i / sum(total_weight)
//! 2. **FOB basis** -- share_i = fob_i / sum(fob), a source-currency ratio
//! 3. **Quantity basis** -- share_i = quantity_i / sum(quantity)
//!
//! A zero basis total allocates nothing. Freight and other fees are allocated
//! by independent calls, each with its own method and total.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::engine::config::AllocationMethod;
use crate::engine::intake::{sanitize_lines, ProductLineDraft};
use crate::engine::line::ProductLineInput;
use crate::error::ImportCostError;
use crate::numeric::{safe_div, sum_by};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::ImportCostResult;

// ---------------------------------------------------------------------------
// Core allocation
// ---------------------------------------------------------------------------

/// One line's slice of a shared cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostAllocation {
    /// Product line id
    pub id: String,
    /// The line's allocation basis (kg, source-currency FOB or units)
    pub basis: Decimal,
    /// Fraction of the total assigned to this line
    pub share: Rate,
    /// share * total
    pub amount: Money,
}

/// The basis a line contributes under `method`.
pub fn allocation_basis(line: &ProductLineInput, method: AllocationMethod) -> Decimal {
    match method {
        AllocationMethod::Weight => line.total_weight_kg(),
        AllocationMethod::FobValue => line.fob_value_source(),
        AllocationMethod::Quantity => Decimal::from(line.quantity),
    }
}

/// Sum of the bases under `method`, or None when a basis or the sum does
/// not fit in a `Decimal`.
pub(crate) fn checked_basis_total(
    lines: &[ProductLineInput],
    method: AllocationMethod,
) -> Option<Decimal> {
    lines.iter().try_fold(Decimal::ZERO, |acc, line| {
        let quantity = Decimal::from(line.quantity);
        let basis = match method {
            AllocationMethod::Weight => line.unit_weight_kg.checked_mul(quantity)?,
            AllocationMethod::FobValue => line.unit_price_source.checked_mul(quantity)?,
            AllocationMethod::Quantity => quantity,
        };
        acc.checked_add(basis)
    })
}

/// Split `total_to_allocate` across `lines` in proportion to `method`.
///
/// Output is aligned with `lines`. When the basis sums to zero every share is
/// zero and nothing is allocated.
pub fn allocate(
    lines: &[ProductLineInput],
    total_to_allocate: Money,
    method: AllocationMethod,
) -> Vec<CostAllocation> {
    let bases: Vec<Decimal> = lines
        .iter()
        .map(|line| allocation_basis(line, method))
        .collect();
    debug_assert!(
        bases.iter().all(|b| *b >= Decimal::ZERO),
        "allocation basis must be non-negative"
    );
    let basis_total: Decimal = bases.iter().sum();

    lines
        .iter()
        .zip(bases)
        .map(|(line, basis)| {
            let share = safe_div(basis, basis_total);
            CostAllocation {
                id: line.id.clone(),
                basis,
                share,
                amount: share * total_to_allocate,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Stand-alone allocation report
// ---------------------------------------------------------------------------

/// Input for a stand-alone allocation of one shared cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationInput {
    pub lines: Vec<ProductLineDraft>,
    /// Amount to distribute, in whatever currency the caller uses
    pub total_to_allocate: Money,
    #[serde(default)]
    pub method: AllocationMethod,
}

/// Output of a stand-alone allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationOutput {
    pub method: AllocationMethod,
    pub total_to_allocate: Money,
    /// Sum of the per-line bases
    pub basis_total: Decimal,
    pub allocations: Vec<CostAllocation>,
    /// Sum of allocated amounts (equals the total up to rounding)
    pub allocated_sum: Money,
    /// total_to_allocate - allocated_sum
    pub unallocated: Money,
}

/// Allocate a single shared cost and report the split.
pub fn calculate_allocation(
    input: &AllocationInput,
) -> ImportCostResult<ComputationOutput<AllocationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.total_to_allocate < Decimal::ZERO {
        return Err(ImportCostError::InvalidInput {
            field: "total_to_allocate".into(),
            reason: "Amount to allocate cannot be negative".into(),
        });
    }

    let sanitized = sanitize_lines(input.lines.clone())?;
    if sanitized.clamped_values > 0 {
        warnings.push(format!(
            "{} negative line value(s) clamped to zero",
            sanitized.clamped_values
        ));
    }

    if checked_basis_total(&sanitized.lines, input.method).is_none() {
        return Err(ImportCostError::InvalidInput {
            field: "lines".into(),
            reason: "value out of range".into(),
        });
    }

    let allocations = allocate(&sanitized.lines, input.total_to_allocate, input.method);
    let basis_total = sum_by(&allocations, |a| a.basis);
    let allocated_sum = sum_by(&allocations, |a| a.amount);

    if basis_total.is_zero() && !input.total_to_allocate.is_zero() {
        warnings.push(format!(
            "Allocation basis '{}' sums to zero; {} left unallocated",
            input.method, input.total_to_allocate
        ));
    }

    tracing::debug!(
        lines = allocations.len(),
        method = %input.method,
        %basis_total,
        "allocated shared cost"
    );

    let output = AllocationOutput {
        method: input.method,
        total_to_allocate: input.total_to_allocate,
        basis_total,
        allocations,
        allocated_sum,
        unallocated: input.total_to_allocate - allocated_sum,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        &format!("Proportional allocation by {}", input.method),
        &serde_json::json!({
            "method": input.method,
            "total_to_allocate": input.total_to_allocate,
            "line_count": input.lines.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
