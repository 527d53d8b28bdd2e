//! # Sale Total Computation
//!
//! Pure math for turning a cart into a financial breakdown.
//!
//! ## Computation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  subtotal  = Σ (unit price × quantity) over cart lines                  │
//! │  discount  = percentage: subtotal × bps / 10000                         │
//! │              fixed:      given cents (rejected when > subtotal)         │
//! │  tax       = (subtotal − discount) × tax bps / 10000   (0 if disabled)  │
//! │  total     = subtotal − discount + tax                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The breakdown is computed exactly once, at checkout, and persisted with
//! the sale. Nothing downstream ever recomputes it.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, Rate};
use crate::validation::{
    validate_cart_size, validate_price_cents, validate_quantity, validate_rate_bps,
};

// =============================================================================
// Input Types
// =============================================================================

/// One product + quantity + unit price submitted as part of a sale request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i64,
    /// Unit price in cents. Re-validated against the product's current
    /// selling price inside the checkout transaction.
    pub unit_price_cents: i64,
}

impl CartLine {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

/// A sale-level discount descriptor.
///
/// Percentage discounts carry basis points (1000 = 10%); fixed discounts
/// carry cents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Discount {
    Percentage(u32),
    Fixed(i64),
}

// =============================================================================
// Output Type
// =============================================================================

/// The computed financial breakdown of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleTotals {
    pub subtotal_cents: Money,
    pub discount_cents: Money,
    pub tax_cents: Money,
    pub total_cents: Money,
}

// =============================================================================
// Computation
// =============================================================================

/// Computes the subtotal/discount/tax/total breakdown for a cart.
///
/// ## Errors
/// - [`CoreError::EmptyCart`] when no lines are submitted
/// - [`CoreError::Validation`] for non-positive quantities, negative prices,
///   oversized carts, or rates above 100%
/// - [`CoreError::DiscountExceedsSubtotal`] when a fixed discount is larger
///   than the subtotal
/// - [`CoreError::InvalidTotal`] when the resulting total is not positive
///
/// ```rust
/// use shopfront_core::money::Rate;
/// use shopfront_core::totals::{compute_totals, CartLine};
///
/// let lines = vec![
///     CartLine { product_id: "a".into(), quantity: 2, unit_price_cents: 12000 },
///     CartLine { product_id: "b".into(), quantity: 1, unit_price_cents: 8000 },
/// ];
/// let totals = compute_totals(&lines, None, Some(Rate::from_bps(500))).unwrap();
/// assert_eq!(totals.subtotal_cents.cents(), 32000);
/// assert_eq!(totals.tax_cents.cents(), 1600);
/// assert_eq!(totals.total_cents.cents(), 33600);
/// ```
pub fn compute_totals(
    lines: &[CartLine],
    discount: Option<Discount>,
    tax: Option<Rate>,
) -> CoreResult<SaleTotals> {
    if lines.is_empty() {
        return Err(CoreError::EmptyCart);
    }
    validate_cart_size(lines.len())?;

    let mut subtotal = Money::zero();
    for line in lines {
        validate_quantity(line.quantity)?;
        validate_price_cents(line.unit_price_cents)?;
        subtotal += line.line_total();
    }

    let discount_amount = match discount {
        Some(Discount::Percentage(bps)) => {
            validate_rate_bps(bps)?;
            subtotal.apply_rate(Rate::from_bps(bps))
        }
        Some(Discount::Fixed(cents)) => {
            validate_price_cents(cents)?;
            let fixed = Money::from_cents(cents);
            if fixed > subtotal {
                return Err(CoreError::DiscountExceedsSubtotal {
                    discount: cents,
                    subtotal: subtotal.cents(),
                });
            }
            fixed
        }
        None => Money::zero(),
    };

    let taxable = subtotal - discount_amount;
    let tax_amount = match tax {
        Some(rate) => taxable.apply_rate(rate),
        None => Money::zero(),
    };

    let total = taxable + tax_amount;
    if !total.is_positive() {
        return Err(CoreError::InvalidTotal {
            cents: total.cents(),
        });
    }

    Ok(SaleTotals {
        subtotal_cents: subtotal,
        discount_cents: discount_amount,
        tax_cents: tax_amount,
        total_cents: total,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
