//! Aggregate market statistics returned by the analytics service.

use serde::{Deserialize, Serialize};

/// Relative slack allowed in the `min <= avg <= max` ordering. The service
/// computes the average as `sum / count` in doubles, which can land a few ULPs
/// outside the range when every price is equal.
const ORDERING_TOLERANCE: f64 = 1e-9;

/// Market-wide price statistics.
///
/// Immutable once received; a new fetch cycle replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSnapshot {
    pub count: u64,
    pub average_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}

impl StatisticsSnapshot {
    /// Check the invariants a well-formed snapshot must hold.
    ///
    /// Prices must be finite and non-negative, and when `count > 0`
    /// `min_price <= average_price <= max_price` up to rounding.
    pub fn check_invariants(&self) -> Result<(), String> {
        for (name, value) in [
            ("averagePrice", self.average_price),
            ("minPrice", self.min_price),
            ("maxPrice", self.max_price),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be a non-negative number, got {}", name, value));
            }
        }

        let slack = ORDERING_TOLERANCE * self.max_price.max(1.0);
        if self.count > 0
            && !(self.min_price - slack <= self.average_price
                && self.average_price <= self.max_price + slack)
        {
            return Err(format!(
                "expected minPrice <= averagePrice <= maxPrice, got {} / {} / {}",
                self.min_price, self.average_price, self.max_price
            ));
        }

        Ok(())
    }
}
