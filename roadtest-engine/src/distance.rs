//! Two-tier per-kilometer transport pricing.
use serde::{Deserialize, Serialize};

use crate::config::PricingConfig;
use crate::error::{QuoteError, validate_distance};
use crate::money::km_charge_cents;

/// Transport cost split into the first leg and the discounted remainder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistancePricing {
    pub first_50km_cents: i64,
    pub remaining_cents: i64,
    pub total_cents: i64,
}

impl PricingConfig {
    /// Price a one-way pickup distance.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::InvalidDistance`] for negative or non-finite input.
    pub fn price_distance(&self, distance_km: f64) -> Result<DistancePricing, QuoteError> {
        let km = validate_distance(distance_km)?;
        let first_leg_km = km.min(self.first_leg_km);
        let extra_km = (km - self.first_leg_km).max(0.0);
        let first_50km_cents = km_charge_cents(first_leg_km, self.first_leg_rate_cents);
        let remaining_cents = km_charge_cents(extra_km, self.extra_rate_cents);
        Ok(DistancePricing {
            first_50km_cents,
            remaining_cents,
            total_cents: first_50km_cents + remaining_cents,
        })
    }
}

/// Price a pickup distance at $1.00/km for the first 50 km and $0.50/km after.
///
/// # Errors
///
/// Returns [`QuoteError::InvalidDistance`] for negative or non-finite input.
pub fn price_distance(distance_km: f64) -> Result<DistancePricing, QuoteError> {
    PricingConfig::standard().price_distance(distance_km)
}
