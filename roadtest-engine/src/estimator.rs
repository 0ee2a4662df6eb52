//! Pickup-to-centre distance estimation.
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::centres::TestCentre;
use crate::error::{QuoteError, validate_distance};

/// Source of one-way pickup distances in kilometers.
///
/// Implementations must return a finite, non-negative distance; 0 means the
/// pickup and the centre are the same place.
pub trait DistanceEstimator {
    /// Estimate the road distance from `pickup` to `centre`.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::InvalidDistance`] when the estimate is unusable.
    fn estimate_km(&self, pickup: &str, centre: &TestCentre) -> Result<f64, QuoteError>;
}

fn fnv1a64(bytes: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;
    let mut hash = FNV_OFFSET;
    for b in bytes {
        hash = (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Stand-in for a routing service: whole kilometers in `[50, 150)`.
///
/// Deterministic for a given seed, pickup and centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderEstimator {
    seed: u64,
}

impl PlaceholderEstimator {
    pub const MIN_KM: u32 = 50;
    pub const SPAN_KM: u32 = 100;

    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl DistanceEstimator for PlaceholderEstimator {
    fn estimate_km(&self, pickup: &str, centre: &TestCentre) -> Result<f64, QuoteError> {
        let pickup = pickup.trim();
        if pickup.is_empty() {
            return Ok(0.0);
        }
        let mixed = self.seed
            ^ fnv1a64(pickup.to_ascii_lowercase().as_bytes())
            ^ fnv1a64(centre.id.as_bytes()).rotate_left(17);
        let mut rng = ChaCha20Rng::seed_from_u64(mixed);
        let km = Self::MIN_KM + rng.gen_range(0..Self::SPAN_KM);
        log::trace!("placeholder distance {pickup} -> {}: {km} km", centre.id);
        Ok(f64::from(km))
    }
}

/// Always returns the same distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedEstimator {
    distance_km: f64,
}

impl FixedEstimator {
    /// # Errors
    ///
    /// Returns [`QuoteError::InvalidDistance`] for a negative or non-finite distance.
    pub fn new(distance_km: f64) -> Result<Self, QuoteError> {
        Ok(Self {
            distance_km: validate_distance(distance_km)?,
        })
    }
}

impl DistanceEstimator for FixedEstimator {
    fn estimate_km(&self, _pickup: &str, _centre: &TestCentre) -> Result<f64, QuoteError> {
        Ok(self.distance_km)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centre() -> TestCentre {
        TestCentre {
            id: "oshawa".to_string(),
            name: "Oshawa".to_string(),
            address: "1423 Wilson Rd N".to_string(),
            base_price_cents: 9_000,
            region: "Durham".to_string(),
        }
    }

    #[test]
    fn placeholder_stays_in_range_and_is_deterministic() {
        let estimator = PlaceholderEstimator::new(0xDEAD_BEEF);
        let centre = centre();
        for address in ["301 Front St W", "100 Queen St W", "5000 Yonge St", "L4Z 1K7"] {
            let km = estimator.estimate_km(address, &centre).unwrap();
            assert!((50.0..150.0).contains(&km), "{address}: {km}");
            assert!((km - km.trunc()).abs() < f64::EPSILON);
            assert_eq!(estimator.estimate_km(address, &centre).unwrap(), km);
        }
    }

    #[test]
    fn empty_pickup_is_zero() {
        let estimator = PlaceholderEstimator::new(1);
        assert_eq!(estimator.estimate_km("   ", &centre()).unwrap(), 0.0);
    }

    #[test]
    fn fixed_estimator_validates() {
        let fixed = FixedEstimator::new(120.0).unwrap();
        assert_eq!(fixed.estimate_km("anywhere", &centre()).unwrap(), 120.0);
        assert!(FixedEstimator::new(-1.0).is_err());
    }
}
