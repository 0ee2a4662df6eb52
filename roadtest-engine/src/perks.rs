//! Distance-tier classification for free pickup perks.
use serde::{Deserialize, Serialize};

use crate::catalog::LessonDuration;
use crate::config::PricingConfig;
use crate::error::{QuoteError, validate_distance};

/// Independent perk flags earned by a pickup distance.
///
/// Drop-off and a lesson tier are both set for any distance past the drop-off
/// threshold; the two lesson tiers never overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerkFlags {
    pub free_dropoff: bool,
    pub free_lesson_30: bool,
    pub free_lesson_60: bool,
}

impl PerkFlags {
    /// No perks; used whenever the candidate meets at the centre.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            free_dropoff: false,
            free_lesson_30: false,
            free_lesson_60: false,
        }
    }

    /// Free lesson earned, if any. The 1-hour tier wins when both are set.
    #[must_use]
    pub const fn free_lesson(self) -> Option<LessonDuration> {
        if self.free_lesson_60 {
            Some(LessonDuration::OneHour)
        } else if self.free_lesson_30 {
            Some(LessonDuration::ThirtyMinutes)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn any(self) -> bool {
        self.free_dropoff || self.free_lesson_30 || self.free_lesson_60
    }
}

impl PricingConfig {
    /// Classify a pickup distance against this table's thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::InvalidDistance`] for negative or non-finite input.
    pub fn classify_distance(&self, distance_km: f64) -> Result<PerkFlags, QuoteError> {
        let km = validate_distance(distance_km)?;
        Ok(PerkFlags {
            free_dropoff: km >= self.free_dropoff_km,
            free_lesson_30: km >= self.free_dropoff_km && km < self.free_lesson_60_km,
            free_lesson_60: km >= self.free_lesson_60_km,
        })
    }
}

/// Classify a pickup distance with the standard thresholds (50 km / 100 km).
///
/// # Errors
///
/// Returns [`QuoteError::InvalidDistance`] for negative or non-finite input.
pub fn classify_distance(distance_km: f64) -> Result<PerkFlags, QuoteError> {
    PricingConfig::standard().classify_distance(distance_km)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_fifty_earns_nothing() {
        for km in [0.0, 10.0, 49.0, 49.999] {
            assert_eq!(classify_distance(km).unwrap(), PerkFlags::none(), "{km} km");
        }
    }

    #[test]
    fn fifty_to_hundred_earns_dropoff_and_half_hour() {
        for km in [50.0, 75.5, 99.999] {
            let flags = classify_distance(km).unwrap();
            assert!(flags.free_dropoff);
            assert!(flags.free_lesson_30);
            assert!(!flags.free_lesson_60);
            assert_eq!(flags.free_lesson(), Some(LessonDuration::ThirtyMinutes));
        }
    }

    #[test]
    fn hundred_and_beyond_earns_dropoff_and_full_hour() {
        for km in [100.0, 120.0, 1_000.0] {
            let flags = classify_distance(km).unwrap();
            assert!(flags.free_dropoff);
            assert!(!flags.free_lesson_30);
            assert!(flags.free_lesson_60);
            assert_eq!(flags.free_lesson(), Some(LessonDuration::OneHour));
        }
    }

    #[test]
    fn invalid_distances_fail_fast() {
        assert!(matches!(
            classify_distance(-0.5),
            Err(QuoteError::InvalidDistance { .. })
        ));
        assert!(classify_distance(f64::NAN).is_err());
        assert!(classify_distance(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn one_hour_tier_takes_priority_when_both_set() {
        let flags = PerkFlags {
            free_dropoff: true,
            free_lesson_30: true,
            free_lesson_60: true,
        };
        assert_eq!(flags.free_lesson(), Some(LessonDuration::OneHour));
        assert!(!PerkFlags::none().any());
    }
}
