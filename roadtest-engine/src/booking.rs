//! Booking configuration supplied by the search form.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::QuoteError;

/// Ontario road-test classes the service books.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestType {
    #[serde(rename = "G2")]
    G2,
    #[serde(rename = "G", alias = "FullG")]
    G,
}

impl TestType {
    pub const ALL: [Self; 2] = [Self::G2, Self::G];

    /// Short code embedded in line-item names ("G2", "G").
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::G2 => "G2",
            Self::G => "G",
        }
    }

    /// Label shown in the test-type picker.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::G2 => "G2 Road Test",
            Self::G => "Full G Road Test",
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for TestType {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "G2" | "g2" => Ok(Self::G2),
            "G" | "g" | "FullG" | "fullg" | "full-g" => Ok(Self::G),
            other => Err(QuoteError::unknown("test type", other)),
        }
    }
}

/// Immutable inputs to a single quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingConfiguration {
    pub test_type: TestType,
    pub meet_at_centre: bool,
    /// One-way pickup distance; irrelevant when meeting at the centre.
    pub distance_km: f64,
    /// Base fee of the chosen test centre.
    pub centre_base_price_cents: i64,
}

impl BookingConfiguration {
    #[must_use]
    pub const fn new(
        test_type: TestType,
        meet_at_centre: bool,
        distance_km: f64,
        centre_base_price_cents: i64,
    ) -> Self {
        Self {
            test_type,
            meet_at_centre,
            distance_km,
            centre_base_price_cents,
        }
    }

    /// Pickup booking at the given distance.
    #[must_use]
    pub const fn pickup(test_type: TestType, distance_km: f64, centre_base_price_cents: i64) -> Self {
        Self::new(test_type, false, distance_km, centre_base_price_cents)
    }

    /// Booking where the candidate meets the instructor at the centre.
    #[must_use]
    pub const fn at_centre(test_type: TestType, centre_base_price_cents: i64) -> Self {
        Self::new(test_type, true, 0.0, centre_base_price_cents)
    }

    /// Reject a negative centre fee.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::NegativeCentreFee`] when the base price is below zero.
    pub fn validate(&self) -> Result<(), QuoteError> {
        if self.centre_base_price_cents < 0 {
            return Err(QuoteError::NegativeCentreFee {
                value: self.centre_base_price_cents,
            });
        }
        Ok(())
    }

    /// Whether the perk-relevant part of the configuration differs from `other`.
    ///
    /// The centre base price only affects the total and never re-arms perk grants.
    #[must_use]
    pub fn perk_inputs_differ(&self, other: &Self) -> bool {
        self.test_type != other.test_type
            || self.meet_at_centre != other.meet_at_centre
            || self.distance_km.to_bits() != other.distance_km.to_bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_codes_and_rejects_others() {
        assert_eq!("G2".parse::<TestType>(), Ok(TestType::G2));
        assert_eq!("FullG".parse::<TestType>(), Ok(TestType::G));
        assert_eq!(" G ".parse::<TestType>(), Ok(TestType::G));
        assert_eq!(
            "M1".parse::<TestType>(),
            Err(QuoteError::UnknownCatalogEntry {
                kind: "test type",
                value: "M1".to_string()
            })
        );
    }

    #[test]
    fn negative_centre_fee_is_rejected() {
        assert!(BookingConfiguration::at_centre(TestType::G, 0).validate().is_ok());
        assert_eq!(
            BookingConfiguration::pickup(TestType::G2, 60.0, -1).validate(),
            Err(QuoteError::NegativeCentreFee { value: -1 })
        );
    }

    #[test]
    fn serde_accepts_full_g_alias() {
        let parsed: TestType = serde_json::from_str("\"FullG\"").unwrap();
        assert_eq!(parsed, TestType::G);
        assert_eq!(serde_json::to_string(&TestType::G2).unwrap(), "\"G2\"");
    }

    #[test]
    fn perk_inputs_ignore_base_price() {
        let a = BookingConfiguration::pickup(TestType::G2, 120.0, 8_000);
        let mut b = a.clone();
        b.centre_base_price_cents = 9_000;
        assert!(!a.perk_inputs_differ(&b));
        b.distance_km = 60.0;
        assert!(a.perk_inputs_differ(&b));
        assert!(a.perk_inputs_differ(&BookingConfiguration::at_centre(TestType::G2, 8_000)));
    }
}
