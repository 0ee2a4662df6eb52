//! Pricing table driving every calculation in the engine.
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::booking::TestType;
use crate::catalog::LessonDuration;
use crate::constants;
use crate::error::{LoadError, PricingConfigError};

/// Rates, thresholds and catalog prices, all in cents and kilometers.
///
/// Missing JSON fields fall back to the published defaults, so a partial
/// override file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default = "PricingConfig::default_first_leg_km")]
    pub first_leg_km: f64,
    #[serde(default = "PricingConfig::default_first_leg_rate_cents")]
    pub first_leg_rate_cents: i64,
    #[serde(default = "PricingConfig::default_extra_rate_cents")]
    pub extra_rate_cents: i64,
    #[serde(default = "PricingConfig::default_free_dropoff_km")]
    pub free_dropoff_km: f64,
    #[serde(default = "PricingConfig::default_free_lesson_60_km")]
    pub free_lesson_60_km: f64,
    #[serde(default = "PricingConfig::default_mock_test_price_cents")]
    pub mock_test_price_cents: i64,
    #[serde(default = "PricingConfig::default_lesson_price_g2_cents")]
    pub lesson_price_g2_cents: i64,
    #[serde(default = "PricingConfig::default_lesson_price_g_cents")]
    pub lesson_price_g_cents: i64,
    #[serde(default = "PricingConfig::default_upgrade_from_30_min_cents")]
    pub upgrade_from_30_min_cents: i64,
    #[serde(default = "PricingConfig::default_upgrade_from_60_min_cents")]
    pub upgrade_from_60_min_cents: i64,
}

impl PricingConfig {
    const fn default_first_leg_km() -> f64 {
        constants::FIRST_LEG_KM
    }

    const fn default_first_leg_rate_cents() -> i64 {
        constants::FIRST_LEG_RATE_CENTS
    }

    const fn default_extra_rate_cents() -> i64 {
        constants::EXTRA_RATE_CENTS
    }

    const fn default_free_dropoff_km() -> f64 {
        constants::FREE_DROPOFF_KM
    }

    const fn default_free_lesson_60_km() -> f64 {
        constants::FREE_LESSON_60_KM
    }

    const fn default_mock_test_price_cents() -> i64 {
        constants::MOCK_TEST_PRICE_CENTS
    }

    const fn default_lesson_price_g2_cents() -> i64 {
        constants::LESSON_PRICE_G2_CENTS
    }

    const fn default_lesson_price_g_cents() -> i64 {
        constants::LESSON_PRICE_G_CENTS
    }

    const fn default_upgrade_from_30_min_cents() -> i64 {
        constants::UPGRADE_FROM_30_MIN_CENTS
    }

    const fn default_upgrade_from_60_min_cents() -> i64 {
        constants::UPGRADE_FROM_60_MIN_CENTS
    }

    /// Shared instance holding the published defaults.
    #[must_use]
    pub fn standard() -> &'static Self {
        static STANDARD: OnceLock<PricingConfig> = OnceLock::new();
        STANDARD.get_or_init(Self::default)
    }

    /// Parse a pricing table from JSON and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the table is inconsistent.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check prices are non-negative and thresholds are ordered.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), PricingConfigError> {
        let prices = [
            ("first_leg_rate_cents", self.first_leg_rate_cents),
            ("extra_rate_cents", self.extra_rate_cents),
            ("mock_test_price_cents", self.mock_test_price_cents),
            ("lesson_price_g2_cents", self.lesson_price_g2_cents),
            ("lesson_price_g_cents", self.lesson_price_g_cents),
            ("upgrade_from_30_min_cents", self.upgrade_from_30_min_cents),
            ("upgrade_from_60_min_cents", self.upgrade_from_60_min_cents),
        ];
        if let Some(&(field, value)) = prices.iter().find(|(_, value)| *value < 0) {
            return Err(PricingConfigError::NegativePrice { field, value });
        }

        let thresholds = [
            ("first_leg_km", self.first_leg_km),
            ("free_dropoff_km", self.free_dropoff_km),
            ("free_lesson_60_km", self.free_lesson_60_km),
        ];
        if let Some(&(field, value)) = thresholds
            .iter()
            .find(|(_, value)| !value.is_finite() || *value < 0.0)
        {
            return Err(PricingConfigError::InvalidThreshold { field, value });
        }

        if self.free_dropoff_km > self.free_lesson_60_km {
            return Err(PricingConfigError::ThresholdOrder {
                dropoff: self.free_dropoff_km,
                lesson_60: self.free_lesson_60_km,
            });
        }
        Ok(())
    }

    /// Price of a one-hour paid lesson for the test type.
    #[must_use]
    pub const fn lesson_price_cents(&self, test_type: TestType) -> i64 {
        match test_type {
            TestType::G2 => self.lesson_price_g2_cents,
            TestType::G => self.lesson_price_g_cents,
        }
    }

    /// Fixed price of converting a free lesson of this length into a mock test.
    #[must_use]
    pub const fn upgrade_price_cents(&self, duration: LessonDuration) -> i64 {
        match duration {
            LessonDuration::ThirtyMinutes => self.upgrade_from_30_min_cents,
            LessonDuration::OneHour => self.upgrade_from_60_min_cents,
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            first_leg_km: Self::default_first_leg_km(),
            first_leg_rate_cents: Self::default_first_leg_rate_cents(),
            extra_rate_cents: Self::default_extra_rate_cents(),
            free_dropoff_km: Self::default_free_dropoff_km(),
            free_lesson_60_km: Self::default_free_lesson_60_km(),
            mock_test_price_cents: Self::default_mock_test_price_cents(),
            lesson_price_g2_cents: Self::default_lesson_price_g2_cents(),
            lesson_price_g_cents: Self::default_lesson_price_g_cents(),
            upgrade_from_30_min_cents: Self::default_upgrade_from_30_min_cents(),
            upgrade_from_60_min_cents: Self::default_upgrade_from_60_min_cents(),
        }
    }
}
