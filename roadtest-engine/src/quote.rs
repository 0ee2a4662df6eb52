//! Itemized quote aggregation.
use serde::{Deserialize, Serialize};

use crate::booking::BookingConfiguration;
use crate::catalog::AddonId;
use crate::config::PricingConfig;
use crate::distance::DistancePricing;
use crate::error::QuoteError;
use crate::money::format_cents;
use crate::perks::PerkFlags;
use crate::selection::SelectionState;

/// What a quote line charges for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuoteLineKind {
    CentreFee,
    Transport,
    FreeDropoff,
    Addon { id: AddonId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteLine {
    pub kind: QuoteLineKind,
    pub label: String,
    pub amount_cents: i64,
    /// Undiscounted value, shown struck through when it differs from `amount_cents`.
    pub original_cents: i64,
}

/// Priced booking: total plus the lines that sum to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub total_cents: i64,
    pub breakdown: Vec<QuoteLine>,
    /// Transport split; `None` when meeting at the centre.
    pub transport: Option<DistancePricing>,
    pub perks: PerkFlags,
}

impl Quote {
    /// Total formatted with two decimals.
    #[must_use]
    pub fn total_display(&self) -> String {
        format_cents(self.total_cents)
    }

    /// Sum of discounts across free and upgraded items.
    #[must_use]
    pub fn savings_cents(&self) -> i64 {
        self.breakdown
            .iter()
            .map(|line| (line.original_cents - line.amount_cents).max(0))
            .sum()
    }

    #[must_use]
    pub fn addon_lines(&self) -> impl Iterator<Item = &QuoteLine> {
        self.breakdown
            .iter()
            .filter(|line| matches!(line.kind, QuoteLineKind::Addon { .. }))
    }
}

impl PricingConfig {
    /// Aggregate the centre fee, transport and selected add-ons.
    ///
    /// Meeting at the centre skips transport and perks entirely, so the
    /// distance is not inspected.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::InvalidDistance`] for a pickup booking with a
    /// negative or non-finite distance and [`QuoteError::NegativeCentreFee`]
    /// for a negative centre fee.
    pub fn compute_quote(
        &self,
        config: &BookingConfiguration,
        state: &SelectionState,
    ) -> Result<Quote, QuoteError> {
        config.validate()?;
        let mut breakdown = vec![QuoteLine {
            kind: QuoteLineKind::CentreFee,
            label: format!("{} test centre fee", config.test_type.label()),
            amount_cents: config.centre_base_price_cents,
            original_cents: config.centre_base_price_cents,
        }];

        let (transport, perks) = if config.meet_at_centre {
            (None, PerkFlags::none())
        } else {
            let pricing = self.price_distance(config.distance_km)?;
            let perks = self.classify_distance(config.distance_km)?;
            breakdown.push(QuoteLine {
                kind: QuoteLineKind::Transport,
                label: format!("Pickup transport ({:.1} km)", config.distance_km),
                amount_cents: pricing.total_cents,
                original_cents: pricing.total_cents,
            });
            if perks.free_dropoff {
                breakdown.push(QuoteLine {
                    kind: QuoteLineKind::FreeDropoff,
                    label: "Free drop-off".to_string(),
                    amount_cents: 0,
                    original_cents: 0,
                });
            }
            (Some(pricing), perks)
        };

        breakdown.extend(state.items().iter().map(|item| QuoteLine {
            kind: QuoteLineKind::Addon { id: item.id },
            label: item.display_name.clone(),
            amount_cents: item.price_cents,
            original_cents: item.original_price_cents,
        }));

        let total_cents = breakdown.iter().map(|line| line.amount_cents).sum();
        Ok(Quote {
            total_cents,
            breakdown,
            transport,
            perks,
        })
    }
}

/// Compute a quote with the standard pricing table.
///
/// # Errors
///
/// Returns [`QuoteError::InvalidDistance`] for an invalid pickup distance.
pub fn compute_quote(
    config: &BookingConfiguration,
    state: &SelectionState,
) -> Result<Quote, QuoteError> {
    PricingConfig::standard().compute_quote(config, state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::TestType;
    use crate::selection::Action;

    fn granted_state(km: f64) -> SelectionState {
        let mut state = SelectionState::new(TestType::G2);
        state.apply(
            PricingConfig::standard(),
            &Action::Grant {
                flags: crate::perks::classify_distance(km).unwrap(),
                test_type: TestType::G2,
                configuration_version: 1,
            },
        );
        state
    }

    #[test]
    fn far_pickup_with_free_lesson_totals_165() {
        let config = BookingConfiguration::pickup(TestType::G2, 120.0, 8_000);
        let quote = compute_quote(&config, &granted_state(120.0)).unwrap();
        assert_eq!(quote.total_cents, 16_500);
        assert_eq!(quote.total_display(), "165.00");
        assert_eq!(quote.transport.unwrap().total_cents, 8_500);
        assert!(quote.perks.free_lesson_60);
        assert_eq!(quote.savings_cents(), 5_000);
    }

    #[test]
    fn upgraded_mock_test_adds_forty() {
        let config = BookingConfiguration::pickup(TestType::G2, 120.0, 8_000);
        let mut state = granted_state(120.0);
        state.apply(PricingConfig::standard(), &Action::Upgrade);
        let quote = compute_quote(&config, &state).unwrap();
        assert_eq!(quote.total_cents, 20_500);
        let addons: Vec<_> = quote.addon_lines().collect();
        assert_eq!(addons.len(), 1);
        assert_eq!(addons[0].amount_cents, 4_000);
        assert_eq!(addons[0].original_cents, 10_000);
    }

    #[test]
    fn meeting_at_centre_charges_base_and_paid_addons_only() {
        let config = BookingConfiguration::new(TestType::G, true, 140.0, 9_500);
        let mut state = SelectionState::new(TestType::G);
        state.apply(PricingConfig::standard(), &Action::Toggle(AddonId::Lesson1Hr));
        let quote = compute_quote(&config, &state).unwrap();
        assert_eq!(quote.total_cents, 15_500);
        assert!(quote.transport.is_none());
        assert_eq!(quote.perks, PerkFlags::none());
        assert!(
            quote
                .breakdown
                .iter()
                .all(|line| line.kind != QuoteLineKind::Transport)
        );
    }

    #[test]
    fn meet_at_centre_ignores_bogus_distance() {
        let config = BookingConfiguration::new(TestType::G2, true, -5.0, 8_000);
        let state = SelectionState::new(TestType::G2);
        assert_eq!(compute_quote(&config, &state).unwrap().total_cents, 8_000);
    }

    #[test]
    fn invalid_pickup_distance_is_an_error() {
        let config = BookingConfiguration::pickup(TestType::G2, f64::NAN, 8_000);
        let state = SelectionState::new(TestType::G2);
        assert!(matches!(
            compute_quote(&config, &state),
            Err(QuoteError::InvalidDistance { .. })
        ));
    }

    #[test]
    fn breakdown_sums_to_total() {
        let config = BookingConfiguration::pickup(TestType::G2, 75.0, 8_000);
        let quote = compute_quote(&config, &granted_state(75.0)).unwrap();
        let sum: i64 = quote.breakdown.iter().map(|line| line.amount_cents).sum();
        assert_eq!(sum, quote.total_cents);
        assert!(
            quote
                .breakdown
                .iter()
                .any(|line| line.kind == QuoteLineKind::FreeDropoff)
        );
        assert_eq!(quote.total_cents, 8_000 + 6_250);
    }

    #[test]
    fn negative_centre_fee_fails_the_quote() {
        let config = BookingConfiguration::at_centre(TestType::G, -100);
        let state = SelectionState::new(TestType::G);
        assert_eq!(
            compute_quote(&config, &state),
            Err(QuoteError::NegativeCentreFee { value: -100 })
        );
    }
}
