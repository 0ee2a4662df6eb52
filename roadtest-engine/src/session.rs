//! A single booking in progress: configuration versions, the free-lesson
//! grant and the add-on selection.
use serde::{Deserialize, Serialize};

use crate::booking::BookingConfiguration;
use crate::catalog::{AddonId, CatalogEntry, LessonDuration};
use crate::config::PricingConfig;
use crate::error::QuoteError;
use crate::perks::PerkFlags;
use crate::quote::Quote;
use crate::selection::{Action, SelectionState, Transition};

/// Price shown on the "upgrade your free lesson" banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeOffer {
    pub from: LessonDuration,
    pub price_cents: i64,
    pub mock_test_price_cents: i64,
}

/// One in-progress booking: configuration, perk grant bookkeeping and the
/// add-on selection.
#[derive(Debug, Clone)]
pub struct BookingSession {
    pricing: PricingConfig,
    config: BookingConfiguration,
    perks: PerkFlags,
    configuration_version: u64,
    state: SelectionState,
}

impl BookingSession {
    /// Start a session and run the free-lesson grant for the first configuration.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::InvalidDistance`] for an invalid pickup distance
    /// and [`QuoteError::NegativeCentreFee`] for a negative centre fee.
    pub fn new(pricing: PricingConfig, config: BookingConfiguration) -> Result<Self, QuoteError> {
        let perks = Self::perks_for(&pricing, &config)?;
        let mut session = Self {
            state: SelectionState::new(config.test_type),
            pricing,
            config,
            perks,
            configuration_version: 1,
        };
        session.run_grant();
        Ok(session)
    }

    /// Start a session with the standard pricing table.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::InvalidDistance`] for an invalid pickup distance.
    pub fn with_standard_pricing(config: BookingConfiguration) -> Result<Self, QuoteError> {
        Self::new(PricingConfig::standard().clone(), config)
    }

    fn perks_for(
        pricing: &PricingConfig,
        config: &BookingConfiguration,
    ) -> Result<PerkFlags, QuoteError> {
        config.validate()?;
        if config.meet_at_centre {
            Ok(PerkFlags::none())
        } else {
            pricing.classify_distance(config.distance_km)
        }
    }

    fn run_grant(&mut self) -> Transition {
        let grant = Action::Grant {
            flags: self.perks,
            test_type: self.config.test_type,
            configuration_version: self.configuration_version,
        };
        self.state.apply(&self.pricing, &grant)
    }

    /// Switch to a new configuration.
    ///
    /// A different test type discards the selection. Any change to the test
    /// type, meet-at-centre flag or distance starts a new configuration
    /// version, so a grant may fire again; previously granted lessons stay.
    /// Returns whether a new version was started.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::InvalidDistance`] for an invalid pickup distance
    /// and [`QuoteError::NegativeCentreFee`] for a negative centre fee; the
    /// session is left unchanged.
    pub fn reconfigure(&mut self, next: BookingConfiguration) -> Result<bool, QuoteError> {
        let perks = Self::perks_for(&self.pricing, &next)?;
        if !self.config.perk_inputs_differ(&next) {
            self.config = next;
            return Ok(false);
        }

        if next.test_type != self.config.test_type {
            log::debug!(
                "test type {} -> {}; selection reset",
                self.config.test_type,
                next.test_type
            );
            self.state = SelectionState::new(next.test_type);
        }
        self.configuration_version += 1;
        self.config = next;
        self.perks = perks;
        self.run_grant();
        Ok(true)
    }

    /// Apply a user action, then give a deferred grant its chance to fire.
    pub fn apply(&mut self, action: Action) -> Transition {
        let transition = self.state.apply(&self.pricing, &action);
        self.run_grant();
        transition
    }

    pub fn toggle(&mut self, id: AddonId) -> Transition {
        self.apply(Action::Toggle(id))
    }

    pub fn upgrade(&mut self) -> Transition {
        self.apply(Action::Upgrade)
    }

    pub fn downgrade(&mut self) -> Transition {
        self.apply(Action::Downgrade)
    }

    #[must_use]
    pub fn catalog(&self) -> Vec<CatalogEntry> {
        self.pricing
            .build_catalog(self.config.test_type, self.perks, &self.state)
    }

    /// Current itemized quote.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::InvalidDistance`] if the configuration distance is invalid.
    pub fn quote(&self) -> Result<Quote, QuoteError> {
        self.pricing.compute_quote(&self.config, &self.state)
    }

    /// Perks earned by the current configuration; none when meeting at the centre.
    #[must_use]
    pub const fn perks(&self) -> PerkFlags {
        self.perks
    }

    /// Upgrade available for the held free lesson, if any.
    #[must_use]
    pub fn upgrade_offer(&self) -> Option<UpgradeOffer> {
        if self.state.is_upgraded() {
            return None;
        }
        let from = self.state.free_lesson()?.lesson?;
        Some(UpgradeOffer {
            from,
            price_cents: self.pricing.upgrade_price_cents(from),
            mock_test_price_cents: self.pricing.mock_test_price_cents,
        })
    }

    #[must_use]
    pub const fn configuration(&self) -> &BookingConfiguration {
        &self.config
    }

    #[must_use]
    pub const fn configuration_version(&self) -> u64 {
        self.configuration_version
    }

    #[must_use]
    pub const fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    #[must_use]
    pub const fn state(&self) -> &SelectionState {
        &self.state
    }

    #[must_use]
    pub fn into_state(self) -> SelectionState {
        self.state
    }
}
