//! Road-Test Quote Engine
//!
//! Pricing and add-on eligibility rules for road-test bookings: transport
//! pricing, distance perks, the add-on catalog, the single-slot selection
//! state machine and itemized quotes. No UI or platform dependencies.

pub mod booking;
pub mod catalog;
pub mod centres;
pub mod config;
mod constants;
pub mod distance;
pub mod error;
pub mod estimator;
pub mod money;
pub mod perks;
pub mod quote;
pub mod selection;
pub mod session;

// Re-export commonly used types
pub use booking::{BookingConfiguration, TestType};
pub use catalog::{
    AddonId, CatalogEntry, DisabledReason, LessonDuration, LineItem, build_catalog,
};
pub use centres::{CentreDirectory, TestCentre};
pub use config::PricingConfig;
pub use distance::{DistancePricing, price_distance};
pub use error::{LoadError, PricingConfigError, QuoteError};
pub use estimator::{DistanceEstimator, FixedEstimator, PlaceholderEstimator};
pub use money::{format_cents, format_dollars};
pub use perks::{PerkFlags, classify_distance};
pub use quote::{Quote, QuoteLine, QuoteLineKind, compute_quote};
pub use selection::{
    Action, NoOpReason, SelectionState, Transition, apply_action, apply_action_with,
};
pub use session::{BookingSession, UpgradeOffer};

/// Trait for abstracting directory loading operations
/// Platform-specific implementations should provide this
pub trait DirectoryLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the test-centre directory
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be loaded.
    fn load_directory(&self) -> Result<CentreDirectory, Self::Error>;

    /// Load the pricing table; the standard table unless overridden
    ///
    /// # Errors
    ///
    /// Returns an error if the pricing table cannot be loaded or validated.
    fn load_pricing(&self) -> Result<PricingConfig, Self::Error> {
        Ok(PricingConfig::standard().clone())
    }
}

/// Loader backed by the directory bundled with the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinLoader;

impl DirectoryLoader for BuiltinLoader {
    type Error = LoadError;

    fn load_directory(&self) -> Result<CentreDirectory, Self::Error> {
        CentreDirectory::builtin()
    }
}

/// Failure while opening a booking session.
#[derive(Debug, thiserror::Error)]
pub enum EngineError<E>
where
    E: std::error::Error + 'static,
{
    #[error("failed to load booking data")]
    Load(#[source] E),
    #[error(transparent)]
    Quote(#[from] QuoteError),
}

/// Entry point binding a data loader to a distance estimator.
pub struct QuoteEngine<L, D>
where
    L: DirectoryLoader,
    D: DistanceEstimator,
{
    loader: L,
    estimator: D,
}

impl<L, D> QuoteEngine<L, D>
where
    L: DirectoryLoader,
    D: DistanceEstimator,
{
    /// Create a new engine with the provided loader and estimator
    pub const fn new(loader: L, estimator: D) -> Self {
        Self { loader, estimator }
    }

    /// Borrow the distance estimator.
    pub const fn estimator(&self) -> &D {
        &self.estimator
    }

    /// Resolve a centre and estimate the pickup distance into a configuration.
    ///
    /// `pickup` is ignored when meeting at the centre.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be loaded, the centre is
    /// unknown, or the estimator fails.
    pub fn configure(
        &self,
        test_type: TestType,
        centre_id: &str,
        meet_at_centre: bool,
        pickup: &str,
    ) -> Result<BookingConfiguration, EngineError<L::Error>> {
        let directory = self.loader.load_directory().map_err(EngineError::Load)?;
        let centre = directory.find(centre_id)?;
        let distance_km = if meet_at_centre {
            0.0
        } else {
            self.estimator.estimate_km(pickup, centre)?
        };
        log::debug!(
            "configured {test_type} at {} ({distance_km} km, meet at centre: {meet_at_centre})",
            centre.id
        );
        Ok(BookingConfiguration::new(
            test_type,
            meet_at_centre,
            distance_km,
            centre.base_price_cents,
        ))
    }

    /// Open a booking session for a centre and pickup address.
    ///
    /// # Errors
    ///
    /// Returns an error if loading, centre lookup or distance estimation fails.
    pub fn open_session(
        &self,
        test_type: TestType,
        centre_id: &str,
        meet_at_centre: bool,
        pickup: &str,
    ) -> Result<BookingSession, EngineError<L::Error>> {
        let config = self.configure(test_type, centre_id, meet_at_centre, pickup)?;
        let pricing = self.loader.load_pricing().map_err(EngineError::Load)?;
        Ok(BookingSession::new(pricing, config)?)
    }
}
