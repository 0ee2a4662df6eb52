use anyhow::{Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::sync::Arc;

use roadtest_engine::{
    Action, BookingConfiguration, BookingSession, BuiltinLoader, CentreDirectory, PerkFlags,
    PlaceholderEstimator, PricingConfig, Quote, QuoteEngine, SelectionState, TestType, Transition,
};

/// Pickup addresses the sampler draws from.
const SAMPLE_PICKUPS: [&str; 8] = [
    "301 Front St W, Toronto, ON M5V 2H1",
    "100 St George St, Toronto, ON M5S 1K7",
    "220 Dundas St W, Toronto, ON M5G 1X8",
    "100 Queen St W, Toronto, ON M5H 2N2",
    "770 Don Mills Rd, Toronto, ON M4W 3X8",
    "5000 Yonge St, North York, ON M3C 1K9",
    "5100 Erin Mills Pkwy, Mississauga, ON L4Z 1K7",
    "300 City Centre Dr, Mississauga, ON L5B 2C9",
];

/// How the plan obtains its first booking configuration.
#[derive(Debug, Clone)]
pub enum BookingSpec {
    Fixed(BookingConfiguration),
    /// Random test type, bundled centre and pickup address chosen from the
    /// iteration seed; distance from the placeholder estimator.
    Sampled,
}

#[derive(Debug, Clone)]
pub enum Step {
    Act(Action),
    Reconfigure(BookingConfiguration),
}

/// Booking, user steps and assertions for one scenario.
#[derive(Debug, Clone)]
pub struct QuotePlan {
    pub booking: BookingSpec,
    pub steps: Vec<Step>,
    pub expectations: Vec<QuoteExpectation>,
}

impl QuotePlan {
    #[must_use]
    pub const fn new(booking: BookingSpec) -> Self {
        Self {
            booking,
            steps: Vec::new(),
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub fn fixed(config: BookingConfiguration) -> Self {
        Self::new(BookingSpec::Fixed(config))
    }

    #[must_use]
    pub fn then(mut self, action: Action) -> Self {
        self.steps.push(Step::Act(action));
        self
    }

    #[must_use]
    pub fn reconfigure(mut self, config: BookingConfiguration) -> Self {
        self.steps.push(Step::Reconfigure(config));
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<QuoteExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Assertion hook run after a plan completes.
type QuoteExpectationFn = Arc<dyn Fn(&QuoteSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct QuoteExpectation(QuoteExpectationFn);

impl std::fmt::Debug for QuoteExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuoteExpectation").finish()
    }
}

impl QuoteExpectation {
    pub fn evaluate(&self, summary: &QuoteSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for QuoteExpectation
where
    F: Fn(&QuoteSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// What happened on one step of a plan.
#[derive(Debug, Clone)]
pub struct StepRecord {
    pub step: Step,
    /// Set for actions; reconfigure steps have no transition.
    pub transition: Option<Transition>,
    /// Set for reconfigure steps: whether a new configuration version started.
    pub new_version: Option<bool>,
    pub state_before: SelectionState,
    pub state_after: SelectionState,
    pub total_cents: i64,
}

/// Complete record of a plan run.
#[derive(Debug, Clone)]
pub struct QuoteSummary {
    pub seed: u64,
    pub pricing: PricingConfig,
    pub initial_config: BookingConfiguration,
    pub centre_id: Option<String>,
    pub initial_state: SelectionState,
    pub initial_quote: Quote,
    pub steps: Vec<StepRecord>,
    pub final_config: BookingConfiguration,
    pub final_state: SelectionState,
    pub final_quote: Quote,
    pub perks: PerkFlags,
    pub configuration_version: u64,
}

impl QuoteSummary {
    /// Step record at `index`, failing with context instead of panicking.
    pub fn step(&self, index: usize) -> Result<&StepRecord> {
        self.steps
            .get(index)
            .with_context(|| format!("plan recorded only {} steps", self.steps.len()))
    }
}

/// Execute a plan against a fresh session.
pub fn run_plan(pricing: &PricingConfig, plan: &QuotePlan, seed: u64) -> Result<QuoteSummary> {
    let (mut session, centre_id) = open_session(pricing, &plan.booking, seed)?;
    let initial_config = session.configuration().clone();
    let initial_state = session.state().clone();
    let initial_quote = session.quote().context("initial quote")?;

    let mut steps = Vec::with_capacity(plan.steps.len());
    for step in &plan.steps {
        let state_before = session.state().clone();
        let (transition, new_version) = match step {
            Step::Act(action) => (Some(session.apply(*action)), None),
            Step::Reconfigure(next) => {
                let started = session
                    .reconfigure(next.clone())
                    .with_context(|| format!("reconfigure to {next:?}"))?;
                (None, Some(started))
            }
        };
        let total_cents = session.quote().context("quote after step")?.total_cents;
        steps.push(StepRecord {
            step: step.clone(),
            transition,
            new_version,
            state_before,
            state_after: session.state().clone(),
            total_cents,
        });
    }

    Ok(QuoteSummary {
        seed,
        pricing: pricing.clone(),
        initial_config,
        centre_id,
        initial_state,
        initial_quote,
        steps,
        final_config: session.configuration().clone(),
        final_state: session.state().clone(),
        final_quote: session.quote().context("final quote")?,
        perks: session.perks(),
        configuration_version: session.configuration_version(),
    })
}

fn open_session(
    pricing: &PricingConfig,
    booking: &BookingSpec,
    seed: u64,
) -> Result<(BookingSession, Option<String>)> {
    match booking {
        BookingSpec::Fixed(config) => {
            let session = BookingSession::new(pricing.clone(), config.clone())?;
            Ok((session, None))
        }
        BookingSpec::Sampled => {
            let directory = CentreDirectory::builtin()?;
            anyhow::ensure!(!directory.is_empty(), "bundled directory is empty");
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let test_type = TestType::ALL[rng.gen_range(0..TestType::ALL.len())];
            let centre = directory
                .iter()
                .nth(rng.gen_range(0..directory.len()))
                .context("centre index out of range")?;
            let pickup = SAMPLE_PICKUPS[rng.gen_range(0..SAMPLE_PICKUPS.len())];

            let engine = QuoteEngine::new(BuiltinLoader, PlaceholderEstimator::new(seed));
            let config = engine.configure(test_type, &centre.id, false, pickup)?;
            let session = BookingSession::new(pricing.clone(), config)?;
            Ok((session, Some(centre.id.clone())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadtest_engine::AddonId;

    #[test]
    fn run_plan_records_each_step() {
        let plan = QuotePlan::fixed(BookingConfiguration::pickup(TestType::G2, 120.0, 8_000))
            .then(Action::Upgrade)
            .then(Action::Toggle(AddonId::MockTest));
        let summary = run_plan(PricingConfig::standard(), &plan, 1).unwrap();
        assert_eq!(summary.initial_quote.total_cents, 16_500);
        assert_eq!(summary.steps.len(), 2);
        assert_eq!(summary.step(0).unwrap().transition, Some(Transition::Applied));
        assert_eq!(summary.step(0).unwrap().total_cents, 20_500);
        assert!(!summary.step(1).unwrap().transition.unwrap().is_applied());
        assert!(summary.step(2).is_err());
    }

    #[test]
    fn sampled_booking_is_deterministic_per_seed() {
        let plan = QuotePlan::new(BookingSpec::Sampled);
        let a = run_plan(PricingConfig::standard(), &plan, 99).unwrap();
        let b = run_plan(PricingConfig::standard(), &plan, 99).unwrap();
        assert_eq!(a.initial_config, b.initial_config);
        assert_eq!(a.centre_id, b.centre_id);
        assert!((50.0..150.0).contains(&a.initial_config.distance_km));
    }
}
