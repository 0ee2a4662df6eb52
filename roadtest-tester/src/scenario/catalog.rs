use anyhow::{Context, Result, ensure};

use crate::logic::{BookingSpec, QuotePlan, QuoteSummary};
use crate::scenario::TestScenario;
use roadtest_engine::{
    Action, AddonId, BookingConfiguration, LessonDuration, LineItem, SelectionState, TestType,
    Transition,
};

struct ScenarioEntry {
    key: &'static str,
    description: &'static str,
    plan: fn() -> QuotePlan,
}

const CATALOG: [ScenarioEntry; 8] = [
    ScenarioEntry {
        key: "smoke",
        description: "120 km G2 pickup earns a free 1-hour lesson",
        plan: smoke_plan,
    },
    ScenarioEntry {
        key: "far-pickup-grant",
        description: "75 km Full G pickup earns a free 30-minute lesson",
        plan: half_hour_grant_plan,
    },
    ScenarioEntry {
        key: "upgrade-roundtrip",
        description: "Upgrade to mock test and back restores the free lesson",
        plan: upgrade_roundtrip_plan,
    },
    ScenarioEntry {
        key: "meet-at-centre",
        description: "Meeting at the centre forfeits distance perks and transport",
        plan: meet_at_centre_plan,
    },
    ScenarioEntry {
        key: "mutual-exclusion",
        description: "Toggling paid add-ons replaces within the single slot",
        plan: mutual_exclusion_plan,
    },
    ScenarioEntry {
        key: "disabled-noop",
        description: "Hard-disabled actions leave the selection untouched",
        plan: disabled_noop_plan,
    },
    ScenarioEntry {
        key: "test-type-reset",
        description: "Changing test type discards the selection and re-grants",
        plan: test_type_reset_plan,
    },
    ScenarioEntry {
        key: "distance-sweep",
        description: "Seeded placeholder distances keep quotes consistent",
        plan: distance_sweep_plan,
    },
];

#[cfg(test)]
pub fn catalog_scenarios() -> Vec<TestScenario> {
    CATALOG
        .iter()
        .map(|entry| TestScenario::new(entry.key, (entry.plan)()))
        .collect()
}

pub fn catalog_descriptions() -> Vec<(&'static str, &'static str)> {
    CATALOG
        .iter()
        .map(|entry| (entry.key, entry.description))
        .collect()
}

pub fn find_catalog_scenario(name: &str) -> Option<TestScenario> {
    CATALOG
        .iter()
        .find(|entry| entry.key == name)
        .map(|entry| TestScenario::new(entry.key, (entry.plan)()))
}

fn transport_cents(summary: &QuoteSummary, config: &BookingConfiguration) -> Result<i64> {
    if config.meet_at_centre {
        return Ok(0);
    }
    Ok(summary.pricing.price_distance(config.distance_km)?.total_cents)
}

fn free_lesson(state: &SelectionState) -> Result<&LineItem> {
    state.free_lesson().context("expected a granted free lesson")
}

fn ensure_noop(summary: &QuoteSummary, index: usize) -> Result<()> {
    let record = summary.step(index)?;
    ensure!(
        matches!(record.transition, Some(Transition::NoOp(_))),
        "step {index} ({:?}) should be a no-op, got {:?}",
        record.step,
        record.transition
    );
    ensure!(
        record.state_before == record.state_after,
        "step {index} reported a no-op but changed the selection"
    );
    Ok(())
}

fn ensure_single_slot(summary: &QuoteSummary) -> Result<()> {
    for (index, record) in summary.steps.iter().enumerate() {
        ensure!(
            record.state_after.slot_count() <= 1,
            "step {index} left {} items in the lesson slot",
            record.state_after.slot_count()
        );
    }
    Ok(())
}

fn smoke_plan() -> QuotePlan {
    QuotePlan::fixed(BookingConfiguration::pickup(TestType::G2, 120.0, 8_000))
        .with_expectation(smoke_expectation)
}

fn smoke_expectation(summary: &QuoteSummary) -> Result<()> {
    let free = free_lesson(&summary.initial_state)?;
    ensure!(
        free.display_name.contains("1-Hour"),
        "expected a 1-hour lesson, got '{}'",
        free.display_name
    );
    ensure!(free.price_cents == 0, "free lesson must be free");
    ensure!(summary.perks.free_dropoff, "120 km earns free drop-off");

    let expected = summary.initial_config.centre_base_price_cents
        + transport_cents(summary, &summary.initial_config)?;
    ensure!(
        summary.initial_quote.total_cents == expected,
        "total {} != {expected}",
        summary.initial_quote.total_cents
    );
    Ok(())
}

fn half_hour_grant_plan() -> QuotePlan {
    QuotePlan::fixed(BookingConfiguration::pickup(TestType::G, 75.0, 9_000))
        .with_expectation(half_hour_grant_expectation)
}

fn half_hour_grant_expectation(summary: &QuoteSummary) -> Result<()> {
    let free = free_lesson(&summary.initial_state)?;
    ensure!(
        free.lesson == Some(LessonDuration::ThirtyMinutes),
        "expected a 30-minute lesson, got {:?}",
        free.lesson
    );
    ensure!(
        free.display_name == "Free 30-Minute G Driving Lesson",
        "unexpected name '{}'",
        free.display_name
    );
    ensure!(
        free.original_price_cents == summary.pricing.lesson_price_cents(TestType::G) / 2,
        "30-minute lesson is valued at half the hourly price"
    );
    ensure!(
        summary.perks.free_lesson_30 && !summary.perks.free_lesson_60,
        "75 km sits in the 30-minute tier"
    );
    Ok(())
}

fn upgrade_roundtrip_plan() -> QuotePlan {
    QuotePlan::fixed(BookingConfiguration::pickup(TestType::G2, 120.0, 8_000))
        .then(Action::Upgrade)
        .then(Action::Downgrade)
        .then(Action::Upgrade)
        .then(Action::Downgrade)
        .with_expectation(upgrade_roundtrip_expectation)
        .with_expectation(ensure_single_slot)
}

fn upgrade_roundtrip_expectation(summary: &QuoteSummary) -> Result<()> {
    let original = free_lesson(&summary.initial_state)?;
    let upgrade_price = summary.pricing.upgrade_price_cents(LessonDuration::OneHour);

    let upgraded = summary.step(0)?;
    ensure!(
        upgraded.transition == Some(Transition::Applied),
        "upgrade rejected: {:?}",
        upgraded.transition
    );
    let mock = upgraded
        .state_after
        .slot_item()
        .context("slot empty after upgrade")?;
    ensure!(mock.id == AddonId::MockTest, "slot holds {:?}", mock.id);
    ensure!(
        mock.price_cents == upgrade_price,
        "upgrade priced {} instead of {upgrade_price}",
        mock.price_cents
    );
    ensure!(
        upgraded.total_cents == summary.initial_quote.total_cents + upgrade_price,
        "total after upgrade {} should add {upgrade_price}",
        upgraded.total_cents
    );

    for index in [1, 3] {
        let restored = free_lesson(&summary.step(index)?.state_after)?;
        ensure!(
            restored == original,
            "downgrade {index} restored {restored:?} instead of {original:?}"
        );
    }
    ensure!(
        summary.final_quote.total_cents == summary.initial_quote.total_cents,
        "round trip changed the total"
    );
    Ok(())
}

fn meet_at_centre_plan() -> QuotePlan {
    QuotePlan::fixed(BookingConfiguration::new(TestType::G2, true, 140.0, 8_000))
        .then(Action::Toggle(AddonId::Lesson1Hr))
        .with_expectation(meet_at_centre_expectation)
}

fn meet_at_centre_expectation(summary: &QuoteSummary) -> Result<()> {
    ensure!(
        summary.initial_state.is_empty(),
        "no perk may be granted when meeting at the centre"
    );
    ensure!(!summary.perks.free_dropoff, "drop-off perk must be forfeited");
    ensure!(
        summary.final_quote.transport.is_none(),
        "transport must not be charged"
    );
    let expected = summary.final_config.centre_base_price_cents
        + summary.pricing.lesson_price_cents(TestType::G2);
    ensure!(
        summary.final_quote.total_cents == expected,
        "total {} != {expected}",
        summary.final_quote.total_cents
    );
    Ok(())
}

fn mutual_exclusion_plan() -> QuotePlan {
    QuotePlan::fixed(BookingConfiguration::pickup(TestType::G, 20.0, 9_000))
        .then(Action::Toggle(AddonId::MockTest))
        .then(Action::Toggle(AddonId::Lesson1Hr))
        .then(Action::Toggle(AddonId::MockTest))
        .then(Action::Toggle(AddonId::Lesson1Hr))
        .then(Action::Toggle(AddonId::Lesson1Hr))
        .with_expectation(mutual_exclusion_expectation)
        .with_expectation(ensure_single_slot)
}

fn mutual_exclusion_expectation(summary: &QuoteSummary) -> Result<()> {
    for (index, record) in summary.steps.iter().enumerate() {
        ensure!(
            record.transition == Some(Transition::Applied),
            "replace-on-toggle step {index} was rejected: {:?}",
            record.transition
        );
    }
    ensure!(
        summary.step(1)?.state_after.contains(AddonId::Lesson1Hr)
            && !summary.step(1)?.state_after.contains(AddonId::MockTest),
        "lesson should replace the mock test"
    );
    ensure!(
        summary.final_state.is_empty(),
        "final toggle should empty the slot"
    );
    ensure!(
        summary.final_quote.total_cents == summary.initial_quote.total_cents,
        "empty selection should price like the initial quote"
    );
    Ok(())
}

fn disabled_noop_plan() -> QuotePlan {
    QuotePlan::fixed(BookingConfiguration::pickup(TestType::G2, 130.0, 8_000))
        .then(Action::Toggle(AddonId::Lesson1Hr))
        .then(Action::Toggle(AddonId::MockTest))
        .then(Action::Toggle(AddonId::FreeLesson))
        .then(Action::Downgrade)
        .then(Action::Upgrade)
        .then(Action::Upgrade)
        .then(Action::Toggle(AddonId::MockTest))
        .with_expectation(disabled_noop_expectation)
}

fn disabled_noop_expectation(summary: &QuoteSummary) -> Result<()> {
    for index in 0..4 {
        ensure_noop(summary, index)?;
    }
    ensure!(
        summary.step(4)?.transition == Some(Transition::Applied),
        "upgrade from a held free lesson must apply"
    );
    ensure_noop(summary, 5)?;
    ensure_noop(summary, 6)?;
    ensure!(summary.final_state.is_upgraded(), "upgrade should persist");
    Ok(())
}

fn test_type_reset_plan() -> QuotePlan {
    QuotePlan::fixed(BookingConfiguration::pickup(TestType::G2, 120.0, 8_000))
        .then(Action::Upgrade)
        .reconfigure(BookingConfiguration::pickup(TestType::G, 120.0, 8_000))
        .with_expectation(test_type_reset_expectation)
}

fn test_type_reset_expectation(summary: &QuoteSummary) -> Result<()> {
    let reconfigured = summary.step(1)?;
    ensure!(
        reconfigured.new_version == Some(true),
        "test type change must start a new configuration"
    );
    ensure!(summary.configuration_version == 2, "expected version 2");
    ensure!(
        summary.final_state.test_type() == TestType::G,
        "selection kept the old test type"
    );
    ensure!(!summary.final_state.is_upgraded(), "upgrade flag must reset");
    let free = free_lesson(&summary.final_state)?;
    ensure!(
        free.display_name == "Free 1-Hour G Driving Lesson",
        "expected a fresh Full G grant, got '{}'",
        free.display_name
    );
    ensure!(
        summary
            .final_state
            .upgrade_lineage()
            .is_none(),
        "lineage must be cleared with the selection"
    );
    Ok(())
}

fn distance_sweep_plan() -> QuotePlan {
    QuotePlan::new(BookingSpec::Sampled)
        .then(Action::Toggle(AddonId::MockTest))
        .then(Action::Upgrade)
        .with_expectation(distance_sweep_expectation)
        .with_expectation(ensure_single_slot)
}

fn distance_sweep_expectation(summary: &QuoteSummary) -> Result<()> {
    let km = summary.initial_config.distance_km;
    ensure!(
        (50.0..150.0).contains(&km),
        "placeholder distance {km} outside [50, 150)"
    );
    let flags = summary.pricing.classify_distance(km)?;
    ensure!(flags == summary.perks, "session perks disagree with classifier");

    let duration = flags
        .free_lesson()
        .context("every placeholder distance earns a lesson")?;
    let free = free_lesson(&summary.initial_state)?;
    ensure!(
        free.lesson == Some(duration),
        "granted {:?} for {km} km, expected {duration:?}",
        free.lesson
    );

    let expected_initial = summary.initial_config.centre_base_price_cents
        + transport_cents(summary, &summary.initial_config)?;
    ensure!(
        summary.initial_quote.total_cents == expected_initial,
        "initial total {} != {expected_initial} at {km} km",
        summary.initial_quote.total_cents
    );

    ensure_noop(summary, 0)?;
    ensure!(
        summary.final_quote.total_cents
            == expected_initial + summary.pricing.upgrade_price_cents(duration),
        "upgrade from {duration:?} mispriced"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::plan::run_plan;
    use roadtest_engine::PricingConfig;

    #[test]
    fn every_catalog_scenario_passes_with_standard_pricing() {
        for scenario in catalog_scenarios() {
            for seed in [1_u64, 1337, 0xFEED] {
                let summary = run_plan(PricingConfig::standard(), &scenario.plan, seed).unwrap();
                for expectation in &scenario.plan.expectations {
                    expectation
                        .evaluate(&summary)
                        .unwrap_or_else(|err| panic!("{} seed {seed}: {err:#}", scenario.name));
                }
            }
        }
    }

    #[test]
    fn keys_are_unique_and_findable() {
        let keys: Vec<_> = catalog_descriptions().into_iter().map(|(k, _)| k).collect();
        for key in &keys {
            assert!(find_catalog_scenario(key).is_some(), "{key}");
            assert_eq!(keys.iter().filter(|k| *k == key).count(), 1);
        }
        assert!(find_catalog_scenario("nope").is_none());
    }
}
