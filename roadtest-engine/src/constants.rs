//! Centralized pricing constants for road-test booking quotes.
//!
//! All monetary values are integer cents. These are the defaults behind
//! [`crate::config::PricingConfig`]; a deployment may override them with a
//! reviewed JSON pricing table, but the engine never invents prices outside
//! this table.

// Transport --------------------------------------------------------------
/// Kilometers billed at the first-leg rate.
pub(crate) const FIRST_LEG_KM: f64 = 50.0;
/// Per-kilometer rate for the first leg ($1.00/km).
pub(crate) const FIRST_LEG_RATE_CENTS: i64 = 100;
/// Per-kilometer rate beyond the first leg ($0.50/km).
pub(crate) const EXTRA_RATE_CENTS: i64 = 50;

// Perk thresholds ----------------------------------------------------------
/// Pickups at or beyond this distance earn free drop-off and a 30-minute lesson.
pub(crate) const FREE_DROPOFF_KM: f64 = 50.0;
/// Pickups at or beyond this distance earn a 1-hour lesson instead.
pub(crate) const FREE_LESSON_60_KM: f64 = 100.0;

// Add-on catalog -----------------------------------------------------------
pub(crate) const MOCK_TEST_PRICE_CENTS: i64 = 10_000;
pub(crate) const LESSON_PRICE_G2_CENTS: i64 = 5_000;
pub(crate) const LESSON_PRICE_G_CENTS: i64 = 6_000;

// Free-lesson upgrades -----------------------------------------------------
pub(crate) const UPGRADE_FROM_30_MIN_CENTS: i64 = 5_000;
pub(crate) const UPGRADE_FROM_60_MIN_CENTS: i64 = 4_000;

// Line-item copy -----------------------------------------------------------
pub(crate) const DESC_MOCK_TEST: &str = "Practice your test with our experienced instructors";
pub(crate) const DESC_LESSON: &str = "One-on-one lesson with a professional instructor";
pub(crate) const DESC_LESSON_FREE_60_HELD: &str = "You already have a free 1-hour lesson";
pub(crate) const DESC_LESSON_FREE_30_HELD: &str = "Available as a free lesson if pickup is 100km+";
pub(crate) const DESC_FREE_LESSON_30: &str = "Included as a free perk for 50km+ pickup distance";
pub(crate) const DESC_FREE_LESSON_60: &str = "Included as a free perk for 100km+ pickup distance";
pub(crate) const DESC_UPGRADED_MOCK_TEST: &str = "Upgraded from free lesson";
