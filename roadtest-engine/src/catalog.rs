//! Purchasable add-ons and the line items a booking can carry.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::booking::TestType;
use crate::config::PricingConfig;
use crate::constants::{
    DESC_FREE_LESSON_30, DESC_FREE_LESSON_60, DESC_LESSON, DESC_LESSON_FREE_30_HELD,
    DESC_LESSON_FREE_60_HELD, DESC_MOCK_TEST, DESC_UPGRADED_MOCK_TEST,
};
use crate::error::QuoteError;
use crate::perks::PerkFlags;
use crate::selection::SelectionState;

/// Closed set of line-item identifiers.
///
/// All three share the booking's single lesson/mock-test slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddonId {
    #[serde(rename = "mock-test")]
    MockTest,
    #[serde(rename = "lesson-1hr")]
    Lesson1Hr,
    #[serde(rename = "free-lesson")]
    FreeLesson,
}

impl AddonId {
    /// Ids offered for purchase, in display order.
    pub const PURCHASABLE: [Self; 2] = [Self::MockTest, Self::Lesson1Hr];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MockTest => "mock-test",
            Self::Lesson1Hr => "lesson-1hr",
            Self::FreeLesson => "free-lesson",
        }
    }

    #[must_use]
    pub const fn occupies_slot(self) -> bool {
        matches!(self, Self::MockTest | Self::Lesson1Hr | Self::FreeLesson)
    }

    #[must_use]
    pub const fn is_lesson(self) -> bool {
        matches!(self, Self::Lesson1Hr | Self::FreeLesson)
    }
}

impl fmt::Display for AddonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddonId {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "mock-test" => Ok(Self::MockTest),
            "lesson-1hr" => Ok(Self::Lesson1Hr),
            "free-lesson" => Ok(Self::FreeLesson),
            other => Err(QuoteError::unknown("add-on", other)),
        }
    }
}

/// Length of a free lesson perk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonDuration {
    ThirtyMinutes,
    OneHour,
}

impl LessonDuration {
    /// Title-case label used in line-item names.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::ThirtyMinutes => "30-Minute",
            Self::OneHour => "1-Hour",
        }
    }

    /// Lower-case phrase used in prose ("your free 30-minute lesson").
    #[must_use]
    pub const fn phrase(self) -> &'static str {
        match self {
            Self::ThirtyMinutes => "30-minute",
            Self::OneHour => "1-hour",
        }
    }
}

/// A priced component of the booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: AddonId,
    pub display_name: String,
    /// Charged price; 0 for a free perk.
    pub price_cents: i64,
    /// Undiscounted reference price, display only.
    pub original_price_cents: i64,
    pub description: String,
    /// Set on free lessons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson: Option<LessonDuration>,
    /// Set on a mock test bought by upgrading a free lesson.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgraded_from: Option<LessonDuration>,
}

impl LineItem {
    /// Free lesson granted as a distance perk.
    #[must_use]
    pub fn is_free_perk(&self) -> bool {
        self.id == AddonId::FreeLesson && self.price_cents == 0
    }

    #[must_use]
    pub fn is_upgraded_mock_test(&self) -> bool {
        self.id == AddonId::MockTest && self.upgraded_from.is_some()
    }

    #[must_use]
    pub fn is_free(&self) -> bool {
        self.price_cents == 0
    }
}

/// Why a catalog entry cannot simply be added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisabledReason {
    /// The slot holds a conflicting paid item; toggling replaces it.
    SlotOccupied { by: AddonId },
    /// A free lesson perk holds the slot; only an upgrade may displace it.
    FreeLessonHeld { duration: LessonDuration },
    /// An upgraded mock test already holds the slot; a second one cannot be added.
    UpgradeActive,
}

impl DisabledReason {
    /// Whether toggling the entry must leave the selection untouched.
    #[must_use]
    pub const fn blocks_toggle(self) -> bool {
        !matches!(self, Self::SlotOccupied { .. })
    }

    /// Hint rendered under a disabled card.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::SlotOccupied {
                by: AddonId::MockTest,
            } => "Can't select with active mock test",
            Self::SlotOccupied { .. } => "Can't select with active lesson",
            Self::FreeLessonHeld {
                duration: LessonDuration::OneHour,
            } => "Free 1-hour lesson included",
            Self::FreeLessonHeld {
                duration: LessonDuration::ThirtyMinutes,
            } => "Free 30-minute lesson included",
            Self::UpgradeActive => "Already upgraded to mock test",
        }
    }
}

/// A purchasable add-on with its computed availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub item: LineItem,
    pub selected: bool,
    pub disabled: Option<DisabledReason>,
}

impl CatalogEntry {
    #[must_use]
    pub const fn is_disabled_for_selection(&self) -> bool {
        self.disabled.is_some()
    }
}

impl PricingConfig {
    #[must_use]
    pub fn mock_test_item(&self, test_type: TestType) -> LineItem {
        LineItem {
            id: AddonId::MockTest,
            display_name: format!("{test_type} Mock Test"),
            price_cents: self.mock_test_price_cents,
            original_price_cents: self.mock_test_price_cents,
            description: DESC_MOCK_TEST.to_string(),
            lesson: None,
            upgraded_from: None,
        }
    }

    #[must_use]
    pub fn lesson_item(&self, test_type: TestType, description: &str) -> LineItem {
        let price = self.lesson_price_cents(test_type);
        LineItem {
            id: AddonId::Lesson1Hr,
            display_name: format!("{test_type} Lesson (1 hour)"),
            price_cents: price,
            original_price_cents: price,
            description: description.to_string(),
            lesson: None,
            upgraded_from: None,
        }
    }

    /// Zero-price lesson perk. A 30-minute lesson is valued at half the hourly price.
    #[must_use]
    pub fn free_lesson_item(&self, test_type: TestType, duration: LessonDuration) -> LineItem {
        let hourly = self.lesson_price_cents(test_type);
        let (original_price_cents, description) = match duration {
            LessonDuration::ThirtyMinutes => (hourly / 2, DESC_FREE_LESSON_30),
            LessonDuration::OneHour => (hourly, DESC_FREE_LESSON_60),
        };
        LineItem {
            id: AddonId::FreeLesson,
            display_name: format!("Free {} {test_type} Driving Lesson", duration.title()),
            price_cents: 0,
            original_price_cents,
            description: description.to_string(),
            lesson: Some(duration),
            upgraded_from: None,
        }
    }

    #[must_use]
    pub fn upgraded_mock_test_item(&self, test_type: TestType, from: LessonDuration) -> LineItem {
        LineItem {
            id: AddonId::MockTest,
            display_name: format!("{test_type} Mock Test (Upgraded)"),
            price_cents: self.upgrade_price_cents(from),
            original_price_cents: self.mock_test_price_cents,
            description: DESC_UPGRADED_MOCK_TEST.to_string(),
            lesson: None,
            upgraded_from: Some(from),
        }
    }

    /// Purchasable add-ons for the test type, in display order, with availability
    /// computed from the current selection.
    #[must_use]
    pub fn build_catalog(
        &self,
        test_type: TestType,
        flags: PerkFlags,
        state: &SelectionState,
    ) -> Vec<CatalogEntry> {
        log::trace!("building {test_type} catalog for {flags:?}");
        AddonId::PURCHASABLE
            .into_iter()
            .filter_map(|id| self.catalog_entry(test_type, state, id))
            .collect()
    }

    /// Catalog entry for a single purchasable id; `None` for ids that are never sold.
    #[must_use]
    pub fn catalog_entry(
        &self,
        test_type: TestType,
        state: &SelectionState,
        id: AddonId,
    ) -> Option<CatalogEntry> {
        let held_free = state.free_lesson().and_then(|item| item.lesson);
        let item = match id {
            AddonId::MockTest => self.mock_test_item(test_type),
            AddonId::Lesson1Hr => {
                let description = match held_free {
                    Some(LessonDuration::OneHour) => DESC_LESSON_FREE_60_HELD,
                    Some(LessonDuration::ThirtyMinutes) => DESC_LESSON_FREE_30_HELD,
                    None => DESC_LESSON,
                };
                self.lesson_item(test_type, description)
            }
            AddonId::FreeLesson => return None,
        };
        Some(CatalogEntry {
            selected: state.contains(id),
            disabled: disabled_reason(id, state),
            item,
        })
    }
}

fn disabled_reason(id: AddonId, state: &SelectionState) -> Option<DisabledReason> {
    if id == AddonId::MockTest && state.is_upgraded() && !state.contains(AddonId::MockTest) {
        return Some(DisabledReason::UpgradeActive);
    }
    if let Some(free) = state.free_lesson().filter(|item| item.is_free_perk()) {
        return Some(DisabledReason::FreeLessonHeld {
            duration: free.lesson.unwrap_or(LessonDuration::OneHour),
        });
    }
    let conflict = match id {
        AddonId::MockTest => state
            .items()
            .iter()
            .find(|item| item.id.is_lesson())
            .map(|item| item.id),
        AddonId::Lesson1Hr => state.contains(AddonId::MockTest).then_some(AddonId::MockTest),
        AddonId::FreeLesson => None,
    };
    conflict.map(|by| DisabledReason::SlotOccupied { by })
}

/// Build the catalog with the standard pricing table.
#[must_use]
pub fn build_catalog(
    test_type: TestType,
    flags: PerkFlags,
    state: &SelectionState,
) -> Vec<CatalogEntry> {
    PricingConfig::standard().build_catalog(test_type, flags, state)
}
