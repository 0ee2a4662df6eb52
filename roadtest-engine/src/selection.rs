//! Add-on selection state and its transitions.
//!
//! Every action is total: an action that is illegal in the current state is
//! reported as [`Transition::NoOp`] and leaves the state exactly as it was.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::booking::TestType;
use crate::catalog::{AddonId, DisabledReason, LineItem};
use crate::config::PricingConfig;
use crate::perks::PerkFlags;

/// Add-ons chosen for one booking configuration.
///
/// At most one item ever occupies the lesson/mock-test slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    test_type: TestType,
    items: SmallVec<[LineItem; 2]>,
    /// Free lesson that was converted into the current upgraded mock test.
    upgrade_lineage: Option<LineItem>,
    upgraded: bool,
    /// Configuration version the free-lesson grant last fired for.
    granted_for: Option<u64>,
}

/// Inputs to the selection state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Toggle(AddonId),
    Grant {
        flags: PerkFlags,
        test_type: TestType,
        configuration_version: u64,
    },
    Upgrade,
    Downgrade,
}

/// Outcome of applying an [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    Applied,
    NoOp(NoOpReason),
}

impl Transition {
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Why an action left the selection untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NoOpReason {
    NotPurchasable { id: AddonId },
    Disabled { reason: DisabledReason },
    TestTypeMismatch { expected: TestType, got: TestType },
    AlreadyGranted { configuration_version: u64 },
    NoLessonEarned,
    FreeLessonPresent,
    SlotHeldByMockTest,
    NoFreeLesson,
    AlreadyUpgraded,
    NotUpgraded,
}

impl fmt::Display for NoOpReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPurchasable { id } => write!(f, "{id} cannot be toggled"),
            Self::Disabled { reason } => f.write_str(reason.message()),
            Self::TestTypeMismatch { expected, got } => {
                write!(f, "grant for {got} ignored by a {expected} selection")
            }
            Self::AlreadyGranted {
                configuration_version,
            } => write!(
                f,
                "free lesson already granted for configuration {configuration_version}"
            ),
            Self::NoLessonEarned => f.write_str("pickup distance earns no free lesson"),
            Self::FreeLessonPresent => f.write_str("a free lesson is already selected"),
            Self::SlotHeldByMockTest => f.write_str("a mock test holds the lesson slot"),
            Self::NoFreeLesson => f.write_str("no free lesson to upgrade"),
            Self::AlreadyUpgraded => f.write_str("free lesson already upgraded"),
            Self::NotUpgraded => f.write_str("nothing to downgrade"),
        }
    }
}

impl SelectionState {
    /// Empty selection for a freshly entered configuration.
    #[must_use]
    pub fn new(test_type: TestType) -> Self {
        Self {
            test_type,
            items: SmallVec::new(),
            upgrade_lineage: None,
            upgraded: false,
            granted_for: None,
        }
    }

    #[must_use]
    pub const fn test_type(&self) -> TestType {
        self.test_type
    }

    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: AddonId) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    #[must_use]
    pub fn free_lesson(&self) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == AddonId::FreeLesson)
    }

    /// Item currently holding the lesson/mock-test slot.
    #[must_use]
    pub fn slot_item(&self) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id.occupies_slot())
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.items.iter().filter(|item| item.id.occupies_slot()).count()
    }

    #[must_use]
    pub const fn is_upgraded(&self) -> bool {
        self.upgraded
    }

    #[must_use]
    pub const fn upgrade_lineage(&self) -> Option<&LineItem> {
        self.upgrade_lineage.as_ref()
    }

    #[must_use]
    pub const fn granted_for(&self) -> Option<u64> {
        self.granted_for
    }

    /// Apply an action in place.
    pub fn apply(&mut self, config: &PricingConfig, action: &Action) -> Transition {
        let transition = match *action {
            Action::Toggle(id) => self.toggle(config, id),
            Action::Grant {
                flags,
                test_type,
                configuration_version,
            } => self.grant(config, flags, test_type, configuration_version),
            Action::Upgrade => self.upgrade(config),
            Action::Downgrade => self.downgrade(),
        };

        match transition {
            Transition::Applied => {
                if self.items.is_empty() {
                    self.granted_for = None;
                }
                log::debug!(
                    "{action:?} applied; slot holds {:?}",
                    self.slot_item().map(|item| item.display_name.as_str())
                );
            }
            Transition::NoOp(reason) => log::debug!("{action:?} ignored: {reason}"),
        }
        transition
    }

    fn toggle(&mut self, config: &PricingConfig, id: AddonId) -> Transition {
        let Some(entry) = config.catalog_entry(self.test_type, self, id) else {
            return Transition::NoOp(NoOpReason::NotPurchasable { id });
        };
        // The upgraded mock test leaves only through a downgrade or a lesson replacing it.
        if id == AddonId::MockTest && self.upgraded {
            return Transition::NoOp(NoOpReason::Disabled {
                reason: DisabledReason::UpgradeActive,
            });
        }
        if let Some(reason) = entry.disabled.filter(|reason| reason.blocks_toggle()) {
            return Transition::NoOp(NoOpReason::Disabled { reason });
        }

        if entry.selected {
            self.items.retain(|item| item.id != id);
        } else {
            self.items.retain(|item| !item.id.occupies_slot());
            self.items.push(entry.item);
        }
        self.upgraded &= self.items.iter().any(LineItem::is_upgraded_mock_test);
        Transition::Applied
    }

    fn grant(
        &mut self,
        config: &PricingConfig,
        flags: PerkFlags,
        test_type: TestType,
        configuration_version: u64,
    ) -> Transition {
        if test_type != self.test_type {
            return Transition::NoOp(NoOpReason::TestTypeMismatch {
                expected: self.test_type,
                got: test_type,
            });
        }
        if self.granted_for == Some(configuration_version) {
            return Transition::NoOp(NoOpReason::AlreadyGranted {
                configuration_version,
            });
        }
        let Some(duration) = flags.free_lesson() else {
            return Transition::NoOp(NoOpReason::NoLessonEarned);
        };
        if self.free_lesson().is_some() {
            return Transition::NoOp(NoOpReason::FreeLessonPresent);
        }
        // Deferred until the mock test leaves the slot.
        if self.contains(AddonId::MockTest) {
            return Transition::NoOp(NoOpReason::SlotHeldByMockTest);
        }

        if self.contains(AddonId::Lesson1Hr) {
            log::info!("free {} lesson supersedes paid lesson", duration.phrase());
        }
        self.items.retain(|item| !item.id.occupies_slot());
        self.items
            .push(config.free_lesson_item(self.test_type, duration));
        self.upgrade_lineage = None;
        self.granted_for = Some(configuration_version);
        Transition::Applied
    }

    fn upgrade(&mut self, config: &PricingConfig) -> Transition {
        if self.upgraded {
            return Transition::NoOp(NoOpReason::AlreadyUpgraded);
        }
        let Some(free) = self.free_lesson() else {
            return Transition::NoOp(NoOpReason::NoFreeLesson);
        };
        let lineage = self
            .upgrade_lineage
            .clone()
            .unwrap_or_else(|| free.clone());
        let Some(duration) = lineage.lesson else {
            return Transition::NoOp(NoOpReason::NoFreeLesson);
        };

        self.items.retain(|item| !item.id.occupies_slot());
        self.items
            .push(config.upgraded_mock_test_item(self.test_type, duration));
        self.upgrade_lineage = Some(lineage);
        self.upgraded = true;
        Transition::Applied
    }

    fn downgrade(&mut self) -> Transition {
        if !self.upgraded {
            return Transition::NoOp(NoOpReason::NotUpgraded);
        }
        let Some(lineage) = self.upgrade_lineage.clone() else {
            return Transition::NoOp(NoOpReason::NoFreeLesson);
        };
        self.items.retain(|item| item.id != AddonId::MockTest);
        self.items.push(lineage);
        self.upgraded = false;
        Transition::Applied
    }
}

/// Pure form of [`SelectionState::apply`].
#[must_use]
pub fn apply_action_with(
    config: &PricingConfig,
    state: &SelectionState,
    action: &Action,
) -> (SelectionState, Transition) {
    let mut next = state.clone();
    let transition = next.apply(config, action);
    (next, transition)
}

/// Apply an action with the standard pricing table.
#[must_use]
pub fn apply_action(state: &SelectionState, action: &Action) -> SelectionState {
    apply_action_with(PricingConfig::standard(), state, action).0
}
