pub mod catalog;

use crate::logic::QuotePlan;
use catalog::{catalog_descriptions, find_catalog_scenario};

/// Named booking plan run by the tester.
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: QuotePlan,
}

impl TestScenario {
    #[must_use]
    pub fn new(name: impl Into<String>, plan: QuotePlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    find_catalog_scenario(&name.trim().to_ascii_lowercase())
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    catalog_descriptions()
}
