//! Directory of drive-test centres and their base fees.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{LoadError, QuoteError};

const BUILTIN_CENTRES: &str = include_str!("../data/centres.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCentre {
    pub id: String,
    pub name: String,
    pub address: String,
    pub base_price_cents: i64,
    pub region: String,
}

/// Ordered list of bookable centres.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CentreDirectory {
    centres: Vec<TestCentre>,
}

impl CentreDirectory {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            centres: Vec::new(),
        }
    }

    /// Parse a directory from a JSON array of centres.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed JSON, duplicate ids, or negative fees.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let centres: Vec<TestCentre> = serde_json::from_str(json)?;
        Self::from_centres(centres)
    }

    /// Build a directory from already-parsed centres.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Directory`] for duplicate ids or negative fees.
    pub fn from_centres(centres: Vec<TestCentre>) -> Result<Self, LoadError> {
        let mut seen = HashSet::new();
        for centre in &centres {
            if !seen.insert(centre.id.as_str()) {
                return Err(LoadError::Directory(format!(
                    "duplicate centre id '{}'",
                    centre.id
                )));
            }
            if centre.base_price_cents < 0 {
                return Err(LoadError::Directory(format!(
                    "centre '{}' has negative base price {}",
                    centre.id, centre.base_price_cents
                )));
            }
        }
        Ok(Self { centres })
    }

    /// Ontario directory bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled data fails validation.
    pub fn builtin() -> Result<Self, LoadError> {
        Self::from_json(BUILTIN_CENTRES)
    }

    /// Look up a centre by id.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::UnknownCatalogEntry`] when no centre has this id.
    pub fn find(&self, id: &str) -> Result<&TestCentre, QuoteError> {
        self.centres
            .iter()
            .find(|centre| centre.id == id)
            .ok_or_else(|| QuoteError::unknown("test centre", id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TestCentre> {
        self.centres.iter()
    }

    pub fn in_region<'a>(&'a self, region: &'a str) -> impl Iterator<Item = &'a TestCentre> {
        self.centres
            .iter()
            .filter(move |centre| centre.region.eq_ignore_ascii_case(region))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.centres.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.centres.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_directory_loads() {
        let directory = CentreDirectory::builtin().unwrap();
        assert!(directory.len() >= 5);
        let downsview = directory.find("toronto-downsview").unwrap();
        assert_eq!(downsview.base_price_cents, 8_000);
        assert_eq!(directory.in_region("toronto").count(), 3);
    }

    #[test]
    fn unknown_centre_is_an_error() {
        let directory = CentreDirectory::builtin().unwrap();
        assert_eq!(
            directory.find("atlantis"),
            Err(QuoteError::UnknownCatalogEntry {
                kind: "test centre",
                value: "atlantis".to_string()
            })
        );
    }

    #[test]
    fn rejects_duplicates_and_negative_fees() {
        let dup = r#"[
            {"id":"a","name":"A","address":"1 Main","base_price_cents":100,"region":"R"},
            {"id":"a","name":"B","address":"2 Main","base_price_cents":100,"region":"R"}
        ]"#;
        assert!(matches!(
            CentreDirectory::from_json(dup),
            Err(LoadError::Directory(msg)) if msg.contains("duplicate")
        ));

        let negative =
            r#"[{"id":"a","name":"A","address":"1 Main","base_price_cents":-1,"region":"R"}]"#;
        assert!(CentreDirectory::from_json(negative).is_err());
        assert!(CentreDirectory::from_json("[]").unwrap().is_empty());
    }
}
