// SPDX-License-Identifier: MIT OR Apache-2.0
//! Static country registry.

use crate::graph::GraphError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric country identifier (ISO 3166-1 numeric)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryId(pub u16);

impl fmt::Display for CountryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

/// A country known to the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// Numeric identifier
    pub id: CountryId,
    /// ISO alpha-3 code
    pub code: String,
    /// Display name, also the name used by debt records
    pub name: String,
}

impl Country {
    /// Create a new country entry
    pub fn new(id: u16, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: CountryId(id),
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Registry of countries, kept in insertion order.
///
/// Insertion order is meaningful: it breaks ties when nodes are ranked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Country>", into = "Vec<Country>")]
pub struct CountryRegistry {
    countries: IndexMap<CountryId, Country>,
}

impl CountryRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            countries: IndexMap::new(),
        }
    }

    /// The ten reporting countries of the BIS consolidated banking data set
    pub fn bis_default() -> Self {
        let mut registry = Self::new();
        for country in [
            Country::new(250, "FRA", "France"),
            Country::new(276, "DEU", "Germany"),
            Country::new(300, "GRC", "Greece"),
            Country::new(372, "IRL", "Ireland"),
            Country::new(380, "ITA", "Italy"),
            Country::new(392, "JPN", "Japan"),
            Country::new(620, "PRT", "Portugal"),
            Country::new(826, "GBR", "Britain"),
            Country::new(724, "ESP", "Spain"),
            Country::new(840, "USA", "United States"),
        ] {
            registry.countries.insert(country.id, country);
        }
        registry
    }

    /// Register a country
    pub fn register(&mut self, country: Country) -> Result<(), GraphError> {
        if self.countries.contains_key(&country.id) || self.by_name(&country.name).is_some() {
            return Err(GraphError::DuplicateCountry(country.name));
        }
        self.countries.insert(country.id, country);
        Ok(())
    }

    /// Get a country by ID
    pub fn get(&self, id: CountryId) -> Option<&Country> {
        self.countries.get(&id)
    }

    /// Find a country by display name
    pub fn by_name(&self, name: &str) -> Option<&Country> {
        self.countries.values().find(|c| c.name == name)
    }

    /// Get all countries in insertion order
    pub fn countries(&self) -> impl Iterator<Item = &Country> {
        self.countries.values()
    }

    /// Position of a country in insertion order
    pub fn position(&self, id: CountryId) -> Option<usize> {
        self.countries.get_index_of(&id)
    }

    /// Number of registered countries
    pub fn len(&self) -> usize {
        self.countries.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

impl TryFrom<Vec<Country>> for CountryRegistry {
    type Error = GraphError;

    fn try_from(countries: Vec<Country>) -> Result<Self, Self::Error> {
        let mut registry = Self::new();
        for country in countries {
            registry.register(country)?;
        }
        Ok(registry)
    }
}

impl From<CountryRegistry> for Vec<Country> {
    fn from(registry: CountryRegistry) -> Self {
        registry.countries.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_order() {
        let registry = CountryRegistry::bis_default();
        assert_eq!(registry.len(), 10);
        let codes: Vec<_> = registry.countries().map(|c| c.code.as_str()).collect();
        assert_eq!(codes[0], "FRA");
        assert_eq!(codes[9], "USA");
        assert_eq!(registry.by_name("Britain").map(|c| c.id), Some(CountryId(826)));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = CountryRegistry::new();
        registry.register(Country::new(1, "AAA", "Alpha")).unwrap();
        assert!(matches!(
            registry.register(Country::new(1, "AAB", "Other")),
            Err(GraphError::DuplicateCountry(_))
        ));
        assert!(matches!(
            registry.register(Country::new(2, "AAB", "Alpha")),
            Err(GraphError::DuplicateCountry(_))
        ));
    }

    #[test]
    fn test_serialization() {
        let registry = CountryRegistry::bis_default();
        let ron_str = ron::ser::to_string_pretty(&registry, ron::ser::PrettyConfig::default()).unwrap();
        let loaded: CountryRegistry = ron::from_str(&ron_str).unwrap();
        assert_eq!(loaded, registry);
        assert_eq!(loaded.position(CountryId(840)), Some(9));
    }
}
