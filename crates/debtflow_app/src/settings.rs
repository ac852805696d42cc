// SPDX-License-Identifier: MIT OR Apache-2.0
//! Runner settings.
//!
//! Settings are stored as RON. Every field has a default, so a settings
//! file only needs the values it changes:
//!
//! ```ron
//! (
//!     data_path: "data/debt.csv",
//!     flow: (unit_size: 2.0, seed: Some(7)),
//! )
//! ```

use crate::error::AppError;
use crate::globe::Centroid;
use debtflow_graph::{Country, CountryId, CountryRegistry, GraphError};
use debtflow_sequencer::{FlowConfig, DEFAULT_TICK_INTERVAL_MS};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file looked up when none is given
pub const SETTINGS_FILE_NAME: &str = "debtflow.ron";

/// A country entry with its globe centroid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountrySettings {
    /// ISO 3166-1 numeric code
    pub id: u16,
    /// ISO alpha-3 code
    pub code: String,
    /// Name used by the debt data
    pub name: String,
    /// Globe centroid as (longitude, latitude)
    #[serde(default)]
    pub centroid: Option<(f64, f64)>,
}

impl CountrySettings {
    fn new(id: u16, code: &str, name: &str, centroid: (f64, f64)) -> Self {
        Self {
            id,
            code: code.to_string(),
            name: name.to_string(),
            centroid: Some(centroid),
        }
    }
}

/// Everything a run needs besides the debt data itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Format version
    pub version: u32,
    /// Debt data CSV
    pub data_path: PathBuf,
    /// Countries in tie-break order
    pub countries: Vec<CountrySettings>,
    /// Engine options
    pub flow: FlowConfig,
    /// Fixed frame step
    pub tick_interval_ms: f64,
    /// Frames after which an unsettled run is abandoned
    pub max_ticks: usize,
    /// Viewport width in points
    pub viewport_width: f32,
    /// Where to write the JSON summary, if anywhere
    pub summary_path: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            data_path: PathBuf::from("data/debt.csv"),
            countries: vec![
                CountrySettings::new(250, "FRA", "France", (2.4, 46.6)),
                CountrySettings::new(276, "DEU", "Germany", (10.4, 51.1)),
                CountrySettings::new(300, "GRC", "Greece", (22.6, 39.3)),
                CountrySettings::new(372, "IRL", "Ireland", (-8.1, 53.2)),
                CountrySettings::new(380, "ITA", "Italy", (12.1, 42.8)),
                CountrySettings::new(392, "JPN", "Japan", (138.0, 37.6)),
                CountrySettings::new(620, "PRT", "Portugal", (-8.0, 39.6)),
                CountrySettings::new(826, "GBR", "Britain", (-2.6, 54.0)),
                CountrySettings::new(724, "ESP", "Spain", (-3.6, 40.3)),
                CountrySettings::new(840, "USA", "United States", (-98.6, 39.8)),
            ],
            flow: FlowConfig::default(),
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            max_ticks: 100_000,
            viewport_width: 960.0,
            summary_path: None,
        }
    }
}

impl AppSettings {
    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)?;
        let settings: AppSettings = ron::from_str(&content).map_err(|source| AppError::Settings {
            path: path.to_path_buf(),
            source,
        })?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(AppError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "Settings version {} is newer than supported version {}",
                    settings.version, SETTINGS_FORMAT_VERSION
                ),
            )));
        }

        tracing::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings if the file exists, otherwise use defaults
    pub fn load_or_default(path: &Path) -> Result<Self, AppError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No settings at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(false)
            .enumerate_arrays(false);

        let content = ron::ser::to_string_pretty(self, config)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Build the country registry
    pub fn registry(&self) -> Result<CountryRegistry, GraphError> {
        let mut registry = CountryRegistry::new();
        for country in &self.countries {
            registry.register(Country::new(country.id, country.code.as_str(), country.name.as_str()))?;
        }
        Ok(registry)
    }

    /// Globe centroids of the countries that have one
    pub fn centroids(&self) -> IndexMap<CountryId, Centroid> {
        self.countries
            .iter()
            .filter_map(|c| c.centroid.map(|(lon, lat)| (CountryId(c.id), Centroid::new(lon, lat))))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("debtflow-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.version, SETTINGS_FORMAT_VERSION);
        assert_eq!(settings.countries.len(), 10);
        assert_eq!(settings.registry().unwrap(), CountryRegistry::bis_default());
        assert_eq!(settings.centroids().len(), 10);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: AppSettings =
            ron::from_str("(data_path: \"other.csv\", flow: (unit_size: 2.0, seed: Some(7)))").unwrap();
        assert_eq!(settings.data_path, PathBuf::from("other.csv"));
        assert_eq!(settings.flow.unit_size, 2.0);
        assert_eq!(settings.flow.seed, Some(7));
        assert_eq!(settings.flow.release_batch_size, 2);
        assert_eq!(settings.countries.len(), 10);
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("settings.ron");
        let mut settings = AppSettings::default();
        settings.max_ticks = 42;
        settings.summary_path = Some(PathBuf::from("out.json"));
        settings.save(&path).unwrap();

        let loaded = AppSettings::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_newer_version_rejected() {
        let path = temp_path("future.ron");
        std::fs::write(&path, "(version: 99)").unwrap();
        let result = AppSettings::load(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(AppError::Io(_))));
    }

    #[test]
    fn test_duplicate_country_rejected() {
        let mut settings = AppSettings::default();
        settings.countries.push(settings.countries[0].clone());
        assert!(matches!(settings.registry(), Err(GraphError::DuplicateCountry(_))));
    }

    #[test]
    fn test_bundled_settings_load() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../debtflow.ron");
        let settings = AppSettings::load(&path).unwrap();
        assert_eq!(settings.flow.seed, Some(2011));
        assert!(settings.flow.validate().is_ok());
        assert_eq!(settings.countries.len(), 10);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let settings = AppSettings::load_or_default(&temp_path("missing.ron")).unwrap();
        assert_eq!(settings, AppSettings::default());
    }
}
