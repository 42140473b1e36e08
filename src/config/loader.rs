//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading a tax year's
//! dataset from YAML files.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{EngineError, EngineResult};

use super::types::{
    ContributionsConfig, FederalConfig, JurisdictionMetadata, ProvincialConfig, TaxYearConfig,
};

/// Loads and provides access to a tax year's dataset.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/qc-2020/
/// ├── jurisdiction.yaml   # Year, jurisdiction and source metadata
/// ├── provincial.yaml     # Provincial brackets and credit rates
/// ├── federal.yaml        # Federal brackets, credits and abatement
/// └── contributions.yaml  # QPP, QPIP and EI rates and ceilings
/// ```
///
/// # Example
///
/// ```no_run
/// use withholding_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/qc-2020").unwrap();
/// println!("Loaded dataset: {}", loader.metadata().name);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: TaxYearConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Any required file is missing (`ConfigNotFound`)
    /// - Any file contains invalid YAML or is missing a field
    ///   (`ConfigParseError`)
    /// - A bracket table is malformed or any rate or ceiling is negative
    ///   (`InvalidConfig`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<JurisdictionMetadata>(&path.join("jurisdiction.yaml"))?;
        let provincial = Self::load_yaml::<ProvincialConfig>(&path.join("provincial.yaml"))?;
        let federal = Self::load_yaml::<FederalConfig>(&path.join("federal.yaml"))?;
        let contributions =
            Self::load_yaml::<ContributionsConfig>(&path.join("contributions.yaml"))?;

        let config = TaxYearConfig::new(metadata, provincial, federal, contributions)?;

        info!(
            path = %path.display(),
            tax_year = config.tax_year(),
            jurisdiction = %config.metadata().code,
            "Loaded tax year configuration"
        );

        Ok(Self { config })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: TaxYearConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying tax year configuration.
    pub fn config(&self) -> &TaxYearConfig {
        &self.config
    }

    /// Returns the dataset metadata.
    pub fn metadata(&self) -> &JurisdictionMetadata {
        self.config.metadata()
    }
}
