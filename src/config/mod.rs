//! Configuration loading and management for the withholding engine.
//!
//! This module loads one tax year's dataset (bracket tables, rates, ceilings
//! and basic amounts) from YAML files. Switching years means pointing the
//! loader at another directory.
//!
//! # Example
//!
//! ```no_run
//! use withholding_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/qc-2020").unwrap();
//! println!("Loaded tax year: {}", config.config().tax_year());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    ContributionCreditCeilings, ContributionPlanConfig, ContributionsConfig,
    EmploymentDeductionConfig, FederalConfig, JurisdictionMetadata, ProvincialConfig,
    ShareCreditGrouping, TaxYearConfig,
};
