//! Application state for the withholding engine API.

use std::sync::Arc;

use crate::config::{ConfigLoader, TaxYearConfig};

/// Shared application state.
///
/// Holds the tax year dataset, loaded once at startup and read by every
/// request handler.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
}

impl AppState {
    /// Creates a new application state with the given configuration loader.
    pub fn new(config: ConfigLoader) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the loaded tax year dataset.
    pub fn tax_year_config(&self) -> &TaxYearConfig {
        self.config.config()
    }
}
