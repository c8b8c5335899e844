//! Exchange configuration.

use serde::{Deserialize, Serialize};

use crate::{CoaError, Result, constants};

/// Deployment-time settings for the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Number assigned to the first request.
    pub first_request_number: u64,
    /// Longest requested-amounts vector accepted by `new_request`.
    pub max_dimensions: usize,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            first_request_number: constants::DEFAULT_FIRST_REQUEST_NUMBER,
            max_dimensions: constants::DEFAULT_MAX_DIMENSIONS,
        }
    }
}

impl ExchangeConfig {
    /// Parse and validate a JSON document. Missing fields take defaults.
    ///
    /// # Errors
    /// Returns `Configuration` for malformed JSON or invalid values.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self =
            serde_json::from_str(s).map_err(|e| CoaError::Configuration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings the exchange cannot run with.
    ///
    /// # Errors
    /// Returns `Configuration` if either limit is zero.
    pub fn validate(&self) -> Result<()> {
        if self.first_request_number == 0 {
            return Err(CoaError::Configuration(
                "first_request_number must be > 0".into(),
            ));
        }
        if self.max_dimensions == 0 {
            return Err(CoaError::Configuration("max_dimensions must be > 0".into()));
        }
        Ok(())
    }
}
