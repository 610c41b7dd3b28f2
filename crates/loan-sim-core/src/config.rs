use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LoanSimError;
use crate::limits::{RateLimitEntry, RateLimitTable};
use crate::simulation::{monthly_index_from_annual, ValidationPolicy};
use crate::types::Percent;
use crate::LoanSimResult;

/// Deployment settings for the simulator.
///
/// Every field has a default, so an empty document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Administrator overrides layered on the standard rate bands.
    pub rate_limit_overrides: Vec<RateLimitEntry>,
    /// False switches validation to free mode.
    pub enforce_rate_limits: bool,
    /// Yearly price index in percent; applied monthly as `annual / 12`.
    pub annual_index_pct: Percent,
    /// Pro-rata days used when a request does not specify any.
    pub default_extra_days: u32,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        SimulatorConfig {
            rate_limit_overrides: Vec::new(),
            enforce_rate_limits: true,
            annual_index_pct: Decimal::ZERO,
            default_extra_days: 0,
        }
    }
}

impl SimulatorConfig {
    /// Parse a JSON config document and check it.
    pub fn from_json(json: &str) -> LoanSimResult<Self> {
        let config: SimulatorConfig = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    /// Reject settings the engine cannot use.
    pub fn check(&self) -> LoanSimResult<()> {
        if self.annual_index_pct < Decimal::ZERO {
            return Err(LoanSimError::Configuration(
                "annual_index_pct cannot be negative".into(),
            ));
        }
        self.rate_limit_table().map(|_| ())
    }

    /// Standard bands with this deployment's overrides applied.
    pub fn rate_limit_table(&self) -> LoanSimResult<RateLimitTable> {
        RateLimitTable::standard()
            .with_overrides(&self.rate_limit_overrides)
            .map_err(|e| LoanSimError::Configuration(format!("rate_limit_overrides: {e}")))
    }

    pub fn policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            enforce_rate_limits: self.enforce_rate_limits,
        }
    }

    pub fn monthly_index_pct(&self) -> Percent {
        monthly_index_from_annual(self.annual_index_pct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::BandSource;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = SimulatorConfig::from_json("{}").unwrap();
        assert_eq!(config, SimulatorConfig::default());
        assert!(config.policy().enforce_rate_limits);
        assert_eq!(config.rate_limit_table().unwrap(), RateLimitTable::standard());
    }

    #[test]
    fn test_overrides_and_index_from_json() {
        let json = r#"{
            "rate_limit_overrides": [
                { "installment_count": 12, "min_rate_pct": "10", "max_rate_pct": "14" }
            ],
            "annual_index_pct": "4.8",
            "enforce_rate_limits": false
        }"#;
        let config = SimulatorConfig::from_json(json).unwrap();
        let table = config.rate_limit_table().unwrap();
        assert_eq!(table.band_for(12).unwrap().source, BandSource::Override);
        assert_eq!(config.monthly_index_pct(), dec!(0.4));
        assert!(!config.policy().enforce_rate_limits);
    }

    #[test]
    fn test_bad_override_is_configuration_error() {
        let json = r#"{
            "rate_limit_overrides": [
                { "installment_count": 2, "min_rate_pct": "30", "max_rate_pct": "20" }
            ]
        }"#;
        match SimulatorConfig::from_json(json) {
            Err(LoanSimError::Configuration(msg)) => assert!(msg.contains("rate_limit_overrides")),
            other => panic!("Expected Configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_index_rejected() {
        let json = r#"{ "annual_index_pct": "-1" }"#;
        assert!(SimulatorConfig::from_json(json).is_err());
    }
}
