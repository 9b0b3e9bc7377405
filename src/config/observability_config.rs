//! Observability configuration parsing from environment variables.

use std::env;

/// Observability environment configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservabilityEnvConfig {
    /// Register the metrics listener and print metrics after a run
    pub enabled: bool,
}

impl ObservabilityEnvConfig {
    pub fn from_env() -> Self {
        Self::from_value(env::var("OBSERVABILITY_ENABLED").ok())
    }

    fn from_value(raw: Option<String>) -> Self {
        Self {
            enabled: raw
                .map(|v| v.trim().to_lowercase())
                .map(|v| matches!(v.as_str(), "true" | "1" | "yes" | "on"))
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observability_config_defaults() {
        assert!(!ObservabilityEnvConfig::from_value(None).enabled);
        assert!(!ObservabilityEnvConfig::default().enabled);
    }

    #[test]
    fn test_observability_flag_values() {
        for raw in ["true", "1", " YES ", "on"] {
            assert!(ObservabilityEnvConfig::from_value(Some(raw.to_string())).enabled);
        }
        for raw in ["false", "0", "", "maybe"] {
            assert!(!ObservabilityEnvConfig::from_value(Some(raw.to_string())).enabled);
        }
    }
}
