use core_config::{env_parse, ConfigError, Environment, FromEnv};

/// Billable hours in a month, as used for monthly estimates
pub const DEFAULT_HOURS_PER_MONTH: f64 = 730.0;
pub const DEFAULT_RANK_LIMIT: usize = 10;
pub const DEFAULT_MAX_RANK_LIMIT: usize = 100;

/// Pricing service configuration
#[derive(Clone, Debug, PartialEq)]
pub struct PricingConfig {
    pub hours_per_month: f64,
    /// Ranking length when the caller does not ask for one
    pub default_rank_limit: usize,
    /// Upper bound on any requested ranking length
    pub max_rank_limit: usize,
    pub environment: Environment,
}

impl PricingConfig {
    /// Resolve a caller's ranking length against the configured bounds.
    /// A maximum of zero is treated as one.
    pub fn rank_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_rank_limit)
            .clamp(1, self.max_rank_limit.max(1))
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if !(self.hours_per_month.is_finite() && self.hours_per_month > 0.0) {
            return Err(ConfigError::InvalidValue {
                key: "PRICING_HOURS_PER_MONTH".to_string(),
                details: format!("{} must be a positive number", self.hours_per_month),
            });
        }
        if self.max_rank_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "PRICING_MAX_RANK_LIMIT".to_string(),
                details: "must be at least 1".to_string(),
            });
        }
        if self.default_rank_limit == 0 || self.default_rank_limit > self.max_rank_limit {
            return Err(ConfigError::InvalidValue {
                key: "PRICING_DEFAULT_RANK_LIMIT".to_string(),
                details: format!(
                    "{} must be between 1 and {}",
                    self.default_rank_limit, self.max_rank_limit
                ),
            });
        }
        Ok(self)
    }
}

impl FromEnv for PricingConfig {
    /// Reads from environment variables with defaults:
    /// - PRICING_HOURS_PER_MONTH: 730
    /// - PRICING_DEFAULT_RANK_LIMIT: 10
    /// - PRICING_MAX_RANK_LIMIT: 100
    /// - APP_ENV: development
    fn from_env() -> Result<Self, ConfigError> {
        Self {
            hours_per_month: env_parse("PRICING_HOURS_PER_MONTH", DEFAULT_HOURS_PER_MONTH)?,
            default_rank_limit: env_parse("PRICING_DEFAULT_RANK_LIMIT", DEFAULT_RANK_LIMIT)?,
            max_rank_limit: env_parse("PRICING_MAX_RANK_LIMIT", DEFAULT_MAX_RANK_LIMIT)?,
            environment: Environment::from_env(),
        }
        .validate()
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            hours_per_month: DEFAULT_HOURS_PER_MONTH,
            default_rank_limit: DEFAULT_RANK_LIMIT,
            max_rank_limit: DEFAULT_MAX_RANK_LIMIT,
            environment: Environment::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 4] = [
        "PRICING_HOURS_PER_MONTH",
        "PRICING_DEFAULT_RANK_LIMIT",
        "PRICING_MAX_RANK_LIMIT",
        "APP_ENV",
    ];

    #[test]
    fn test_from_env_with_defaults() {
        temp_env::with_vars(VARS.map(|k| (k, None::<&str>)), || {
            let config = PricingConfig::from_env().unwrap();
            assert_eq!(config, PricingConfig::default());
            assert_eq!(config.hours_per_month, 730.0);
        });
    }

    #[test]
    fn test_from_env_with_custom_values() {
        temp_env::with_vars(
            [
                ("PRICING_HOURS_PER_MONTH", Some("720")),
                ("PRICING_DEFAULT_RANK_LIMIT", Some("5")),
                ("PRICING_MAX_RANK_LIMIT", Some("20")),
                ("APP_ENV", Some("production")),
            ],
            || {
                let config = PricingConfig::from_env().unwrap();
                assert_eq!(config.hours_per_month, 720.0);
                assert_eq!(config.default_rank_limit, 5);
                assert_eq!(config.max_rank_limit, 20);
                assert!(config.environment.is_production());
            },
        );
    }

    #[test]
    fn test_unparsable_value_is_parse_error() {
        temp_env::with_vars(
            [
                ("PRICING_HOURS_PER_MONTH", Some("a month")),
                ("PRICING_DEFAULT_RANK_LIMIT", None),
                ("PRICING_MAX_RANK_LIMIT", None),
            ],
            || {
                let err = PricingConfig::from_env().unwrap_err();
                assert!(matches!(
                    err,
                    ConfigError::ParseError { ref key, .. } if key == "PRICING_HOURS_PER_MONTH"
                ));
            },
        );
    }

    #[test]
    fn test_non_positive_hours_rejected() {
        temp_env::with_vars(
            [
                ("PRICING_HOURS_PER_MONTH", Some("0")),
                ("PRICING_DEFAULT_RANK_LIMIT", None),
                ("PRICING_MAX_RANK_LIMIT", None),
            ],
            || {
                let err = PricingConfig::from_env().unwrap_err();
                assert!(matches!(err, ConfigError::InvalidValue { .. }));
            },
        );
    }

    #[test]
    fn test_default_above_max_rejected() {
        temp_env::with_vars(
            [
                ("PRICING_HOURS_PER_MONTH", None),
                ("PRICING_DEFAULT_RANK_LIMIT", Some("50")),
                ("PRICING_MAX_RANK_LIMIT", Some("20")),
            ],
            || {
                let err = PricingConfig::from_env().unwrap_err();
                assert!(matches!(
                    err,
                    ConfigError::InvalidValue { ref key, .. } if key == "PRICING_DEFAULT_RANK_LIMIT"
                ));
            },
        );
    }

    #[test]
    fn test_rank_limit_with_zero_maximum() {
        let config = PricingConfig {
            max_rank_limit: 0,
            ..PricingConfig::default()
        };
        assert_eq!(config.rank_limit(None), 1);
        assert_eq!(config.rank_limit(Some(50)), 1);
    }

    #[test]
    fn test_rank_limit_clamps() {
        let config = PricingConfig::default();
        assert_eq!(config.rank_limit(None), 10);
        assert_eq!(config.rank_limit(Some(0)), 1);
        assert_eq!(config.rank_limit(Some(500)), 100);
        assert_eq!(config.rank_limit(Some(25)), 25);
    }
}
