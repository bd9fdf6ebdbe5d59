use std::env;

/// Default bounds of the image-path placeholder price.
pub const DEFAULT_PLACEHOLDER_PRICE_RANGE: (f64, f64) = (1800.0, 2100.0);

/// Synthetic price configuration for chart-image signals.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderPriceConfig {
    /// Lower bound (inclusive) of the sampled base price.
    pub min: f64,
    /// Upper bound (exclusive) of the sampled base price.
    pub max: f64,
    /// Fixed RNG seed; unset means seeded from OS entropy.
    pub seed: Option<u64>,
}

impl Default for PlaceholderPriceConfig {
    fn default() -> Self {
        Self {
            min: DEFAULT_PLACEHOLDER_PRICE_RANGE.0,
            max: DEFAULT_PLACEHOLDER_PRICE_RANGE.1,
            seed: None,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,
    /// Origins allowed by CORS. Empty allows any origin.
    pub cors_allowed_origins: Vec<String>,
    /// Image-path price synthesis.
    pub placeholder_price: PlaceholderPriceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: 10 * 1024 * 1024,
            cors_allowed_origins: Vec::new(),
            placeholder_price: PlaceholderPriceConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<f64>().ok());

        let max_upload_bytes = lookup("MAX_UPLOAD_MB")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|mb| *mb > 0)
            .and_then(|mb| mb.checked_mul(1024 * 1024))
            .unwrap_or(defaults.max_upload_bytes);

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        // A reversed or empty range would make sampling panic; use the default instead
        let (min, max) = match (
            parsed("PLACEHOLDER_PRICE_MIN").unwrap_or(DEFAULT_PLACEHOLDER_PRICE_RANGE.0),
            parsed("PLACEHOLDER_PRICE_MAX").unwrap_or(DEFAULT_PLACEHOLDER_PRICE_RANGE.1),
        ) {
            (min, max) if min.is_finite() && max.is_finite() && min > 0.0 && min < max => {
                (min, max)
            }
            _ => DEFAULT_PLACEHOLDER_PRICE_RANGE,
        };

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(defaults.port),
            max_upload_bytes,
            cors_allowed_origins,
            placeholder_price: PlaceholderPriceConfig {
                min,
                max,
                seed: lookup("PLACEHOLDER_PRICE_SEED").and_then(|v| v.trim().parse().ok()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert!(config.cors_allowed_origins.is_empty());
        assert_eq!(config.placeholder_price, PlaceholderPriceConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9001"),
            ("MAX_UPLOAD_MB", "2"),
            ("CORS_ALLOWED_ORIGINS", "http://localhost:3000, https://example.com"),
            ("PLACEHOLDER_PRICE_MIN", "100"),
            ("PLACEHOLDER_PRICE_MAX", "200"),
            ("PLACEHOLDER_PRICE_SEED", "42"),
        ]);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9001);
        assert_eq!(config.max_upload_bytes, 2 * 1024 * 1024);
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://localhost:3000", "https://example.com"]
        );
        assert_eq!(config.placeholder_price.min, 100.0);
        assert_eq!(config.placeholder_price.max, 200.0);
        assert_eq!(config.placeholder_price.seed, Some(42));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("PORT", "not-a-port"),
            ("MAX_UPLOAD_MB", "0"),
            ("PLACEHOLDER_PRICE_MIN", "500"),
            ("PLACEHOLDER_PRICE_MAX", "100"),
        ]);
        assert_eq!(config.port, 8000);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.placeholder_price.min, 1800.0);
        assert_eq!(config.placeholder_price.max, 2100.0);
    }

    #[test]
    fn test_oversized_upload_limit_falls_back() {
        let huge = usize::MAX.to_string();
        let config = config_from(&[("MAX_UPLOAD_MB", huge.as_str())]);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
    }
}
