use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for
/// testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_decimal = |var: &str, default: &str| -> Result<Decimal, ConfigError> {
        let raw = or_default(var, default);
        Decimal::from_str(&raw).map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<bool>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let log_level = or_default("PRICEGRAB_LOG_LEVEL", "info");
    let rows_path = PathBuf::from(or_default("PRICEGRAB_ROWS_PATH", "./config/rows.yaml"));
    let output_path = PathBuf::from(or_default("PRICEGRAB_OUTPUT_PATH", "./results.json"));

    let thb_per_usd = parse_decimal("PRICEGRAB_THB_PER_USD", "33.5")?;
    if thb_per_usd <= Decimal::ZERO {
        return Err(ConfigError::InvalidEnvVar {
            var: "PRICEGRAB_THB_PER_USD".to_string(),
            reason: "exchange rate must be positive".to_string(),
        });
    }

    let request_timeout_secs = parse_u64("PRICEGRAB_REQUEST_TIMEOUT_SECS", "40")?;
    let max_attempts = parse_u32("PRICEGRAB_MAX_ATTEMPTS", "3")?;
    if max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "PRICEGRAB_MAX_ATTEMPTS".to_string(),
            reason: "at least one attempt is required".to_string(),
        });
    }
    let retry_backoff_base_secs = parse_u64("PRICEGRAB_RETRY_BACKOFF_BASE_SECS", "5")?;

    let delay_min = parse_u64("PRICEGRAB_DELAY_MIN_MS", "4000")?;
    let delay_max = parse_u64("PRICEGRAB_DELAY_MAX_MS", "8000")?;
    let cooldown_every_n_rows = parse_usize("PRICEGRAB_COOLDOWN_EVERY_N_ROWS", "5")?;
    let cooldown_min = parse_u64("PRICEGRAB_COOLDOWN_MIN_MS", "20000")?;
    let cooldown_max = parse_u64("PRICEGRAB_COOLDOWN_MAX_MS", "40000")?;
    let pacing_enabled = parse_bool("PRICEGRAB_PACING_ENABLED", "true")?;

    for (var, (lo, hi)) in [
        ("PRICEGRAB_DELAY_MIN_MS", (delay_min, delay_max)),
        ("PRICEGRAB_COOLDOWN_MIN_MS", (cooldown_min, cooldown_max)),
    ] {
        if lo > hi {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "lower delay bound exceeds upper bound".to_string(),
            });
        }
    }

    let plausible_min = parse_decimal("PRICEGRAB_PLAUSIBLE_MIN", "10")?;
    let plausible_max = parse_decimal("PRICEGRAB_PLAUSIBLE_MAX", "1000000")?;
    if plausible_min >= plausible_max {
        return Err(ConfigError::InvalidEnvVar {
            var: "PRICEGRAB_PLAUSIBLE_MIN".to_string(),
            reason: "plausibility window is empty".to_string(),
        });
    }

    Ok(AppConfig {
        log_level,
        rows_path,
        output_path,
        thb_per_usd,
        request_timeout_secs,
        max_attempts,
        retry_backoff_base_secs,
        delay_between_rows_ms: (delay_min, delay_max),
        cooldown_every_n_rows,
        cooldown_ms: (cooldown_min, cooldown_max),
        pacing_enabled,
        plausible_min,
        plausible_max,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn build_app_config_succeeds_with_empty_env() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.thb_per_usd, Decimal::from_str("33.5").unwrap());
        assert_eq!(cfg.request_timeout_secs, 40);
        assert_eq!(cfg.max_attempts, 3);
        assert_eq!(cfg.retry_backoff_base_secs, 5);
        assert_eq!(cfg.delay_between_rows_ms, (4000, 8000));
        assert_eq!(cfg.cooldown_every_n_rows, 5);
        assert_eq!(cfg.cooldown_ms, (20000, 40000));
        assert!(cfg.pacing_enabled);
        assert_eq!(cfg.plausible_min, Decimal::from(10));
        assert_eq!(cfg.plausible_max, Decimal::from(1_000_000));
    }

    #[test]
    fn build_app_config_overrides_exchange_rate() {
        let mut map = HashMap::new();
        map.insert("PRICEGRAB_THB_PER_USD", "36.25");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.thb_per_usd, Decimal::from_str("36.25").unwrap());
    }

    #[test]
    fn build_app_config_rejects_non_numeric_rate() {
        let mut map = HashMap::new();
        map.insert("PRICEGRAB_THB_PER_USD", "not-a-number");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRICEGRAB_THB_PER_USD"),
            "expected InvalidEnvVar(PRICEGRAB_THB_PER_USD), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_negative_rate() {
        let mut map = HashMap::new();
        map.insert("PRICEGRAB_THB_PER_USD", "-1");
        let result = build_app_config(lookup_from_map(&map));
        assert!(result.is_err());
    }

    #[test]
    fn build_app_config_rejects_zero_attempts() {
        let mut map = HashMap::new();
        map.insert("PRICEGRAB_MAX_ATTEMPTS", "0");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRICEGRAB_MAX_ATTEMPTS"),
            "expected InvalidEnvVar(PRICEGRAB_MAX_ATTEMPTS), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_inverted_delay_bounds() {
        let mut map = HashMap::new();
        map.insert("PRICEGRAB_DELAY_MIN_MS", "9000");
        map.insert("PRICEGRAB_DELAY_MAX_MS", "1000");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRICEGRAB_DELAY_MIN_MS"),
            "expected InvalidEnvVar(PRICEGRAB_DELAY_MIN_MS), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_empty_plausibility_window() {
        let mut map = HashMap::new();
        map.insert("PRICEGRAB_PLAUSIBLE_MIN", "500");
        map.insert("PRICEGRAB_PLAUSIBLE_MAX", "500");
        let result = build_app_config(lookup_from_map(&map));
        assert!(result.is_err());
    }

    #[test]
    fn build_app_config_can_disable_pacing() {
        let mut map = HashMap::new();
        map.insert("PRICEGRAB_PACING_ENABLED", "false");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(!cfg.pacing_enabled);
    }

    #[test]
    fn build_app_config_rejects_invalid_pacing_flag() {
        let mut map = HashMap::new();
        map.insert("PRICEGRAB_PACING_ENABLED", "yes");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRICEGRAB_PACING_ENABLED"),
            "expected InvalidEnvVar(PRICEGRAB_PACING_ENABLED), got: {result:?}"
        );
    }
}
