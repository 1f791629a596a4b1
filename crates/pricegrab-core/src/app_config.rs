use std::path::PathBuf;

use rust_decimal::Decimal;

/// Static run configuration, loaded once before any row is processed.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    /// YAML file listing the product URL rows to process.
    pub rows_path: PathBuf,
    /// Where the JSON results file is written.
    pub output_path: PathBuf,
    /// Static THB-per-USD exchange rate used for display conversion and
    /// the THB reference value. Not a live rate.
    pub thb_per_usd: Decimal,
    pub request_timeout_secs: u64,
    /// Total fetch attempts per URL, including the first one.
    pub max_attempts: u32,
    /// Base backoff in seconds; the wait before retry n is
    /// `retry_backoff_base_secs * n` plus jitter.
    pub retry_backoff_base_secs: u64,
    /// Randomized inter-row delay bounds in milliseconds.
    pub delay_between_rows_ms: (u64, u64),
    /// Every Nth row takes the longer cooldown pause instead.
    pub cooldown_every_n_rows: usize,
    pub cooldown_ms: (u64, u64),
    /// Disable to make test runs instantaneous.
    pub pacing_enabled: bool,
    /// Price candidates at or below this value are discarded.
    pub plausible_min: Decimal,
    /// Price candidates at or above this value are discarded.
    pub plausible_max: Decimal,
}
