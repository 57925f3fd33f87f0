use std::time::Duration;

use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub matching: MatchConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_name() -> String {
    "reconciliation".into()
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            matching: MatchConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Options that drive key derivation and pair classification.
///
/// Both sides of a run must be keyed with the same `MatchConfig`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchConfig {
    /// Width of a date bucket in seconds.
    pub date_window_seconds: u64,
    pub normalize_case: bool,
    pub collapse_whitespace: bool,
    pub strip_punctuation: bool,
    /// Wallet reference takes part in identity and details checks.
    pub compare_wallet_reference: bool,
    /// Transaction type takes part in identity.
    pub consider_transaction_type: bool,
    /// Composite keys require an amount.
    pub reject_null_amount: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            date_window_seconds: 300,
            normalize_case: true,
            collapse_whitespace: true,
            strip_punctuation: false,
            compare_wallet_reference: true,
            consider_transaction_type: true,
            reject_null_amount: false,
        }
    }
}

impl MatchConfig {
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            normalize_case: self.normalize_case,
            collapse_whitespace: self.collapse_whitespace,
            strip_punctuation: self.strip_punctuation,
        }
    }

    /// Bucket width, never below one second.
    pub fn window_seconds(&self) -> i64 {
        i64::try_from(self.date_window_seconds).unwrap_or(i64::MAX).max(1)
    }
}

/// The three independent text normalization switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalizeOptions {
    pub normalize_case: bool,
    pub collapse_whitespace: bool,
    pub strip_punctuation: bool,
}

// ---------------------------------------------------------------------------
// Retry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    pub enabled: bool,
    pub max_attempts: u32,
    pub initial_interval_ms: u64,
    pub multiplier: f64,
    pub max_interval_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            initial_interval_ms: 1000,
            multiplier: 2.0,
            max_interval_ms: 10_000,
        }
    }
}

impl RetryConfig {
    pub fn initial_interval(&self) -> Duration {
        Duration::from_millis(self.initial_interval_ms)
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.matching.date_window_seconds == 0 {
            return Err(ReconError::ConfigValidation(
                "matching.date_window_seconds must be greater than 0".into(),
            ));
        }

        let retry = &self.retry;
        if retry.max_attempts == 0 {
            return Err(ReconError::ConfigValidation(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        if !(retry.multiplier >= 1.0) {
            return Err(ReconError::ConfigValidation(format!(
                "retry.multiplier must be >= 1.0, got {}",
                retry.multiplier
            )));
        }
        if retry.max_interval_ms < retry.initial_interval_ms {
            return Err(ReconError::ConfigValidation(format!(
                "retry.max_interval_ms ({}) is below retry.initial_interval_ms ({})",
                retry.max_interval_ms, retry.initial_interval_ms
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
