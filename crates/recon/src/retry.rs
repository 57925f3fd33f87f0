//! Retry with exponential backoff around a whole reconciliation run.
//!
//! Reconciliation is a pure function of its inputs, so a failed run can be
//! repeated from scratch. Only errors whose kind is retryable get another
//! attempt; everything else is returned as-is on the first failure.

use std::time::Duration;

use crate::config::RetryConfig;
use crate::error::ReconError;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub enabled: bool,
    pub max_attempts: u32,
    pub initial_interval: Duration,
    pub multiplier: f64,
    pub max_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            enabled: config.enabled,
            max_attempts: config.max_attempts,
            initial_interval: config.initial_interval(),
            multiplier: config.multiplier,
            max_interval: config.max_interval(),
        }
    }
}

impl RetryPolicy {
    /// A policy that runs the operation exactly once.
    pub fn disabled() -> Self {
        Self { enabled: false, ..Self::default() }
    }

    fn attempts(&self) -> u32 {
        if self.enabled {
            self.max_attempts.max(1)
        } else {
            1
        }
    }

    /// Sleep before each retry, in order. One entry fewer than the attempt count.
    pub fn backoff_delays(&self) -> Vec<Duration> {
        let max = self.max_interval.as_secs_f64();
        (1..self.attempts())
            .map(|n| {
                let exp = i32::try_from(n - 1).unwrap_or(i32::MAX);
                let secs = self.initial_interval.as_secs_f64() * self.multiplier.powi(exp);
                // f64::min drops a NaN operand, so a degenerate product lands on the cap.
                Duration::from_secs_f64(secs.min(max))
            })
            .collect()
    }

    /// Run `f`, retrying retryable failures with real sleeps.
    pub fn run<T, F>(&self, operation: &str, f: F) -> Result<T, ReconError>
    where
        F: FnMut() -> Result<T, ReconError>,
    {
        self.run_with_sleep(operation, f, std::thread::sleep)
    }

    /// Like [`run`](Self::run) with a caller-supplied sleep.
    pub fn run_with_sleep<T, F, S>(&self, operation: &str, mut f: F, mut sleep: S) -> Result<T, ReconError>
    where
        F: FnMut() -> Result<T, ReconError>,
        S: FnMut(Duration),
    {
        let attempts = self.attempts();
        let delays = self.backoff_delays();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let err = match f() {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !self.enabled || !err.kind().retryable() {
                return Err(err);
            }

            if attempt >= attempts {
                log::error!("'{operation}' failed after {attempt} attempt(s): {err}");
                return Err(ReconError::RetryExhausted {
                    operation: operation.to_string(),
                    attempts: attempt,
                    last_error: Box::new(err),
                });
            }

            let delay = delays[(attempt - 1) as usize];
            log::warn!("'{operation}' attempt {attempt}/{attempts} failed: {err}; retrying");
            log::debug!("sleeping {}ms before attempt {}", delay.as_millis(), attempt + 1);
            sleep(delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            enabled: true,
            max_attempts,
            initial_interval: Duration::from_millis(1000),
            multiplier: 2.0,
            max_interval: Duration::from_millis(10_000),
        }
    }

    #[test]
    fn default_schedule() {
        let p = RetryPolicy::default();
        assert_eq!(
            p.backoff_delays(),
            vec![Duration::from_millis(1000), Duration::from_millis(2000)]
        );
    }

    #[test]
    fn delays_are_capped() {
        let p = policy(6);
        let ms: Vec<u128> = p.backoff_delays().iter().map(Duration::as_millis).collect();
        assert_eq!(ms, vec![1000, 2000, 4000, 8000, 10_000]);
    }

    #[test]
    fn success_on_first_attempt_does_not_sleep() {
        let mut slept = Vec::new();
        let out = policy(3).run_with_sleep("op", || Ok::<_, ReconError>(7), |d| slept.push(d));
        assert_eq!(out.unwrap(), 7);
        assert!(slept.is_empty());
    }

    #[test]
    fn io_errors_are_retried_until_success() {
        let mut calls = 0;
        let mut slept = Vec::new();
        let out = policy(3).run_with_sleep(
            "op",
            || {
                calls += 1;
                if calls < 3 {
                    Err(ReconError::Io("disk busy".into()))
                } else {
                    Ok("done")
                }
            },
            |d| slept.push(d),
        );
        assert_eq!(out.unwrap(), "done");
        assert_eq!(calls, 3);
        assert_eq!(slept, vec![Duration::from_millis(1000), Duration::from_millis(2000)]);
    }

    #[test]
    fn exhaustion_wraps_last_error() {
        let mut calls = 0;
        let err = policy(3)
            .run_with_sleep(
                "reconcile",
                || -> Result<(), ReconError> {
                    calls += 1;
                    Err(ReconError::Io(format!("attempt {calls}")))
                },
                |_| {},
            )
            .unwrap_err();
        assert_eq!(calls, 3);
        assert_eq!(err.kind(), ErrorKind::RetryExhausted);
        match err {
            ReconError::RetryExhausted { operation, attempts, last_error } => {
                assert_eq!(operation, "reconcile");
                assert_eq!(attempts, 3);
                assert_eq!(last_error.to_string(), "IO error: attempt 3");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_retryable_errors_fail_fast() {
        let mut calls = 0;
        let err = policy(5)
            .run_with_sleep(
                "op",
                || -> Result<(), ReconError> {
                    calls += 1;
                    Err(ReconError::InvalidInput("file1 is required and must not be empty".into()))
                },
                |_| panic!("must not sleep"),
            )
            .unwrap_err();
        assert_eq!(calls, 1);
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn disabled_runs_once() {
        let mut calls = 0;
        let err = RetryPolicy::disabled()
            .run_with_sleep(
                "op",
                || -> Result<(), ReconError> {
                    calls += 1;
                    Err(ReconError::Io("boom".into()))
                },
                |_| {},
            )
            .unwrap_err();
        assert_eq!(calls, 1);
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(RetryPolicy::disabled().backoff_delays().is_empty());
    }

    #[test]
    fn from_config() {
        let config = RetryConfig {
            enabled: true,
            max_attempts: 4,
            initial_interval_ms: 250,
            multiplier: 3.0,
            max_interval_ms: 1000,
        };
        let p = RetryPolicy::from(&config);
        let ms: Vec<u128> = p.backoff_delays().iter().map(Duration::as_millis).collect();
        assert_eq!(ms, vec![250, 750, 1000]);
    }
}
