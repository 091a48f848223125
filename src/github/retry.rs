//! Exponential backoff for GraphQL page requests

use std::fmt::Display;
use std::time::Duration;
use tracing::warn;

/// Configuration for retrying a failed request.
///
/// The n-th retry (n starting at 1) sleeps `unit * base^n`; there is no jitter.
/// After `max_retries` retries the last error is returned.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt
    pub max_retries: u32,
    /// Base of the exponential backoff
    pub base: f64,
    /// Length of one backoff unit (one second in production)
    pub unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 4,
            base: 1.5,
            unit: Duration::from_secs(1),
        }
    }
}

/// The operation kept failing until the retry ceiling was hit
#[derive(Debug)]
pub struct Exhausted<E> {
    /// Total attempts made, including the first one
    pub attempts: u32,
    pub last_error: E,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base: f64) -> Self {
        Self {
            max_retries,
            base,
            ..Default::default()
        }
    }

    /// Override the backoff unit (tests use a zero unit)
    pub fn with_unit(mut self, unit: Duration) -> Self {
        self.unit = unit;
        self
    }

    /// Sleep before retry number `retry` (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self.base.powi(retry as i32);
        if !factor.is_finite() || factor < 0.0 {
            return self.unit;
        }
        self.unit.mul_f64(factor)
    }

    /// Run `op` until it succeeds or the retry ceiling is exceeded.
    pub fn run<T, E, F>(&self, label: &str, mut op: F) -> Result<T, Exhausted<E>>
    where
        E: Display,
        F: FnMut() -> Result<T, E>,
    {
        let mut retry = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) => {
                    retry += 1;
                    if retry > self.max_retries {
                        return Err(Exhausted {
                            attempts: retry,
                            last_error: e,
                        });
                    }
                    let delay = self.delay_for(retry);
                    warn!(
                        "{} failed (attempt {}/{}): {}. Retrying in {:.1}s",
                        label,
                        retry,
                        self.max_retries,
                        e,
                        delay.as_secs_f64()
                    );
                    std::thread::sleep(delay);
                }
            }
        }
    }
}
