//! Backoff strategies for retry loops
//!
//! The default strategy is [`BackoffStrategy::None`]: retries fire
//! immediately. Failures that are retried here are expected to be fast
//! transport unavailability rather than remote overload, but callers may opt
//! into a delay without changing the shape of the retry contract.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when validating a backoff configuration
#[derive(Debug, Error, PartialEq)]
pub enum BackoffError {
    /// Exponential base must be a finite number >= 1.0
    #[error("exponential base must be finite and >= 1.0, got {0}")]
    InvalidBase(f64),

    /// `max_delay_ms` is smaller than `initial_delay_ms`
    #[error("max delay {max_ms}ms is below initial delay {initial_ms}ms")]
    MaxBelowInitial { initial_ms: u64, max_ms: u64 },
}

/// Backoff strategy for calculating the delay before a retry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum BackoffStrategy {
    /// Retry immediately
    #[default]
    None,
    /// Fixed delay between retries
    Fixed { delay_ms: u64 },
    /// Linear backoff: `initial_delay + (retry - 1) * increment`
    Linear { initial_delay_ms: u64, increment_ms: u64 },
    /// Exponential backoff: `initial_delay * base^(retry - 1)`, capped
    Exponential { initial_delay_ms: u64, base: f64, max_delay_ms: u64 },
}

impl BackoffStrategy {
    /// Delay to wait before retry number `retry` (1-based: the delay after
    /// the first failed attempt is `delay_for(1)`).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let step = retry.saturating_sub(1);
        match self {
            Self::None => Duration::ZERO,
            Self::Fixed { delay_ms } => Duration::from_millis(*delay_ms),
            Self::Linear { initial_delay_ms, increment_ms } => Duration::from_millis(
                initial_delay_ms.saturating_add(increment_ms.saturating_mul(u64::from(step))),
            ),
            Self::Exponential { initial_delay_ms, base, max_delay_ms } => {
                let exponent = i32::try_from(step).unwrap_or(i32::MAX);
                let delay = *initial_delay_ms as f64 * base.powi(exponent);
                let capped = delay.min(*max_delay_ms as f64);
                Duration::from_millis(capped as u64)
            }
        }
    }

    /// Check the strategy parameters.
    pub fn validate(&self) -> Result<(), BackoffError> {
        if let Self::Exponential { initial_delay_ms, base, max_delay_ms } = self {
            if !base.is_finite() || *base < 1.0 {
                return Err(BackoffError::InvalidBase(*base));
            }
            if max_delay_ms < initial_delay_ms {
                return Err(BackoffError::MaxBelowInitial {
                    initial_ms: *initial_delay_ms,
                    max_ms: *max_delay_ms,
                });
            }
        }
        Ok(())
    }
}
