//! # Circuit Breaker Module
//!
//! This module implements the circuit breaker pattern for the hosted
//! text-generation endpoint. When inference calls fail repeatedly, the breaker
//! opens so that every chat turn stops paying the endpoint's timeout.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::config::BreakerConfig;

#[derive(Debug, Default)]
struct BreakerState {
    failure_count: u32,
    last_failure_time: Option<Instant>,
    trial_in_flight: bool,
}

/// Circuit breaker for inference calls
///
/// # State Machine
///
/// - **Closed**: Normal operation, requests pass through
/// - **Open**: Failure threshold exceeded, requests fail fast
/// - **Half-Open**: Reset timeout elapsed, exactly one trial request is let
///   through; other callers keep failing fast until it is recorded
///
/// # Configuration
///
/// Uses `BreakerConfig` for:
/// - `threshold`: Consecutive failures before opening (default: 5)
/// - `reset_secs`: Time before a trial request is allowed (default: 60s)
#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    config: BreakerConfig,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with the given configuration
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pharmacare::config::BreakerConfig;
    /// use pharmacare::circuit_breaker::CircuitBreaker;
    ///
    /// let breaker = CircuitBreaker::new(BreakerConfig::default());
    /// assert!(!breaker.is_open());
    /// ```
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            state: Mutex::new(BreakerState::default()),
            config,
        }
    }

    /// Check if the circuit is open (blocking requests)
    ///
    /// Returns `true` when the failure count reached the threshold and the reset
    /// timeout hasn't elapsed. Once it has, the first caller is admitted as the
    /// trial request and every later caller is blocked until that trial is
    /// recorded. A failed trial re-opens the circuit for another full window.
    pub fn is_open(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if state.failure_count < self.config.threshold {
            return false;
        }
        if state.trial_in_flight {
            return true;
        }
        if let Some(last_time) = state.last_failure_time {
            if last_time.elapsed() < Duration::from_secs(self.config.reset_secs) {
                return true;
            }
        }

        // Half-open: this caller carries the trial request
        state.trial_in_flight = true;
        false
    }

    /// Record a failed call
    pub fn record_failure(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.failure_count += 1;
        state.last_failure_time = Some(Instant::now());
        state.trial_in_flight = false;
    }

    /// Record a successful call, closing the circuit
    pub fn record_success(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = BreakerState::default();
    }

    pub fn failure_count(&self) -> u32 {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).failure_count
    }
}
