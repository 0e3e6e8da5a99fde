use failsafe::backoff::{self, Exponential};
use failsafe::failure_policy::{self, ConsecutiveFailures};
use failsafe::{Config, StateMachine};
use std::time::Duration;

/// Circuit breaker guarding calls to the KYC backend.
pub type BackendCircuitBreaker = StateMachine<ConsecutiveFailures<Exponential>, ()>;

/// Creates a circuit breaker for KYC backend calls to prevent hammering a backend that is down.
///
/// # Configuration
///
/// - **Failure threshold**: 5 consecutive transport failures triggers OPEN state.
/// - **Backoff**: Exponential backoff from 10s to 60s before attempting recovery.
///
/// Only transport and server errors count as failures. A backend answering
/// "not verified" is a successful call.
///
/// # Returns
///
/// * `BackendCircuitBreaker` - The configured circuit breaker instance. Clones share state.
pub fn create_backend_circuit_breaker() -> BackendCircuitBreaker {
    let backoff_strategy = backoff::exponential(
        Duration::from_secs(10), // Initial delay
        Duration::from_secs(60), // Maximum delay
    );

    let failure_policy = failure_policy::consecutive_failures(5, backoff_strategy);

    Config::new().failure_policy(failure_policy).build()
}
