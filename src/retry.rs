// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Retry, conflict-retry and polling helpers.
//!
//! Three loops live here:
//!
//! - [`retry_api_call`] retries transient Kubernetes API errors (429, 5xx) with
//!   exponential backoff and fails fast on everything else.
//! - [`retry_on_conflict`] re-runs a read-modify-write when the store reports that the
//!   object changed underneath it, a bounded number of times.
//! - [`poll_until`] re-reads something at a fixed interval until a condition holds,
//!   giving up with [`EpicError::Timeout`] at a deadline.

use crate::constants::MAX_CONFLICT_RETRIES;
use crate::errors::{EpicError, Result};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Shape of an exponential backoff.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay before the first retry
    pub first: Duration,
    /// Delays never grow past this
    pub cap: Duration,
    /// Stop once this much time has passed since the backoff started
    pub give_up_after: Option<Duration>,
    /// Growth factor between delays
    pub factor: f64,
    /// Relative jitter; 0.1 spreads each delay over ±10%
    pub jitter: f64,
}

/// Transient API errors: 100ms doubling up to 30s, for at most 5 minutes.
pub const API_BACKOFF: BackoffPolicy = BackoffPolicy {
    first: Duration::from_millis(100),
    cap: Duration::from_secs(30),
    give_up_after: Some(Duration::from_secs(300)),
    factor: 2.0,
    jitter: 0.1,
};

/// Lost read-modify-writes: 50ms doubling up to 2s. The attempt count
/// ([`MAX_CONFLICT_RETRIES`]) bounds these, not time.
pub const CONFLICT_BACKOFF: BackoffPolicy = BackoffPolicy {
    first: Duration::from_millis(50),
    cap: Duration::from_secs(2),
    give_up_after: None,
    factor: 2.0,
    jitter: 0.1,
};

/// Delays handed out by a [`BackoffPolicy`], one per failed attempt.
#[derive(Debug)]
pub struct Backoff {
    policy: BackoffPolicy,
    upcoming: Duration,
    started: Instant,
}

impl Backoff {
    #[must_use]
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            policy,
            upcoming: policy.first,
            started: Instant::now(),
        }
    }

    #[must_use]
    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// The next delay before jitter.
    #[must_use]
    pub fn upcoming(&self) -> Duration {
        self.upcoming
    }

    /// The delay before the next attempt, or `None` once the policy gives up.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self
            .policy
            .give_up_after
            .is_some_and(|limit| self.started.elapsed() >= limit)
        {
            return None;
        }

        let base = self.upcoming;
        self.upcoming = base.mul_f64(self.policy.factor).min(self.policy.cap);
        Some(spread(base, self.policy.jitter))
    }
}

/// Move `delay` to a uniformly random point within `±jitter` of itself.
fn spread(delay: Duration, jitter: f64) -> Duration {
    if jitter <= 0.0 {
        return delay;
    }
    let offset = rand::random_range(-jitter..=jitter);
    delay.mul_f64((1.0 + offset).max(0.0))
}

/// Retry a Kubernetes API call while it fails with a transient error.
///
/// 429, 5xx and transport failures are retried following [`API_BACKOFF`]. Anything else
/// (not found, conflict, forbidden, invalid) goes straight back to the caller, as does
/// the last transient error once the backoff gives up.
///
/// # Errors
///
/// The first permanent error, or the last transient one.
pub async fn retry_api_call<T, F, Fut>(
    mut operation: F,
    operation_name: &str,
) -> std::result::Result<T, kube::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, kube::Error>>,
{
    let mut backoff = Backoff::new(API_BACKOFF);
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let err = match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(operation = operation_name, attempt = attempt, "API call recovered");
                }
                return Ok(value);
            }
            Err(err) if !is_retryable_error(&err) => return Err(err),
            Err(err) => err,
        };

        let Some(delay) = backoff.next_delay() else {
            error!(
                operation = operation_name,
                attempts = attempt,
                error = %err,
                "Transient API errors persisted, giving up"
            );
            return Err(err);
        };
        warn!(
            operation = operation_name,
            attempt = attempt,
            retry_after = ?delay,
            error = %err,
            "Transient API error, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}

/// Whether a Kubernetes error is worth retrying: throttling (429), server errors (5xx)
/// and transport failures.
pub(crate) fn is_retryable_error(err: &kube::Error) -> bool {
    match err {
        kube::Error::Api(status) => status.code == 429 || (500..600).contains(&status.code),
        kube::Error::Service(_) => true,
        _ => false,
    }
}

/// Run a read-modify-write until it stops hitting conflicts.
///
/// `operation` must re-read the object on every call, so each attempt applies its change
/// to the freshest version. Other errors are returned at once.
///
/// # Errors
///
/// Whatever `operation` fails with, or [`EpicError::Conflict`] carrying the attempt count
/// after [`MAX_CONFLICT_RETRIES`] conflicting attempts.
pub async fn retry_on_conflict<T, F, Fut>(operation_name: &str, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut backoff = Backoff::new(CONFLICT_BACKOFF);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match operation().await {
            Err(EpicError::Conflict { kind, name, .. }) => {
                if attempt >= MAX_CONFLICT_RETRIES {
                    error!(
                        operation = operation_name,
                        attempts = attempt,
                        "Still conflicting, giving up"
                    );
                    return Err(EpicError::Conflict {
                        kind,
                        name,
                        attempts: attempt,
                    });
                }
                let delay = backoff.next_delay().unwrap_or(CONFLICT_BACKOFF.cap);
                warn!(
                    operation = operation_name,
                    attempt = attempt,
                    retry_after = ?delay,
                    "Concurrent modification, re-reading and retrying"
                );
                tokio::time::sleep(delay).await;
            }
            other => return other,
        }
    }
}

/// Fixed-interval polling settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollSettings {
    /// Time between reads
    pub interval: Duration,
    /// Give up after this long
    pub timeout: Duration,
}

/// Call `probe` every `settings.interval` until it yields a value.
///
/// Only `Ok(None)` means "not yet". A probe error ends the wait at once: reads through
/// [`crate::kube_store::KubeStore`] have already retried transient failures, so whatever
/// reaches here (the object vanished, access denied) will not clear up by waiting.
///
/// # Errors
///
/// - The first probe error, unchanged
/// - [`EpicError::Timeout`] once `settings.timeout` has passed without a value
pub async fn poll_until<T, F, Fut>(what: &str, settings: PollSettings, mut probe: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let deadline = tokio::time::Instant::now() + settings.timeout;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match probe().await {
            Ok(Some(value)) => {
                debug!(what = what, attempt = attempt, "Poll condition met");
                return Ok(value);
            }
            Ok(None) => debug!(what = what, attempt = attempt, "Still waiting"),
            Err(e) => {
                warn!(what = what, attempt = attempt, error = %e, "Poll read failed");
                return Err(e);
            }
        }

        let now = tokio::time::Instant::now();
        if now >= deadline {
            return Err(EpicError::Timeout {
                what: what.to_string(),
                waited: settings.timeout,
            });
        }
        tokio::time::sleep(settings.interval.min(deadline - now)).await;
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod retry_tests;
