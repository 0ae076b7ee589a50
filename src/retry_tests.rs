// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `retry.rs`

#[cfg(test)]
mod tests {
    use super::super::{
        is_retryable_error, poll_until, retry_api_call, retry_on_conflict, Backoff,
        BackoffPolicy, PollSettings, API_BACKOFF, CONFLICT_BACKOFF,
    };
    use crate::constants::MAX_CONFLICT_RETRIES;
    use crate::errors::EpicError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn api_error(code: u16, reason: &str) -> kube::Error {
        kube::Error::Api(
            kube::core::Status {
                status: Some(kube::core::response::StatusSummary::Failure),
                message: format!("{reason} for test"),
                reason: reason.to_string(),
                code,
                metadata: None,
                details: None,
            }
            .boxed(),
        )
    }

    fn conflict() -> EpicError {
        EpicError::Conflict {
            kind: "LoadBalancer".to_string(),
            name: "epic-acme/gatewayhttp-web".to_string(),
            attempts: 1,
        }
    }

    fn fast_poll() -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(5),
            timeout: Duration::from_millis(100),
        }
    }

    #[test]
    fn test_api_backoff_policy() {
        assert_eq!(API_BACKOFF.first, Duration::from_millis(100));
        assert_eq!(API_BACKOFF.cap, Duration::from_secs(30));
        assert_eq!(API_BACKOFF.give_up_after, Some(Duration::from_secs(300)));

        #[allow(clippy::float_cmp)]
        {
            assert_eq!(API_BACKOFF.factor, 2.0);
            assert_eq!(API_BACKOFF.jitter, 0.1);
        }
    }

    #[test]
    fn test_conflict_backoff_is_bounded_by_attempts_not_time() {
        assert_eq!(CONFLICT_BACKOFF.first, Duration::from_millis(50));
        assert_eq!(CONFLICT_BACKOFF.cap, Duration::from_secs(2));
        assert!(CONFLICT_BACKOFF.give_up_after.is_none());
    }

    /// Jitter keeps each delay within ±10% and growth stops at the cap
    #[test]
    fn test_backoff_growth_and_jitter() {
        let mut backoff = Backoff::new(CONFLICT_BACKOFF);
        let mut expected = 0.05_f64;
        for _ in 0..10 {
            let next = backoff
                .next_delay()
                .expect("unbounded backoff always yields")
                .as_secs_f64();
            assert!(
                next >= expected * 0.9 - 1e-9 && next <= expected * 1.1 + 1e-9,
                "delay {next} outside ±10% of {expected}"
            );
            expected = (expected * 2.0).min(2.0);
        }
        assert_eq!(backoff.upcoming(), Duration::from_secs(2));
    }

    #[test]
    fn test_backoff_without_jitter_is_exact() {
        let mut backoff = Backoff::new(BackoffPolicy {
            jitter: 0.0,
            ..CONFLICT_BACKOFF
        });
        let delays: Vec<Duration> = (0..4).filter_map(|_| backoff.next_delay()).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(50),
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
            ]
        );
    }

    #[test]
    fn test_backoff_gives_up_after_deadline() {
        let mut backoff = Backoff::new(BackoffPolicy {
            give_up_after: Some(Duration::ZERO),
            ..API_BACKOFF
        });
        assert_eq!(backoff.policy().give_up_after, Some(Duration::ZERO));
        assert!(backoff.next_delay().is_none());
    }

    #[test]
    fn test_retryable_status_codes() {
        assert!(is_retryable_error(&api_error(429, "TooManyRequests")));
        assert!(is_retryable_error(&api_error(500, "InternalError")));
        assert!(is_retryable_error(&api_error(503, "ServiceUnavailable")));
    }

    #[test]
    fn test_client_errors_not_retryable() {
        assert!(!is_retryable_error(&api_error(400, "BadRequest")));
        assert!(!is_retryable_error(&api_error(403, "Forbidden")));
        assert!(!is_retryable_error(&api_error(404, "NotFound")));
        assert!(!is_retryable_error(&api_error(409, "Conflict")));
        assert!(!is_retryable_error(&api_error(409, "AlreadyExists")));
    }

    #[tokio::test]
    async fn test_retry_api_call_recovers_from_transient_error() {
        let calls = AtomicU32::new(0);
        let result = retry_api_call(
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(api_error(503, "ServiceUnavailable"))
                    } else {
                        Ok("done")
                    }
                }
            },
            "get thing",
        )
        .await;

        assert_eq!(result.ok(), Some("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_api_call_does_not_retry_not_found() {
        let calls = AtomicU32::new(0);
        let result: Result<(), kube::Error> = retry_api_call(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(api_error(404, "NotFound")) }
            },
            "get thing",
        )
        .await;

        assert!(matches!(result, Err(kube::Error::Api(ref ae)) if ae.code == 404));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_on_conflict_succeeds_after_conflicts() {
        let calls = AtomicU32::new(0);
        let result = retry_on_conflict("add upstream", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(conflict())
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.ok(), Some(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_on_conflict_gives_up_with_attempt_count() {
        let calls = AtomicU32::new(0);
        let result: Result<(), EpicError> = retry_on_conflict("add upstream", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(conflict()) }
        })
        .await;

        match result {
            Err(EpicError::Conflict { attempts, name, .. }) => {
                assert_eq!(attempts, MAX_CONFLICT_RETRIES);
                assert_eq!(name, "epic-acme/gatewayhttp-web");
            }
            other => panic!("expected conflict, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), MAX_CONFLICT_RETRIES);
    }

    #[tokio::test]
    async fn test_retry_on_conflict_passes_other_errors_through() {
        let calls = AtomicU32::new(0);
        let result: Result<(), EpicError> = retry_on_conflict("add upstream", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(EpicError::NotFound {
                    kind: "LoadBalancer".to_string(),
                    name: "web".to_string(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(EpicError::NotFound { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_poll_until_returns_first_value() {
        let calls = AtomicU32::new(0);
        let result = poll_until("proxy address", fast_poll(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok((n >= 3).then_some("192.0.2.10")) }
        })
        .await;

        assert_eq!(result.ok(), Some("192.0.2.10"));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_poll_until_stops_on_read_error() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, EpicError> = poll_until("proxy address", fast_poll(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Ok(None)
                } else {
                    Err(EpicError::NotFound {
                        kind: "GWProxy".to_string(),
                        name: "epic-acme/blog".to_string(),
                    })
                }
            }
        })
        .await;

        assert!(matches!(result, Err(EpicError::NotFound { .. })), "{result:?}");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_poll_until_times_out() {
        let result: Result<(), EpicError> =
            poll_until("proxy address", fast_poll(), || async { Ok(None) }).await;

        match result {
            Err(EpicError::Timeout { what, waited }) => {
                assert_eq!(what, "proxy address");
                assert_eq!(waited, Duration::from_millis(100));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
