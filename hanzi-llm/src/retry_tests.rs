#[cfg(test)]
mod retry_tests {
    use crate::error::LLMError;
    use crate::retry::{retry_with_backoff, retry_with_sleep, RetryPolicy};
    use std::cell::RefCell;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_millis(100))
    }

    #[tokio::test]
    async fn test_succeeds_after_k_rate_limits() {
        let attempts = AtomicU32::new(0);
        let delays = RefCell::new(Vec::new());
        let k = 3;

        let result = retry_with_sleep(
            policy(5),
            || {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < k {
                        Err(LLMError::RateLimit)
                    } else {
                        Ok("done")
                    }
                }
            },
            |d| {
                delays.borrow_mut().push(d);
                async {}
            },
        )
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(attempts.load(Ordering::SeqCst), k + 1);
        assert_eq!(
            *delays.borrow(),
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
            ]
        );
    }

    #[tokio::test]
    async fn test_budget_exhausted_propagates_rate_limit() {
        let attempts = AtomicU32::new(0);
        let delays = RefCell::new(Vec::new());

        let result: Result<(), LLMError> = retry_with_sleep(
            policy(2),
            || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(LLMError::RateLimit) }
            },
            |d| {
                delays.borrow_mut().push(d);
                async {}
            },
        )
        .await;

        assert!(matches!(result, Err(LLMError::RateLimit)));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(delays.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_non_rate_limit_error_is_not_retried() {
        let attempts = AtomicU32::new(0);
        let delays = RefCell::new(Vec::new());

        let result: Result<(), LLMError> = retry_with_sleep(
            policy(5),
            || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(LLMError::InvalidResponse("HTTP 500".to_string())) }
            },
            |d| {
                delays.borrow_mut().push(d);
                async {}
            },
        )
        .await;

        match result {
            Err(LLMError::InvalidResponse(msg)) => assert_eq!(msg, "HTTP 500"),
            other => panic!("Expected InvalidResponse, got {:?}", other),
        }
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(delays.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_zero_retries_makes_single_attempt() {
        let attempts = AtomicU32::new(0);

        let result: Result<(), LLMError> = retry_with_backoff(
            RetryPolicy::new(0, Duration::from_millis(1)),
            || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(LLMError::RateLimit) }
            },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_real_sleep_backoff() {
        let attempts = AtomicU32::new(0);
        let started = std::time::Instant::now();

        let result = retry_with_backoff(RetryPolicy::new(2, Duration::from_millis(5)), || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(LLMError::RateLimit)
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        // 5ms + 10ms of backoff
        assert!(started.elapsed() >= Duration::from_millis(15));
    }

    #[test]
    fn test_first_success_never_sleeps() {
        let delays = RefCell::new(Vec::new());

        let result: Result<u32, LLMError> = tokio_test::block_on(retry_with_sleep(
            policy(3),
            || async { Ok(7) },
            |d| {
                delays.borrow_mut().push(d);
                async {}
            },
        ));

        assert_eq!(tokio_test::assert_ok!(result), 7);
        assert!(delays.borrow().is_empty());
    }

    #[test]
    fn test_policy_validation() {
        assert!(RetryPolicy::default().validate().is_ok());
        assert!(RetryPolicy::new(11, Duration::from_millis(1)).validate().is_err());
        assert!(RetryPolicy::new(1, Duration::from_secs(61)).validate().is_err());
    }
}
