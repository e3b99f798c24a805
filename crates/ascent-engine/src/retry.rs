//! Bounded retry of conflicting transactions

use crate::{EngineError, EngineMetrics};
use ascent_domain::traits::StoreFailure;

/// Why one transaction attempt stopped
///
/// Store failures are classified after the fact; engine errors are final.
pub(crate) enum Failure<E> {
    Store(E),
    Engine(EngineError),
}

impl<E> From<EngineError> for Failure<E> {
    fn from(error: EngineError) -> Self {
        Failure::Engine(error)
    }
}

/// Run `attempt` until it succeeds, fails for good, or has conflicted
/// `max_retries + 1` times
///
/// Each attempt must open and commit its own transaction; an attempt that
/// returns early drops its transaction and so rolls it back.
pub(crate) fn with_retry<T, E, F>(
    operation: &'static str,
    max_retries: u32,
    metrics: &mut EngineMetrics,
    mut attempt: F,
) -> Result<T, EngineError>
where
    E: StoreFailure,
    F: FnMut() -> Result<T, Failure<E>>,
{
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        match attempt() {
            Ok(value) => return Ok(value),
            Err(Failure::Engine(error)) => return Err(error),
            Err(Failure::Store(error)) if error.is_conflict() => {
                if attempts > max_retries {
                    tracing::warn!(operation, attempts, %error, "giving up after repeated write conflicts");
                    return Err(EngineError::Conflict { attempts });
                }
                metrics.record_conflict_retry();
                tracing::debug!(operation, attempt = attempts, %error, "write conflict, retrying");
            }
            Err(Failure::Store(error)) => return Err(EngineError::Store(error.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct FakeError {
        conflict: bool,
    }

    impl fmt::Display for FakeError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "fake (conflict: {})", self.conflict)
        }
    }

    impl StoreFailure for FakeError {
        fn is_conflict(&self) -> bool {
            self.conflict
        }
    }

    #[test]
    fn test_retries_until_success() {
        let mut metrics = EngineMetrics::new();
        let mut calls = 0;
        let result = with_retry("test", 3, &mut metrics, || {
            calls += 1;
            if calls < 3 {
                Err(Failure::Store(FakeError { conflict: true }))
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result, Ok(3));
        assert_eq!(metrics.conflicts_retried, 2);
    }

    #[test]
    fn test_gives_up_after_budget() {
        let mut metrics = EngineMetrics::new();
        let result: Result<(), _> = with_retry("test", 2, &mut metrics, || {
            Err(Failure::Store(FakeError { conflict: true }))
        });
        assert_eq!(result, Err(EngineError::Conflict { attempts: 3 }));
        assert_eq!(metrics.conflicts_retried, 2);
    }

    #[test]
    fn test_other_failures_not_retried() {
        let mut metrics = EngineMetrics::new();
        let mut calls = 0;
        let result: Result<(), _> = with_retry("test", 5, &mut metrics, || {
            calls += 1;
            Err(Failure::Store(FakeError { conflict: false }))
        });
        assert!(matches!(result, Err(EngineError::Store(_))));
        assert_eq!(calls, 1);

        let result: Result<(), _> = with_retry::<_, FakeError, _>("test", 5, &mut metrics, || {
            Err(EngineError::AtTopRank.into())
        });
        assert_eq!(result, Err(EngineError::AtTopRank));
    }
}
