//! Retry-until-condition loop with bounded timeout
//!
//! The single polling primitive used by every DR action: probe fresh state,
//! fail fast on probe errors, give up with a distinguishable deadline error
//! once the timeout elapses.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// Outcome of a wait that did not reach the condition
#[derive(Debug)]
pub enum WaitError<E> {
    /// The condition was not reached before the deadline. Distinct from a
    /// probe failure so callers can log "not ready yet" versus "broken".
    Timeout { waited: Duration },

    /// The probe itself failed. Never retried: a fetch error is not
    /// "not yet ready".
    Probe(E),
}

impl<E: fmt::Display> fmt::Display for WaitError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitError::Timeout { waited } => {
                write!(f, "condition not reached after {:?}", waited)
            }
            WaitError::Probe(e) => write!(f, "probe failed: {}", e),
        }
    }
}

impl<E: fmt::Display + fmt::Debug> std::error::Error for WaitError<E> {}

/// Poll `probe` every `interval` until it reports done or `timeout` elapses.
///
/// The probe is re-invoked with no cached state; each call is expected to
/// fetch fresh resource state. The loop is single-threaded per call and holds
/// no shared state, so concurrent waits for different workloads are
/// independent.
pub async fn wait_until<F, Fut, E>(
    timeout: Duration,
    interval: Duration,
    mut probe: F,
) -> Result<(), WaitError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let start = Instant::now();

    loop {
        if probe().await.map_err(WaitError::Probe)? {
            return Ok(());
        }

        let waited = start.elapsed();
        if waited >= timeout {
            return Err(WaitError::Timeout { waited });
        }

        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    struct FetchFailed;

    impl fmt::Display for FetchFailed {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "fetch failed")
        }
    }

    #[tokio::test]
    async fn test_done_on_first_probe() {
        let result = wait_until(
            Duration::from_secs(1),
            Duration::from_millis(10),
            || async { Ok::<bool, FetchFailed>(true) },
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_done_after_retries() {
        let calls = AtomicU32::new(0);
        let result = wait_until(Duration::from_secs(1), Duration::from_millis(10), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<bool, FetchFailed>(n >= 2) }
        })
        .await;
        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_timeout_respected() {
        let timeout = Duration::from_millis(120);
        let interval = Duration::from_millis(40);

        let start = std::time::Instant::now();
        let result = wait_until(timeout, interval, || async {
            Ok::<bool, FetchFailed>(false)
        })
        .await;
        let elapsed = start.elapsed();

        match result {
            Err(WaitError::Timeout { waited }) => assert!(waited >= timeout),
            other => panic!("expected timeout, got {:?}", other),
        }
        // never earlier than the deadline, never unbounded
        assert!(elapsed >= timeout);
        assert!(elapsed < timeout * 4);
    }

    #[tokio::test]
    async fn test_probe_error_fails_fast() {
        let start = std::time::Instant::now();
        let result = wait_until(
            Duration::from_secs(10),
            Duration::from_secs(10),
            || async { Err::<bool, FetchFailed>(FetchFailed) },
        )
        .await;

        match result {
            Err(WaitError::Probe(FetchFailed)) => {}
            other => panic!("expected probe error, got {:?}", other),
        }
        // returned without sleeping through the ten second interval
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_zero_timeout_probes_once() {
        let calls = AtomicU32::new(0);
        let result = wait_until(Duration::ZERO, Duration::from_millis(10), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<bool, FetchFailed>(false) }
        })
        .await;

        assert!(matches!(result, Err(WaitError::Timeout { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
