//! Session guards: double-submit protection and request timeouts.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use stockroom_core::{DomainError, DomainResult};

/// Re-entrancy guard around mutating store actions.
///
/// While a guard is alive the action is "in flight": a second `begin` is
/// rejected with a retriable conflict instead of firing a duplicate write
/// (e.g. a double-clicked commit allocating a second order). Renderers can
/// also read [`InFlight::is_busy`] to disable the triggering control.
#[derive(Debug, Default, Clone)]
pub struct InFlight {
    busy: Arc<AtomicBool>,
}

impl InFlight {
    pub fn begin(&self) -> DomainResult<InFlightGuard> {
        if self.busy.swap(true, Ordering::Acquire) {
            return Err(DomainError::conflict("another request is in flight"));
        }
        Ok(InFlightGuard {
            busy: Arc::clone(&self.busy),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the in-flight flag on drop, including when the action future is
/// cancelled mid-await.
#[derive(Debug)]
pub struct InFlightGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Bound a store-touching future, reporting elapse as a retriable error.
pub async fn with_timeout<T>(
    timeout: Duration,
    fut: impl Future<Output = DomainResult<T>>,
) -> DomainResult<T> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(DomainError::unavailable("store request timed out")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_rejected_while_in_flight() {
        let flight = InFlight::default();

        let guard = flight.begin().unwrap();
        assert!(flight.is_busy());

        let err = flight.begin().unwrap_err();
        assert!(err.is_retriable());

        drop(guard);
        assert!(!flight.is_busy());
        assert!(flight.begin().is_ok());
    }

    #[tokio::test]
    async fn timeout_maps_to_retriable_unavailable() {
        let err = with_timeout(Duration::from_millis(5), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await
        .unwrap_err();

        assert_eq!(
            err,
            DomainError::Unavailable("store request timed out".to_string())
        );
    }

    #[tokio::test]
    async fn fast_futures_pass_through() {
        let value = with_timeout(Duration::from_secs(1), async { Ok(42) })
            .await
            .unwrap();
        assert_eq!(value, 42);
    }
}
