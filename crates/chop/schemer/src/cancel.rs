//! Cancellation signal for schema operations

use tokio::sync::watch;

/// Receiving side, checked before every remote call
#[derive(Debug, Clone)]
pub struct Cancellation {
    rx: watch::Receiver<bool>,
}

/// Sending side, owned by whoever drives the reconciliation pass
#[derive(Debug)]
pub struct CancellationHandle {
    tx: watch::Sender<bool>,
}

/// Create a linked handle and signal
pub fn cancellation() -> (CancellationHandle, Cancellation) {
    let (tx, rx) = watch::channel(false);
    (CancellationHandle { tx }, Cancellation { rx })
}

impl Cancellation {
    /// A signal that is never raised
    pub fn never() -> Self {
        cancellation().1
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the signal is raised; pending forever if it never is
    pub async fn cancelled(&mut self) {
        if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

impl CancellationHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn signal(&self) -> Cancellation {
        Cancellation {
            rx: self.tx.subscribe(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cancel_is_visible_to_every_signal() {
        let (handle, signal) = cancellation();
        let other = handle.signal();
        assert!(!signal.is_cancelled());

        handle.cancel();
        assert!(signal.is_cancelled());
        assert!(other.is_cancelled());
    }

    #[test]
    fn test_never_stays_clear() {
        assert!(!Cancellation::never().is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_resolves() {
        let (handle, mut signal) = cancellation();
        let waiter = tokio::spawn(async move { signal.cancelled().await });
        handle.cancel();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }
}
