// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Cancellation signalling between the scheduler and running commands

use std::sync::Arc;
use tokio::sync::watch;

/// Sending half: flips every paired [`CancelSignal`] to cancelled
#[derive(Debug, Clone)]
pub struct Canceller {
    tx: Arc<watch::Sender<bool>>,
}

impl Canceller {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// A new receiving half
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: Some(self.tx.subscribe()),
        }
    }
}

impl Default for Canceller {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half handed to executors
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: Option<watch::Receiver<bool>>,
}

impl CancelSignal {
    /// A signal that never fires
    pub fn never() -> Self {
        Self { rx: None }
    }

    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolves once cancellation is requested; pends forever otherwise
    pub async fn cancelled(&mut self) {
        if let Some(rx) = self.rx.as_mut() {
            if rx.wait_for(|cancelled| *cancelled).await.is_ok() {
                return;
            }
        }
        std::future::pending::<()>().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancel_wakes_signal() {
        let canceller = Canceller::new();
        let mut signal = canceller.signal();
        assert!(!signal.is_cancelled());

        let waiter = tokio::spawn(async move {
            signal.cancelled().await;
        });

        canceller.cancel();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("signal should fire")
            .unwrap();
        assert!(canceller.is_cancelled());
    }

    #[tokio::test]
    async fn test_signal_created_after_cancel_is_cancelled() {
        let canceller = Canceller::new();
        canceller.cancel();
        let mut signal = canceller.signal();
        assert!(signal.is_cancelled());
        tokio::time::timeout(Duration::from_millis(100), signal.cancelled())
            .await
            .expect("already cancelled");
    }

    #[tokio::test]
    async fn test_never_signal_pends() {
        let mut signal = CancelSignal::never();
        assert!(!signal.is_cancelled());
        let res = tokio::time::timeout(Duration::from_millis(20), signal.cancelled()).await;
        assert!(res.is_err());
    }
}
