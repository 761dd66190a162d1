// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Graceful shutdown coordination.
//!
//! OS signals (SIGTERM, SIGINT) or a manual trigger flip a shared flag;
//! the HTTP server stops accepting and drains in-flight requests.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

// =============================================================================
// ShutdownCoordinator
// =============================================================================

/// Coordinates graceful shutdown across the service.
///
/// ```ignore
/// let coordinator = ShutdownCoordinator::new();
/// let signal = coordinator.shutdown_signal();
///
/// tokio::spawn(server.run_with_shutdown(signal));
/// coordinator.wait_for_shutdown().await;
/// ```
#[derive(Clone)]
pub struct ShutdownCoordinator {
    sender: Arc<watch::Sender<bool>>,
}

impl ShutdownCoordinator {
    /// Creates a new shutdown coordinator.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Returns a future that resolves once shutdown has been initiated.
    ///
    /// Resolves immediately if shutdown already happened.
    pub fn shutdown_signal(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut receiver = self.sender.subscribe();
        async move {
            // An error means every sender is gone, which is shutdown too.
            let _ = receiver.wait_for(|initiated| *initiated).await;
        }
    }

    /// Initiates shutdown. Idempotent.
    pub fn initiate_shutdown(&self) {
        let changed = self.sender.send_if_modified(|initiated| {
            if *initiated {
                false
            } else {
                *initiated = true;
                true
            }
        });
        if changed {
            info!("Shutdown initiated");
        }
    }

    /// Returns true if shutdown has been initiated.
    pub fn is_shutdown_initiated(&self) -> bool {
        *self.sender.borrow()
    }

    /// Waits for an OS signal or a manual trigger, then initiates shutdown.
    pub async fn wait_for_shutdown(&self) {
        let manual = self.shutdown_signal();
        tokio::select! {
            _ = os_signal() => {}
            _ = manual => {}
        }
        self.initiate_shutdown();
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ShutdownCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownCoordinator")
            .field("initiated", &self.is_shutdown_initiated())
            .finish()
    }
}

// =============================================================================
// OS Signals
// =============================================================================

#[cfg(unix)]
async fn os_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(term), Ok(int)) => (term, int),
        (Err(e), _) | (_, Err(e)) => {
            warn!("Failed to register signal handlers: {}; falling back to Ctrl+C", e);
            ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM"),
        _ = sigint.recv() => info!("Received SIGINT"),
    }
}

#[cfg(not(unix))]
async fn os_signal() {
    ctrl_c().await;
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C"),
        Err(e) => {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_shutdown_coordinator() {
        let coordinator = ShutdownCoordinator::new();
        assert!(!coordinator.is_shutdown_initiated());

        coordinator.initiate_shutdown();
        assert!(coordinator.is_shutdown_initiated());
    }

    #[tokio::test]
    async fn test_shutdown_signal_resolves() {
        let coordinator = ShutdownCoordinator::new();
        let signal = coordinator.shutdown_signal();

        let trigger = coordinator.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.initiate_shutdown();
        });

        tokio::time::timeout(Duration::from_secs(1), signal)
            .await
            .expect("shutdown signal should resolve");
    }

    #[tokio::test]
    async fn test_signal_after_shutdown_is_ready() {
        let coordinator = ShutdownCoordinator::new();
        coordinator.initiate_shutdown();

        tokio::time::timeout(Duration::from_millis(100), coordinator.shutdown_signal())
            .await
            .expect("late subscriber should see shutdown");
    }

    #[tokio::test]
    async fn test_wait_for_shutdown_manual_trigger() {
        let coordinator = ShutdownCoordinator::new();
        let trigger = coordinator.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.initiate_shutdown();
        });

        tokio::time::timeout(Duration::from_secs(1), coordinator.wait_for_shutdown())
            .await
            .expect("manual trigger should end the wait");
    }

    #[tokio::test]
    async fn test_double_shutdown() {
        let coordinator = ShutdownCoordinator::new();
        coordinator.initiate_shutdown();
        coordinator.initiate_shutdown();
        assert!(coordinator.is_shutdown_initiated());
    }
}
