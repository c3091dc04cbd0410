use crate::error::{AgentError, Result};
use log::{debug, info};
use std::sync::Arc;
use tokio::sync::watch;

/// Cancellation trigger shared by the signal watcher, the accept loops and the orchestrator.
#[derive(Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

/// Receiving side of [`Shutdown`], one per task that must stop on termination.
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request shutdown. Calling this more than once is harmless.
    pub fn trigger(&self) {
        if !self.tx.send_replace(true) {
            debug!("Shutdown triggered");
        }
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal { rx: self.tx.subscribe() }
    }
}

impl ShutdownSignal {
    /// Resolves once shutdown has been triggered, immediately if it already was.
    pub async fn recv(&mut self) {
        // Err means every sender is gone, which only happens while the process is tearing down.
        let _ = self.rx.wait_for(|triggered| *triggered).await;
    }
}

/// Interrupt and terminate hooks. The OS handlers are registered by [`TerminationSignals::install`]
/// itself, so a signal that arrives before anything awaits [`TerminationSignals::recv`] is still seen.
pub struct TerminationSignals {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
    #[cfg(windows)]
    ctrl_c: tokio::signal::windows::CtrlC,
}

impl TerminationSignals {
    /// Must be called from within a tokio runtime.
    pub fn install() -> Result<Self> {
        #[cfg(unix)]
        let signals = {
            use tokio::signal::unix::{SignalKind, signal};
            Self {
                interrupt: signal(SignalKind::interrupt()).map_err(AgentError::Signal)?,
                terminate: signal(SignalKind::terminate()).map_err(AgentError::Signal)?,
            }
        };

        #[cfg(windows)]
        let signals = Self { ctrl_c: tokio::signal::windows::ctrl_c().map_err(AgentError::Signal)? };

        debug!("Termination signal handlers installed");
        Ok(signals)
    }

    /// Wait for the first interrupt or terminate signal.
    pub async fn recv(mut self) {
        #[cfg(unix)]
        {
            tokio::select! {
                _ = self.interrupt.recv() => info!("Received interrupt signal"),
                _ = self.terminate.recv() => info!("Received terminate signal"),
            }
        }

        #[cfg(windows)]
        {
            self.ctrl_c.recv().await;
            info!("Received interrupt signal");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_signal_resolves_after_trigger() {
        let shutdown = Shutdown::new();
        let mut signal = shutdown.subscribe();
        assert!(!shutdown.is_triggered());

        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.trigger();
        });

        tokio::time::timeout(Duration::from_secs(2), signal.recv()).await.unwrap();
        assert!(shutdown.is_triggered());
    }

    #[tokio::test]
    async fn test_install_termination_signals() {
        // every manager installs its own hooks
        let first = TerminationSignals::install().unwrap();
        let second = TerminationSignals::install().unwrap();
        drop(first);
        drop(second);
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_trigger() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        shutdown.trigger();

        let mut signal = shutdown.subscribe();
        tokio::time::timeout(Duration::from_secs(1), signal.recv()).await.unwrap();
    }
}
