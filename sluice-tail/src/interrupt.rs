//! Deferred interrupt handling
//!
//! Termination signals must never cut a write in half. Instead of letting a
//! signal end the process, a listener task records it in a shared flag and the
//! tail loop pops that flag between iterations.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;
use tracing::info;

/// Cooperative cancellation flag raised by signals
#[derive(Debug, Clone, Default)]
pub struct DeferredInterrupts {
    pending: Arc<AtomicBool>,
}

impl DeferredInterrupts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts capturing termination signals into this flag
    ///
    /// Handlers are registered before this returns, so a signal arriving
    /// afterwards is always deferred. Must be called inside a Tokio runtime.
    #[cfg(unix)]
    pub fn install(&self) -> std::io::Result<JoinHandle<()>> {
        use tokio::signal::unix::{SignalKind, signal};

        let mut interrupt = signal(SignalKind::interrupt())?;
        let mut terminate = signal(SignalKind::terminate())?;
        let interrupts = self.clone();

        Ok(tokio::spawn(async move {
            loop {
                let name = tokio::select! {
                    received = interrupt.recv() => match received {
                        Some(()) => "SIGINT",
                        None => break,
                    },
                    received = terminate.recv() => match received {
                        Some(()) => "SIGTERM",
                        None => break,
                    },
                };

                info!("Received {}, stopping after the current iteration", name);
                interrupts.raise();
            }
        }))
    }

    /// Starts capturing Ctrl-C into this flag
    #[cfg(not(unix))]
    pub fn install(&self) -> std::io::Result<JoinHandle<()>> {
        let interrupts = self.clone();

        Ok(tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                info!("Received Ctrl-C, stopping after the current iteration");
                interrupts.raise();
            }
        }))
    }

    /// Records an interrupt
    pub fn raise(&self) {
        self.pending.store(true, Ordering::SeqCst);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Returns whether an interrupt was pending and clears it
    pub fn pop(&self) -> bool {
        self.pending.swap(false, Ordering::SeqCst)
    }
}
