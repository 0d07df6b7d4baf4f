//! Shutdown coordination.

use tokio::sync::watch;

/// Latches a single "stop" event for every subscriber.
///
/// The server uses it for graceful shutdown; requests can pass
/// [`Shutdown::signal`] to `Horus::run_until` so body drains stop too.
/// Subscribers created after [`trigger`](Self::trigger) see the event
/// immediately.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Subscribe to the shutdown state; `true` once triggered.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// A future resolving once [`trigger`](Self::trigger) has been called.
    pub fn signal(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        let mut rx = self.subscribe();
        async move {
            // A closed channel means the coordinator is gone; treat it as shutdown.
            let _ = rx.wait_for(|stopped| *stopped).await;
        }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Number of subscribers still waiting.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
