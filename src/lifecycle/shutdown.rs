//! Shutdown coordination.

use std::future::Future;
use tokio::sync::broadcast;

/// Broadcasts a single shutdown event to every subscriber.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Fire the shutdown event. Safe to call with no subscribers.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Fire once `signal` resolves.
    pub fn trigger_on<F>(&self, signal: F) -> tokio::task::JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let this = self.clone();
        tokio::spawn(async move {
            signal.await;
            this.trigger();
        })
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_reaches_subscribers() {
        let shutdown = Shutdown::new();
        let mut a = shutdown.subscribe();
        let mut b = shutdown.subscribe();
        assert_eq!(shutdown.receiver_count(), 2);

        shutdown.trigger();
        assert!(a.recv().await.is_ok());
        assert!(b.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_trigger_on_future() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        let (tx, signal) = tokio::sync::oneshot::channel::<()>();

        let handle = shutdown.trigger_on(async move {
            let _ = signal.await;
        });
        tx.send(()).unwrap();

        assert!(rx.recv().await.is_ok());
        handle.await.unwrap();
    }
}
