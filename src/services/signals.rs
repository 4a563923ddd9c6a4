use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{
    db::{SeenSetStore, SignalStore},
    models::Signal,
};

/// Best-effort signal dispatch.
///
/// Recording a signal must never block or fail card advancement: handlers
/// enqueue the write and return immediately, a background writer persists
/// it, and failures are only logged. Every dispatched signal also marks the
/// movie as seen so the feed stops resurfacing it.
#[derive(Clone)]
pub struct SignalDispatcher {
    dispatch_tx: mpsc::UnboundedSender<Signal>,
}

/// Handle for gracefully shutting down the signal writer
pub struct SignalWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl SignalWriterHandle {
    /// Signals the writer task to flush pending signals and stop.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Signal writer shutdown signal sent");
    }
}

impl SignalDispatcher {
    /// Creates a dispatcher and spawns its background writer task.
    pub fn new(
        store: Arc<dyn SignalStore>,
        seen: Arc<dyn SeenSetStore>,
    ) -> (Self, SignalWriterHandle) {
        let (dispatch_tx, dispatch_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        tokio::spawn(async move {
            Self::writer_task(store, seen, dispatch_rx, shutdown_rx).await;
        });

        (
            Self { dispatch_tx },
            SignalWriterHandle { shutdown_tx },
        )
    }

    /// Enqueues one signal and returns immediately.
    pub fn dispatch(&self, signal: Signal) {
        if let Err(e) = self.dispatch_tx.send(signal) {
            tracing::error!(error = %e, "Failed to enqueue signal");
        }
    }

    async fn writer_task(
        store: Arc<dyn SignalStore>,
        seen: Arc<dyn SeenSetStore>,
        mut dispatch_rx: mpsc::UnboundedReceiver<Signal>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Signal writer task started");

        loop {
            tokio::select! {
                Some(signal) = dispatch_rx.recv() => {
                    Self::persist(&store, &seen, signal).await;
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("Signal writer shutting down, flushing remaining signals");

                    while let Ok(signal) = dispatch_rx.try_recv() {
                        Self::persist(&store, &seen, signal).await;
                    }

                    tracing::info!("Signal writer task stopped");
                    break;
                }
            }
        }
    }

    async fn persist(store: &Arc<dyn SignalStore>, seen: &Arc<dyn SeenSetStore>, signal: Signal) {
        if let Err(e) = store.record(&signal).await {
            tracing::warn!(
                error = %e,
                user_id = %signal.user_id,
                movie_id = signal.movie_id,
                "Signal write failed, dropping"
            );
        }

        // An acted-on card counts as seen even if the signal write failed.
        if let Err(e) = seen.add(&signal.user_id, signal.movie_id).await {
            tracing::warn!(
                error = %e,
                user_id = %signal.user_id,
                movie_id = signal.movie_id,
                "Seen-set update failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::seen::InMemorySeenStore;
    use crate::error::{AppError, AppResult};
    use crate::models::SignalAction;
    use chrono::Utc;
    use tokio::sync::Mutex;

    struct RecordingStore {
        recorded: Mutex<Vec<Signal>>,
        fail: bool,
    }

    impl RecordingStore {
        fn new(fail: bool) -> Self {
            Self {
                recorded: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    #[async_trait::async_trait]
    impl SignalStore for RecordingStore {
        async fn record(&self, signal: &Signal) -> AppResult<()> {
            if self.fail {
                return Err(AppError::Internal("write failed".to_string()));
            }
            self.recorded.lock().await.push(signal.clone());
            Ok(())
        }

        async fn positive_signal_count(&self, _user_id: &str) -> AppResult<i64> {
            Ok(self.recorded.lock().await.len() as i64)
        }

        async fn recent_positive_movie_ids(
            &self,
            _user_id: &str,
            _limit: i64,
        ) -> AppResult<Vec<i64>> {
            Ok(Vec::new())
        }
    }

    fn signal(movie_id: i64) -> Signal {
        Signal {
            user_id: "user-1".to_string(),
            movie_id,
            action: SignalAction::Like,
            recorded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_dispatch_persists_in_background() {
        let store = Arc::new(RecordingStore::new(false));
        let seen = Arc::new(InMemorySeenStore::new());
        let (dispatcher, _handle) =
            SignalDispatcher::new(store.clone() as Arc<dyn SignalStore>, seen.clone());

        dispatcher.dispatch(signal(603));

        // Give the background task time to process
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        assert_eq!(store.recorded.lock().await.len(), 1);
        assert!(seen.load("user-1").await.contains(&603));
    }

    #[tokio::test]
    async fn test_dispatch_failure_still_marks_seen() {
        let store = Arc::new(RecordingStore::new(true));
        let seen = Arc::new(InMemorySeenStore::new());
        let (dispatcher, _handle) =
            SignalDispatcher::new(store.clone() as Arc<dyn SignalStore>, seen.clone());

        dispatcher.dispatch(signal(42));

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        assert!(store.recorded.lock().await.is_empty());
        assert!(seen.load("user-1").await.contains(&42));
    }

    #[tokio::test]
    async fn test_shutdown_flushes_pending_signals() {
        let store = Arc::new(RecordingStore::new(false));
        let seen = Arc::new(InMemorySeenStore::new());
        let (dispatcher, handle) =
            SignalDispatcher::new(store.clone() as Arc<dyn SignalStore>, seen.clone());

        for movie_id in [1, 2, 3] {
            dispatcher.dispatch(signal(movie_id));
        }

        handle.shutdown().await;
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        assert_eq!(store.recorded.lock().await.len(), 3);
    }
}
