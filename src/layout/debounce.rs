use std::{sync::Arc, time::Duration};

use tokio::{sync::Mutex, task::JoinHandle, time};

use super::{store::LayoutStore, SharedLayouts};

/// Coalesces bursts of layout changes into a single write.
///
/// Each [`schedule`](Self::schedule) replaces the pending timer; the write
/// happens once `quiet` has passed without another call and stores whatever
/// the shared map holds at that moment.
#[derive(Clone)]
pub struct CoalescingWriter {
    store: LayoutStore,
    layouts: SharedLayouts,
    quiet: Duration,
    pending: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl CoalescingWriter {
    pub fn new(store: LayoutStore, layouts: SharedLayouts, quiet: Duration) -> Self {
        Self {
            store,
            layouts,
            quiet,
            pending: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn schedule(&self) {
        let mut pending = self.pending.lock().await;
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let store = self.store.clone();
        let layouts = self.layouts.clone();
        let quiet = self.quiet;

        *pending = Some(tokio::spawn(async move {
            time::sleep(quiet).await;
            let guard = layouts.lock().await;
            store.persist(&guard);
        }));
    }

    /// Drops the pending write, if any. Returns whether one was dropped.
    pub async fn discard(&self) -> bool {
        match self.pending.lock().await.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    /// Writes now instead of waiting out the quiet period. No-op when nothing
    /// is pending.
    pub async fn flush(&self) {
        if self.discard().await {
            let guard = self.layouts.lock().await;
            self.store.persist(&guard);
        }
    }

    pub async fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}
