use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;

use crate::{
    config::StickyNoteConfig,
    host::{EmbeddedContent, HostAdapter},
    layout::{LayoutStore, NoteId, SharedLayouts, StickyNoteLayouts, Viewport},
    note::{controller::ResizeObserver, Overlay},
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_info;

/// Everything one activation owns, handed explicitly to every note.
///
/// The observer and embedded-view registries only grow on mount and shrink on
/// delete; [`teardown`](Self::teardown) empties both in one pass.
pub struct SessionContext {
    pub config: StickyNoteConfig,
    pub host: HostAdapter,
    pub store: LayoutStore,
    pub overlay: Arc<dyn Overlay>,
    pub layouts: SharedLayouts,
    resize_observers: Mutex<HashMap<NoteId, ResizeObserver>>,
    embedded: Mutex<HashMap<NoteId, EmbeddedContent>>,
}

impl SessionContext {
    pub fn new(
        config: StickyNoteConfig,
        host: HostAdapter,
        store: LayoutStore,
        overlay: Arc<dyn Overlay>,
        layouts: StickyNoteLayouts,
    ) -> Self {
        Self {
            config,
            host,
            store,
            overlay,
            layouts: Arc::new(Mutex::new(layouts)),
            resize_observers: Mutex::new(HashMap::new()),
            embedded: Mutex::new(HashMap::new()),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.overlay.viewport()
    }

    pub async fn persist_layouts(&self) {
        let layouts = self.layouts.lock().await;
        self.store.persist(&layouts);
    }

    pub(crate) async fn register_observer(&self, uid: &str, observer: ResizeObserver) {
        if let Some(previous) = self
            .resize_observers
            .lock()
            .await
            .insert(uid.to_string(), observer)
        {
            previous.disconnect();
        }
    }

    pub(crate) async fn release_observer(&self, uid: &str) {
        if let Some(observer) = self.resize_observers.lock().await.remove(uid) {
            observer.disconnect();
        }
    }

    pub(crate) async fn register_embedded(&self, uid: &str, content: EmbeddedContent) {
        if let Some(previous) = self
            .embedded
            .lock()
            .await
            .insert(uid.to_string(), content)
        {
            previous.teardown();
        }
    }

    pub(crate) async fn release_embedded(&self, uid: &str) {
        if let Some(content) = self.embedded.lock().await.remove(uid) {
            content.teardown();
        }
    }

    pub async fn live_observer_count(&self) -> usize {
        self.resize_observers.lock().await.len()
    }

    pub async fn live_embedded_count(&self) -> usize {
        self.embedded.lock().await.len()
    }

    /// Disconnects every observer, unmounts every embedded view and removes
    /// the overlay. Host data is left alone.
    pub async fn teardown(&self) {
        let observers: Vec<_> = self.resize_observers.lock().await.drain().collect();
        for (_, observer) in &observers {
            observer.disconnect();
        }

        let embedded: Vec<_> = self.embedded.lock().await.drain().collect();
        for (_, content) in &embedded {
            content.teardown();
        }

        self.overlay.remove();
        log_info!(
            "session torn down ({} observers, {} embedded views)",
            observers.len(),
            embedded.len()
        );
    }
}
