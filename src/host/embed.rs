use std::sync::{Arc, Mutex, PoisonError};

use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;

/// The container a note hands to the host's block renderer.
pub trait EmbeddedRoot: Send + Sync {
    /// Hides the host's header for the root block, which duplicates the note
    /// title. Returns whether a header was present.
    fn hide_root_header(&self) -> bool;

    /// Element ids of the editable block inputs currently rendered inside.
    fn rendered_input_ids(&self) -> Vec<String>;

    /// One message per structural change (child list, subtree) inside the root.
    fn observe_mutations(&self) -> mpsc::UnboundedReceiver<()>;
}

/// The host's block rendering UI.
pub trait BlockRenderer: Send + Sync {
    fn render(&self, uid: &str, open: bool, root: &Arc<dyn EmbeddedRoot>);
    fn unmount(&self, root: &Arc<dyn EmbeddedRoot>);
}

/// Handle to one rendered block view. Unmounting is idempotent.
pub struct EmbeddedView {
    mounted: Mutex<Option<(Arc<dyn BlockRenderer>, Arc<dyn EmbeddedRoot>)>>,
}

impl EmbeddedView {
    pub(crate) fn mounted(renderer: Arc<dyn BlockRenderer>, root: Arc<dyn EmbeddedRoot>) -> Self {
        Self {
            mounted: Mutex::new(Some((renderer, root))),
        }
    }

    /// A view that was never drawn.
    pub(crate) fn detached() -> Self {
        Self {
            mounted: Mutex::new(None),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn unmount(&self) {
        let taken = self
            .mounted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some((renderer, root)) = taken {
            renderer.unmount(&root);
        }
    }
}

/// Keeps an invariant applied to a subtree the host re-renders on its own
/// schedule: the invariant runs once at start and again after every mutation
/// until [`stop`](Self::stop).
pub struct SubtreeWatch {
    token: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl SubtreeWatch {
    pub fn spawn<F>(root: Arc<dyn EmbeddedRoot>, invariant: F) -> Self
    where
        F: Fn(&dyn EmbeddedRoot) + Send + Sync + 'static,
    {
        invariant(root.as_ref());

        let token = CancellationToken::new();
        let token_clone = token.clone();
        let mut mutations = root.observe_mutations();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token_clone.cancelled() => break,
                    received = mutations.recv() => match received {
                        Some(()) => invariant(root.as_ref()),
                        None => break,
                    },
                }
            }
        });

        Self {
            token,
            handle: Mutex::new(Some(handle)),
        }
    }

    pub fn stop(&self) {
        self.token.cancel();
        if let Some(handle) = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }
}

impl Drop for SubtreeWatch {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// A note's embedded block view together with the watch that keeps its
/// redundant root header hidden. Torn down as one unit.
pub struct EmbeddedContent {
    view: EmbeddedView,
    watch: SubtreeWatch,
}

impl EmbeddedContent {
    pub fn new(view: EmbeddedView, watch: SubtreeWatch) -> Self {
        Self { view, watch }
    }

    pub fn is_mounted(&self) -> bool {
        self.view.is_mounted()
    }

    pub fn teardown(&self) {
        self.watch.stop();
        self.view.unmount();
    }
}
