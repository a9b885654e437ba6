use std::sync::{Arc, Mutex as StdMutex, PoisonError, Weak};

use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::{
    host::{EmbeddedContent, EmbeddedRoot, SubtreeWatch},
    layout::{mutate_layout, CoalescingWriter, LayoutPatch, NoteId, StickyNoteLayout},
    session::SessionContext,
};

use super::{
    meta::StickyNoteMeta,
    state::{NotePhase, NoteState},
    view::{BoxSize, ButtonFace, NoteChrome, NoteView, PointerTarget},
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Host block, view and layout entry are gone.
    Deleted,
    /// The host refused; the note is untouched and can be deleted again.
    Rejected,
    /// Already deleted or a delete is in flight.
    Ignored,
}

struct NoteInner {
    uid: NoteId,
    title_uid: NoteId,
    ctx: Arc<SessionContext>,
    view: Arc<dyn NoteView>,
    state: Mutex<NoteState>,
    resize_flush: CoalescingWriter,
}

/// Drives one mounted note. Cheap to clone; clones share the note.
#[derive(Clone)]
pub struct NoteController {
    inner: Arc<NoteInner>,
}

impl NoteController {
    /// Builds the note's view inside the session overlay, mounts the host's
    /// block view into it and starts observing its size.
    pub async fn mount(
        ctx: Arc<SessionContext>,
        uid: NoteId,
        layout: StickyNoteLayout,
        meta: StickyNoteMeta,
    ) -> Self {
        let chrome = NoteChrome::new(&uid, &meta, &layout);
        let view = ctx.overlay.mount_note(&chrome);
        view.apply_layout(&layout);

        let root = view.embedded_root();
        let embedded_view = ctx.host.mount_embedded_view(&uid, root.clone(), true);
        let watch = SubtreeWatch::spawn(root, |root: &dyn EmbeddedRoot| {
            root.hide_root_header();
        });
        ctx.register_embedded(&uid, EmbeddedContent::new(embedded_view, watch))
            .await;

        let resize_flush = CoalescingWriter::new(
            ctx.store.clone(),
            ctx.layouts.clone(),
            ctx.config.resize_debounce,
        );

        let inner = Arc::new(NoteInner {
            uid: uid.clone(),
            title_uid: meta.title_uid.clone(),
            state: Mutex::new(NoteState::new(layout.x, layout.y, layout.minimized)),
            view: view.clone(),
            ctx: ctx.clone(),
            resize_flush,
        });

        let observer = ResizeObserver::observe(Arc::downgrade(&inner), view.observe_resize());
        ctx.register_observer(&uid, observer).await;

        log_debug!("mounted note {uid}");
        Self { inner }
    }

    pub fn uid(&self) -> &str {
        &self.inner.uid
    }

    pub fn view(&self) -> &Arc<dyn NoteView> {
        &self.inner.view
    }

    pub async fn phase(&self) -> NotePhase {
        self.inner.state.lock().await.phase()
    }

    pub async fn is_deleted(&self) -> bool {
        self.inner.state.lock().await.deleted
    }

    /// This note's entry in the shared layout map.
    pub async fn layout(&self) -> Option<StickyNoteLayout> {
        self.inner.ctx.layouts.lock().await.get(&self.inner.uid).cloned()
    }

    /// Commits the title input on blur. Blank input becomes the placeholder.
    /// A rejected host write is logged and the visible title stays as typed.
    pub async fn commit_title(&self, raw: &str) -> String {
        let placeholder = &self.inner.ctx.config.placeholder_title;
        let trimmed = raw.trim();
        let next = if trimmed.is_empty() {
            placeholder.clone()
        } else {
            trimmed.to_string()
        };

        if self.is_deleted().await {
            return next;
        }
        if raw != next {
            self.inner.view.set_title(&next);
        }

        let _ = self
            .inner
            .ctx
            .host
            .write_block_text(&self.inner.title_uid, &next)
            .await;
        next
    }

    /// Enter leaves the title input, which commits it via blur. Returns
    /// whether the key was consumed.
    pub fn title_keydown(&self, key: &str) -> bool {
        if key == "Enter" {
            self.inner.view.blur_title();
            true
        } else {
            false
        }
    }

    /// Starts a drag unless the press landed on a control. Returns whether a
    /// drag started.
    pub async fn pointer_down(&self, target: PointerTarget, client_x: f64, client_y: f64) -> bool {
        if target.is_interactive() {
            return false;
        }
        let mut state = self.inner.state.lock().await;
        if state.deleted {
            return false;
        }
        state.begin_drag(client_x, client_y);
        self.inner.view.set_dragging(true);
        true
    }

    pub async fn pointer_move(&self, client_x: f64, client_y: f64) -> bool {
        let mut state = self.inner.state.lock().await;
        let Some((x, y)) = state.drag_to(client_x, client_y) else {
            return false;
        };

        self.inner.view.set_position(x, y);
        let viewport = self.inner.ctx.viewport();
        let mut layouts = self.inner.ctx.layouts.lock().await;
        mutate_layout(&mut layouts, &self.inner.uid, LayoutPatch::position(x, y), viewport);
        drop(state);
        true
    }

    /// Ends the drag and writes layouts right away.
    pub async fn pointer_up(&self) -> bool {
        if !self.inner.state.lock().await.end_drag() {
            return false;
        }
        self.inner.view.set_dragging(false);
        self.inner.ctx.persist_layouts().await;
        true
    }

    /// Flips minimized state and persists immediately. Returns the new state.
    pub async fn toggle_minimized(&self) -> bool {
        let mut state = self.inner.state.lock().await;
        if state.deleted {
            return state.minimized;
        }
        state.minimized = !state.minimized;
        let next = state.minimized;

        self.inner
            .view
            .set_minimized(next, ButtonFace::minimize(next));
        {
            let viewport = self.inner.ctx.viewport();
            let mut layouts = self.inner.ctx.layouts.lock().await;
            mutate_layout(&mut layouts, &self.inner.uid, LayoutPatch::minimized(next), viewport);
            self.inner.ctx.store.persist(&layouts);
        }
        drop(state);
        self.inner.view.blur_active();
        next
    }

    /// Records an observed size and schedules a debounced write. Ignored
    /// while minimized, since the collapsed height is not the note's size.
    pub async fn resized(&self, size: BoxSize) {
        self.inner.resized(size).await;
    }

    /// Deletes the host block; only once the host accepts does the note
    /// release its observer, embedded view, element and layout entry.
    pub async fn delete(&self) -> DeleteOutcome {
        {
            let mut state = self.inner.state.lock().await;
            if state.deleted || state.deleting {
                return DeleteOutcome::Ignored;
            }
            state.deleting = true;
        }
        self.inner.view.set_delete_enabled(false);

        let ctx = &self.inner.ctx;
        let uid = &self.inner.uid;

        if ctx.host.delete_block(uid).await.is_err() {
            self.inner.state.lock().await.deleting = false;
            self.inner.view.set_delete_enabled(true);
            return DeleteOutcome::Rejected;
        }

        {
            let mut state = self.inner.state.lock().await;
            state.deleting = false;
            state.deleted = true;
            state.drag = None;
        }

        self.inner.resize_flush.discard().await;
        ctx.release_observer(uid).await;
        ctx.release_embedded(uid).await;
        self.inner.view.remove();

        {
            let mut layouts = ctx.layouts.lock().await;
            layouts.remove(uid);
            ctx.store.persist(&layouts);
        }

        log_info!("deleted sticky note {uid}");
        DeleteOutcome::Deleted
    }

    /// Writes a pending debounced resize now instead of dropping it.
    pub async fn flush_pending(&self) {
        self.inner.resize_flush.flush().await;
    }

    pub async fn has_pending_write(&self) -> bool {
        self.inner.resize_flush.is_pending().await
    }
}

impl NoteInner {
    async fn resized(&self, size: BoxSize) {
        // Held until the write is scheduled; `delete` marks the note under it.
        let state = self.state.lock().await;
        if state.deleted || state.minimized {
            return;
        }

        let viewport = self.ctx.viewport();
        {
            let mut layouts = self.ctx.layouts.lock().await;
            mutate_layout(
                &mut layouts,
                &self.uid,
                LayoutPatch::size(size.width.round(), size.height.round()),
                viewport,
            );
        }
        self.resize_flush.schedule().await;
        drop(state);
    }
}

/// Feeds a note's reported sizes into it, one at a time in arrival order,
/// until disconnected.
pub struct ResizeObserver {
    token: CancellationToken,
    handle: StdMutex<Option<JoinHandle<()>>>,
}

impl ResizeObserver {
    fn observe(note: Weak<NoteInner>, mut sizes: mpsc::UnboundedReceiver<BoxSize>) -> Self {
        let token = CancellationToken::new();
        let token_clone = token.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token_clone.cancelled() => break,
                    received = sizes.recv() => {
                        let Some(size) = received else { break };
                        let Some(note) = note.upgrade() else { break };
                        note.resized(size).await;
                    }
                }
            }
        });

        Self {
            token,
            handle: StdMutex::new(Some(handle)),
        }
    }

    pub fn disconnect(&self) {
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

    pub fn is_connected(&self) -> bool {
        !self.token.is_cancelled()
    }
}

impl Drop for ResizeObserver {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
