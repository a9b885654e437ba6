pub mod context;
pub mod reconcile;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::{bail, Result};
use tokio::sync::Mutex;

use crate::{
    config::StickyNoteConfig,
    host::{BlockOrder, FocusDebug, FocusRetry, HostAdapter, HostApi},
    layout::{default_layout, LayoutStore},
    note::{NoteController, Overlay, StickyNoteMeta},
    settings::KeyValueStore,
};

pub use context::SessionContext;
pub use reconcile::reconcile;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// Host-provided handles for one activation.
pub struct ExtensionArgs {
    pub host: Arc<dyn HostApi>,
    /// Extension settings; holds the on/off switch and the layout blob.
    pub settings: Arc<dyn KeyValueStore>,
    pub overlay: Arc<dyn Overlay>,
    pub config: StickyNoteConfig,
}

pub enum Activation {
    /// The extension switch is off; nothing was mounted or registered.
    Disabled,
    Active(StickyNoteSession),
}

impl Activation {
    pub fn into_session(self) -> Option<StickyNoteSession> {
        match self {
            Activation::Disabled => None,
            Activation::Active(session) => Some(session),
        }
    }
}

/// Mounts every existing note, reconciles stored layouts with the host and
/// registers the create command.
pub async fn activate(args: ExtensionArgs) -> Result<Activation> {
    let ExtensionArgs {
        host,
        settings,
        overlay,
        config,
    } = args;

    let enabled = settings.enabled().unwrap_or_else(|err| {
        log_warn!("could not read extension switch, assuming enabled: {err:#}");
        true
    });
    if !enabled {
        log_info!("sticky notes disabled in settings");
        return Ok(Activation::Disabled);
    }

    let adapter = HostAdapter::new(host, &config.page_title);
    let store = LayoutStore::new(settings, config.storage_key.clone());

    let page_uid = adapter.ensure_container_page().await?;
    let records = adapter.list_child_notes(&page_uid).await?;
    let mut layouts = store.load();

    let note_ids: Vec<_> = records.iter().map(|record| record.uid.clone()).collect();
    let placed = reconcile(&mut layouts, &note_ids, overlay.viewport());

    let ctx = Arc::new(SessionContext::new(
        config.clone(),
        adapter.clone(),
        store,
        overlay,
        layouts,
    ));

    let mut notes = Vec::with_capacity(placed.len());
    for (record, (uid, layout)) in records.iter().zip(placed) {
        let meta = StickyNoteMeta::from_text(&uid, &record.text, &config.placeholder_title);
        notes.push(NoteController::mount(ctx.clone(), uid, layout, meta).await);
    }
    ctx.persist_layouts().await;

    if let Err(err) = adapter.register_command(&config.command_label).await {
        log_error!("failed to register '{}': {err}", config.command_label);
    }

    log_info!("sticky notes active with {} notes", notes.len());

    Ok(Activation::Active(StickyNoteSession {
        debug: std::sync::Mutex::new(Some(FocusDebug::new(
            adapter,
            config.focus_delays.clone(),
        ))),
        commands: vec![config.command_label.clone()],
        ctx,
        notes: Mutex::new(notes),
        pending_focus: Mutex::new(Vec::new()),
        active: AtomicBool::new(true),
    }))
}

/// A running activation. [`deactivate`](Self::deactivate) is the unload hook.
pub struct StickyNoteSession {
    ctx: Arc<SessionContext>,
    notes: Mutex<Vec<NoteController>>,
    pending_focus: Mutex<Vec<FocusRetry>>,
    commands: Vec<String>,
    debug: std::sync::Mutex<Option<FocusDebug>>,
    active: AtomicBool,
}

impl StickyNoteSession {
    pub fn context(&self) -> &Arc<SessionContext> {
        &self.ctx
    }

    /// Command labels this session registered with the host.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Host command palette callback. Failures are logged, never returned to
    /// the palette. Returns whether `label` belongs to this session.
    pub async fn run_command(&self, label: &str) -> bool {
        if !self.commands.iter().any(|command| command == label) {
            return false;
        }
        if let Err(err) = self.create_note().await {
            log_error!("create sticky note failed: {err:#}");
        }
        true
    }

    /// Creates a title block with one empty child, mounts a note for it and
    /// moves the cursor into the child once the host has rendered it.
    pub async fn create_note(&self) -> Result<NoteController> {
        if !self.is_active() {
            bail!("session is no longer active");
        }

        let ctx = &self.ctx;
        let page_uid = ctx.host.ensure_container_page().await?;
        let uid = ctx
            .host
            .create_block(&page_uid, BlockOrder::Last, &ctx.config.placeholder_title)
            .await?;
        let content_uid = ctx.host.create_block(&uid, BlockOrder::Index(0), "").await?;

        let layout = {
            let viewport = ctx.viewport();
            let mut layouts = ctx.layouts.lock().await;
            let layout = default_layout(layouts.len(), viewport.width, viewport.height);
            layouts.insert(uid.clone(), layout.clone());
            ctx.store.persist(&layouts);
            layout
        };

        let meta = StickyNoteMeta::from_text(&uid, "", &ctx.config.placeholder_title);
        let note = NoteController::mount(ctx.clone(), uid.clone(), layout, meta).await;

        let retry = ctx.host.focus_with_retries(
            &content_uid,
            note.view().embedded_root(),
            &ctx.config.focus_delays,
        );
        {
            let mut pending = self.pending_focus.lock().await;
            pending.retain(|retry| !retry.is_finished());
            pending.push(retry);
        }

        self.notes.lock().await.push(note.clone());
        log_info!("created sticky note {uid}");
        Ok(note)
    }

    /// Live notes in mount order.
    pub async fn notes(&self) -> Vec<NoteController> {
        let mut notes = self.notes.lock().await;
        let mut live = Vec::with_capacity(notes.len());
        for note in notes.iter() {
            if !note.is_deleted().await {
                live.push(note.clone());
            }
        }
        *notes = live.clone();
        live
    }

    pub async fn note(&self, uid: &str) -> Option<NoteController> {
        self.notes()
            .await
            .into_iter()
            .find(|note| note.uid() == uid)
    }

    /// Focus helpers for manual inspection; `None` after deactivation.
    pub fn focus_debug(&self) -> Option<FocusDebug> {
        self.debug
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Unload hook. Cancels focus attempts, writes pending resizes, then
    /// disconnects observers, unmounts embedded views and removes the
    /// overlay. Calling it again does nothing.
    pub async fn deactivate(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }

        self.debug
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();

        for retry in self.pending_focus.lock().await.drain(..) {
            retry.cancel();
        }

        let notes: Vec<_> = self.notes.lock().await.drain(..).collect();
        for note in &notes {
            note.flush_pending().await;
        }

        self.ctx.teardown().await;
    }
}
