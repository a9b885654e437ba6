#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use serde_json::Value;
use sticky_notes_lib::{
    host::{BlockOrder, BlockRenderer, ChildBlock, EmbeddedRoot, HostApi, HostError, HostOperation},
    note::{BoxSize, ButtonFace, NoteChrome, NoteView, Overlay},
    settings::{KeyValueStore, MemoryStore},
    Activation, ExtensionArgs, StickyNoteConfig, StickyNoteLayout, StickyNoteSession, Viewport,
};
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub struct Block {
    pub parent: String,
    pub order: i64,
    pub text: String,
}

#[derive(Default)]
struct HostData {
    pages: HashMap<String, String>,
    blocks: HashMap<String, Block>,
    deleted: Vec<String>,
    focus_calls: Vec<(String, String)>,
    commands: Vec<String>,
}

/// In-memory outliner with switchable write failures.
pub struct FakeHost {
    data: Mutex<HostData>,
    next_uid: AtomicUsize,
    fail_deletes: AtomicBool,
    fail_updates: AtomicBool,
    pub create_page_calls: AtomicUsize,
    renderer: Option<Arc<FakeRenderer>>,
}

impl FakeHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::build(Some(Arc::new(FakeRenderer::default()))))
    }

    pub fn without_renderer() -> Arc<Self> {
        Arc::new(Self::build(None))
    }

    fn build(renderer: Option<Arc<FakeRenderer>>) -> Self {
        Self {
            data: Mutex::new(HostData::default()),
            next_uid: AtomicUsize::new(1),
            fail_deletes: AtomicBool::new(false),
            fail_updates: AtomicBool::new(false),
            create_page_calls: AtomicUsize::new(0),
            renderer,
        }
    }

    fn mint_uid(&self) -> String {
        format!("blk{:06}", self.next_uid.fetch_add(1, Ordering::SeqCst))
    }

    /// Adds a page and returns its uid.
    pub fn seed_page(&self, title: &str) -> String {
        let uid = self.mint_uid();
        self.data
            .lock()
            .unwrap()
            .pages
            .insert(title.to_string(), uid.clone());
        uid
    }

    pub fn seed_block(&self, parent: &str, order: i64, text: &str) -> String {
        let uid = self.mint_uid();
        self.data.lock().unwrap().blocks.insert(
            uid.clone(),
            Block {
                parent: parent.to_string(),
                order,
                text: text.to_string(),
            },
        );
        uid
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn block(&self, uid: &str) -> Option<Block> {
        self.data.lock().unwrap().blocks.get(uid).cloned()
    }

    pub fn children_of(&self, parent: &str) -> Vec<(String, Block)> {
        let mut children: Vec<_> = self
            .data
            .lock()
            .unwrap()
            .blocks
            .iter()
            .filter(|(_, block)| block.parent == parent)
            .map(|(uid, block)| (uid.clone(), block.clone()))
            .collect();
        children.sort_by_key(|(_, block)| block.order);
        children
    }

    pub fn page_uid(&self, title: &str) -> Option<String> {
        self.data.lock().unwrap().pages.get(title).cloned()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.data.lock().unwrap().deleted.clone()
    }

    pub fn focus_calls(&self) -> Vec<(String, String)> {
        self.data.lock().unwrap().focus_calls.clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.data.lock().unwrap().commands.clone()
    }

    pub fn renderer(&self) -> Arc<FakeRenderer> {
        self.renderer.clone().expect("host built with a renderer")
    }
}

#[async_trait]
impl HostApi for FakeHost {
    async fn find_page(&self, title: &str) -> Result<Option<String>, HostError> {
        Ok(self.data.lock().unwrap().pages.get(title).cloned())
    }

    async fn create_page(&self, title: &str) -> Result<String, HostError> {
        self.create_page_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        let uid = self.mint_uid();
        self.data
            .lock()
            .unwrap()
            .pages
            .insert(title.to_string(), uid.clone());
        Ok(uid)
    }

    async fn child_blocks(&self, parent_uid: &str) -> Result<Vec<ChildBlock>, HostError> {
        let mut children: Vec<_> = self
            .children_of(parent_uid)
            .into_iter()
            .map(|(uid, block)| ChildBlock {
                uid,
                order: block.order,
                text: block.text,
            })
            .collect();
        // Hand them back out of order; callers must sort.
        children.reverse();
        Ok(children)
    }

    async fn block_text(&self, uid: &str) -> Result<Option<String>, HostError> {
        Ok(self.block(uid).map(|block| block.text))
    }

    async fn create_block(
        &self,
        parent_uid: &str,
        order: BlockOrder,
        text: &str,
    ) -> Result<String, HostError> {
        let order = match order {
            BlockOrder::Index(index) => index as i64,
            BlockOrder::Last => self
                .children_of(parent_uid)
                .last()
                .map(|(_, block)| block.order + 1)
                .unwrap_or(0),
        };
        Ok(self.seed_block(parent_uid, order, text))
    }

    async fn update_block(&self, uid: &str, text: &str) -> Result<(), HostError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(HostError::rejected(HostOperation::UpdateBlock, uid, "offline"));
        }
        let mut data = self.data.lock().unwrap();
        match data.blocks.get_mut(uid) {
            Some(block) => {
                block.text = text.to_string();
                Ok(())
            }
            None => Err(HostError::rejected(HostOperation::UpdateBlock, uid, "no such block")),
        }
    }

    async fn delete_block(&self, uid: &str) -> Result<(), HostError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(HostError::rejected(HostOperation::DeleteBlock, uid, "offline"));
        }
        let mut data = self.data.lock().unwrap();
        data.blocks.remove(uid);
        data.blocks.retain(|_, block| block.parent != uid);
        data.deleted.push(uid.to_string());
        Ok(())
    }

    async fn focus_block(&self, uid: &str, window_id: &str) -> Result<(), HostError> {
        self.data
            .lock()
            .unwrap()
            .focus_calls
            .push((uid.to_string(), window_id.to_string()));
        Ok(())
    }

    async fn add_command(&self, label: &str) -> Result<(), HostError> {
        self.data.lock().unwrap().commands.push(label.to_string());
        Ok(())
    }

    fn block_renderer(&self) -> Option<Arc<dyn BlockRenderer>> {
        self.renderer
            .clone()
            .map(|renderer| renderer as Arc<dyn BlockRenderer>)
    }
}

#[derive(Default)]
pub struct FakeRenderer {
    pub renders: Mutex<Vec<(String, bool)>>,
    pub unmounts: AtomicUsize,
}

impl BlockRenderer for FakeRenderer {
    fn render(&self, uid: &str, open: bool, _root: &Arc<dyn EmbeddedRoot>) {
        self.renders.lock().unwrap().push((uid.to_string(), open));
    }

    fn unmount(&self, _root: &Arc<dyn EmbeddedRoot>) {
        self.unmounts.fetch_add(1, Ordering::SeqCst);
    }
}

/// Embedded root whose host header starts visible and reappears on every
/// simulated re-render.
pub struct FakeRoot {
    pub header_visible: AtomicBool,
    input_ids: Mutex<Vec<String>>,
    watchers: Mutex<Vec<mpsc::UnboundedSender<()>>>,
}

impl FakeRoot {
    fn new() -> Self {
        Self {
            header_visible: AtomicBool::new(true),
            input_ids: Mutex::new(Vec::new()),
            watchers: Mutex::new(Vec::new()),
        }
    }

    pub fn set_input_ids(&self, ids: Vec<String>) {
        *self.input_ids.lock().unwrap() = ids;
    }

    pub fn rerender(&self) {
        self.header_visible.store(true, Ordering::SeqCst);
        self.watchers
            .lock()
            .unwrap()
            .retain(|watcher| watcher.send(()).is_ok());
    }

    pub fn header_hidden(&self) -> bool {
        !self.header_visible.load(Ordering::SeqCst)
    }
}

impl EmbeddedRoot for FakeRoot {
    fn hide_root_header(&self) -> bool {
        self.header_visible.swap(false, Ordering::SeqCst)
    }

    fn rendered_input_ids(&self) -> Vec<String> {
        self.input_ids.lock().unwrap().clone()
    }

    fn observe_mutations(&self) -> mpsc::UnboundedReceiver<()> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.watchers.lock().unwrap().push(tx);
        rx
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub minimized: bool,
    pub button: ButtonFace,
    pub dragging: bool,
    pub title: String,
    pub delete_enabled: bool,
    pub removed: bool,
    pub title_blurs: usize,
    pub active_blurs: usize,
}

pub struct FakeView {
    pub uid: String,
    pub root: Arc<FakeRoot>,
    state: Mutex<ViewState>,
    resize_tx: Mutex<Option<mpsc::UnboundedSender<BoxSize>>>,
}

impl FakeView {
    fn new(chrome: &NoteChrome) -> Self {
        Self {
            uid: chrome.uid.clone(),
            root: Arc::new(FakeRoot::new()),
            state: Mutex::new(ViewState {
                x: chrome.layout.x,
                y: chrome.layout.y,
                width: chrome.layout.width,
                height: chrome.layout.height,
                rotation: chrome.layout.rotation,
                minimized: chrome.layout.minimized,
                button: chrome.minimize,
                dragging: false,
                title: chrome.title.clone(),
                delete_enabled: true,
                removed: false,
                title_blurs: 0,
                active_blurs: 0,
            }),
            resize_tx: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ViewState {
        self.state.lock().unwrap().clone()
    }

    /// Simulates the browser reporting a new rendered size.
    pub fn resize(&self, width: f64, height: f64) {
        if let Some(tx) = self.resize_tx.lock().unwrap().as_ref() {
            let _ = tx.send(BoxSize { width, height });
        }
    }
}

impl NoteView for FakeView {
    fn apply_layout(&self, layout: &StickyNoteLayout) {
        let mut state = self.state.lock().unwrap();
        state.x = layout.x;
        state.y = layout.y;
        state.width = layout.width;
        state.height = layout.height;
        state.rotation = layout.rotation;
        state.minimized = layout.minimized;
    }

    fn set_position(&self, x: f64, y: f64) {
        let mut state = self.state.lock().unwrap();
        state.x = x;
        state.y = y;
    }

    fn set_minimized(&self, minimized: bool, button: ButtonFace) {
        let mut state = self.state.lock().unwrap();
        state.minimized = minimized;
        state.button = button;
    }

    fn set_dragging(&self, dragging: bool) {
        self.state.lock().unwrap().dragging = dragging;
    }

    fn set_title(&self, title: &str) {
        self.state.lock().unwrap().title = title.to_string();
    }

    fn blur_title(&self) {
        self.state.lock().unwrap().title_blurs += 1;
    }

    fn set_delete_enabled(&self, enabled: bool) {
        self.state.lock().unwrap().delete_enabled = enabled;
    }

    fn blur_active(&self) {
        self.state.lock().unwrap().active_blurs += 1;
    }

    fn embedded_root(&self) -> Arc<dyn EmbeddedRoot> {
        self.root.clone()
    }

    fn observe_resize(&self) -> mpsc::UnboundedReceiver<BoxSize> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.resize_tx.lock().unwrap() = Some(tx);
        rx
    }

    fn remove(&self) {
        self.state.lock().unwrap().removed = true;
    }
}

pub struct FakeOverlay {
    viewport: Viewport,
    views: Mutex<Vec<Arc<FakeView>>>,
    pub chromes: Mutex<Vec<NoteChrome>>,
    pub removed: AtomicBool,
}

impl FakeOverlay {
    pub fn new(width: f64, height: f64) -> Arc<Self> {
        Arc::new(Self {
            viewport: Viewport::new(width, height),
            views: Mutex::new(Vec::new()),
            chromes: Mutex::new(Vec::new()),
            removed: AtomicBool::new(false),
        })
    }

    pub fn view(&self, uid: &str) -> Arc<FakeView> {
        self.views
            .lock()
            .unwrap()
            .iter()
            .find(|view| view.uid == uid)
            .cloned()
            .expect("view mounted for uid")
    }

    pub fn mounted_uids(&self) -> Vec<String> {
        self.views
            .lock()
            .unwrap()
            .iter()
            .map(|view| view.uid.clone())
            .collect()
    }
}

impl Overlay for FakeOverlay {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn mount_note(&self, chrome: &NoteChrome) -> Arc<dyn NoteView> {
        let view = Arc::new(FakeView::new(chrome));
        self.chromes.lock().unwrap().push(chrome.clone());
        self.views.lock().unwrap().push(view.clone());
        view
    }

    fn remove(&self) {
        self.removed.store(true, Ordering::SeqCst);
    }
}

/// Memory settings that count writes per key.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    writes: Mutex<HashMap<String, usize>>,
}

impl CountingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn writes(&self, key: &str) -> usize {
        self.writes.lock().unwrap().get(key).copied().unwrap_or(0)
    }
}

impl KeyValueStore for CountingStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<Value>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: Value) -> anyhow::Result<()> {
        *self
            .writes
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default() += 1;
        self.inner.set(key, value)
    }
}

pub struct Harness {
    pub host: Arc<FakeHost>,
    pub settings: Arc<CountingStore>,
    pub overlay: Arc<FakeOverlay>,
    pub config: StickyNoteConfig,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_host(FakeHost::new())
    }

    pub fn with_host(host: Arc<FakeHost>) -> Self {
        Self {
            host,
            settings: CountingStore::new(),
            overlay: FakeOverlay::new(1280.0, 800.0),
            config: StickyNoteConfig::default(),
        }
    }

    pub fn args(&self) -> ExtensionArgs {
        ExtensionArgs {
            host: self.host.clone(),
            settings: self.settings.clone(),
            overlay: self.overlay.clone(),
            config: self.config.clone(),
        }
    }

    pub async fn start(&self) -> StickyNoteSession {
        match sticky_notes_lib::activate(self.args()).await.unwrap() {
            Activation::Active(session) => session,
            Activation::Disabled => panic!("extension unexpectedly disabled"),
        }
    }

    pub fn layout_writes(&self) -> usize {
        self.settings.writes(&self.config.storage_key)
    }

    /// The layouts as the next activation would load them.
    pub fn persisted(&self) -> sticky_notes_lib::StickyNoteLayouts {
        sticky_notes_lib::LayoutStore::new(self.settings.clone(), self.config.storage_key.clone())
            .load()
    }
}
