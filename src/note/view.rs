//! What the engine asks of the rendering layer.
//!
//! Host glue implements [`Overlay`] and [`NoteView`] over real DOM nodes and
//! forwards pointer, key and click events into the
//! [`NoteController`](super::NoteController).

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::host::EmbeddedRoot;
use crate::layout::{StickyNoteLayout, Viewport};

use super::meta::StickyNoteMeta;

pub const TITLE_ARIA_LABEL: &str = "Sticky note title";

/// Text and accessible label of a header button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonFace {
    pub text: &'static str,
    pub aria_label: &'static str,
}

impl ButtonFace {
    pub fn minimize(minimized: bool) -> Self {
        if minimized {
            Self {
                text: "▢",
                aria_label: "Expand sticky note",
            }
        } else {
            Self {
                text: "–",
                aria_label: "Minimize sticky note",
            }
        }
    }

    pub fn delete() -> Self {
        Self {
            text: "✕",
            aria_label: "Delete sticky note",
        }
    }
}

/// Everything needed to build one note's chrome: header with title input and
/// minimize/delete buttons, then a content region holding the embedded root.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteChrome {
    pub uid: String,
    pub title: String,
    pub title_aria_label: &'static str,
    pub minimize: ButtonFace,
    pub delete: ButtonFace,
    pub layout: StickyNoteLayout,
}

impl NoteChrome {
    pub fn new(uid: &str, meta: &StickyNoteMeta, layout: &StickyNoteLayout) -> Self {
        Self {
            uid: uid.to_string(),
            title: meta.title_text.clone(),
            title_aria_label: TITLE_ARIA_LABEL,
            minimize: ButtonFace::minimize(layout.minimized),
            delete: ButtonFace::delete(),
            layout: layout.clone(),
        }
    }
}

/// Where a pointer-down landed inside a note header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Header,
    Button,
    TextInput,
    TextArea,
    Editable,
}

impl PointerTarget {
    /// Presses on controls belong to the control, not to dragging.
    pub fn is_interactive(self) -> bool {
        !matches!(self, PointerTarget::Header)
    }
}

/// Rendered border-box size reported by the resize observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSize {
    pub width: f64,
    pub height: f64,
}

/// The shared full-viewport, click-through container all notes live in.
pub trait Overlay: Send + Sync {
    fn viewport(&self) -> Viewport;

    /// Builds the note's elements from `chrome` and appends them.
    fn mount_note(&self, chrome: &NoteChrome) -> Arc<dyn NoteView>;

    /// Detaches the container (and every note inside it) from the document.
    fn remove(&self);
}

/// One mounted note's elements.
pub trait NoteView: Send + Sync {
    fn apply_layout(&self, layout: &StickyNoteLayout);
    fn set_position(&self, x: f64, y: f64);
    /// Collapses or expands the content region and relabels the button.
    fn set_minimized(&self, minimized: bool, button: ButtonFace);
    /// Dragging styling; also suspends text selection on the page.
    fn set_dragging(&self, dragging: bool);
    fn set_title(&self, title: &str);
    fn blur_title(&self);
    fn set_delete_enabled(&self, enabled: bool);
    /// Drops focus from whatever element currently holds it.
    fn blur_active(&self);
    fn embedded_root(&self) -> Arc<dyn EmbeddedRoot>;
    fn observe_resize(&self) -> mpsc::UnboundedReceiver<BoxSize>;
    fn remove(&self);
}
