pub mod debounce;
pub mod model;
pub mod store;

use std::sync::Arc;

use tokio::sync::Mutex;

pub use debounce::CoalescingWriter;
pub use model::{
    random_rotation, LayoutPatch, NoteId, StickyNoteLayout, StickyNoteLayouts, Viewport,
};
pub use store::{default_layout, mutate_layout, LayoutStore};

/// The session's single in-memory layout map, shared by every note.
pub type SharedLayouts = Arc<Mutex<StickyNoteLayouts>>;
