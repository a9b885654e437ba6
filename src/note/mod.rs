pub mod controller;
pub mod meta;
pub mod state;
pub mod view;

pub use controller::{DeleteOutcome, NoteController, ResizeObserver};
pub use meta::StickyNoteMeta;
pub use state::{NotePhase, NoteState};
pub use view::{BoxSize, ButtonFace, NoteChrome, NoteView, Overlay, PointerTarget};
