//! Sticky note overlays for an outliner host.
//!
//! Notes are host blocks under one container page; their geometry lives in a
//! single JSON blob in the host's settings store. Host glue implements the
//! traits in [`host`] and [`note::view`], then calls [`activate`] on load and
//! [`StickyNoteSession::deactivate`] on unload.

pub mod config;
mod db;
pub mod host;
pub mod layout;
pub mod note;
pub mod session;
pub mod settings;
pub mod utils;

pub use config::StickyNoteConfig;
pub use db::LocalStore;
pub use host::{HostAdapter, HostApi, HostError};
pub use layout::{
    default_layout, mutate_layout, LayoutPatch, LayoutStore, StickyNoteLayout, StickyNoteLayouts,
    Viewport,
};
pub use note::{DeleteOutcome, NoteController, NoteView, Overlay, PointerTarget};
pub use session::{activate, Activation, ExtensionArgs, StickyNoteSession};
pub use settings::{KeyValueStore, MemoryStore, SettingsStore};

/// Installs the `env_logger` backend. `RUST_LOG` wins when set; otherwise
/// `info`, or `debug` with `config.debug`. Safe to call more than once.
pub fn init_logging(config: &StickyNoteConfig) {
    let default_level = if config.debug { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .try_init();

    log::info!("Sticky notes logging initialized");
}
