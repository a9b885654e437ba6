use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::settings::KeyValueStore;

use super::model::{
    random_rotation, LayoutPatch, StickyNoteLayout, StickyNoteLayouts, Viewport,
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_warn};

const DEFAULT_WIDTH: f64 = 240.0;
const DEFAULT_HEIGHT: f64 = 220.0;
const CASCADE_STEP: f64 = 30.0;
const CASCADE_ORIGIN_X: f64 = 100.0;
const CASCADE_ORIGIN_Y: f64 = 120.0;
const EDGE_MARGIN: f64 = 20.0;

/// Reads and writes the whole layout map as one JSON string under one key.
#[derive(Clone)]
pub struct LayoutStore {
    backend: Arc<dyn KeyValueStore>,
    key: String,
}

impl LayoutStore {
    pub fn new(backend: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// Never fails: anything unreadable comes back as an empty map.
    pub fn load(&self) -> StickyNoteLayouts {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(Value::String(raw))) if !raw.is_empty() => raw,
            Ok(_) => return StickyNoteLayouts::new(),
            Err(err) => {
                log_debug!("layout read failed, starting empty: {err:#}");
                return StickyNoteLayouts::new();
            }
        };

        let entries = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(entries)) => entries,
            Ok(_) => return StickyNoteLayouts::new(),
            Err(err) => {
                log_debug!("layout blob is not valid JSON, starting empty: {err}");
                return StickyNoteLayouts::new();
            }
        };

        entries
            .into_iter()
            .filter_map(|(uid, value)| match StickyNoteLayout::from_value(value) {
                Some(layout) => Some((uid, layout)),
                None => {
                    log_warn!("discarding malformed layout for block {uid}");
                    None
                }
            })
            .collect()
    }

    /// Replaces the stored blob with the full map.
    pub fn save(&self, layouts: &StickyNoteLayouts) -> Result<()> {
        let serialized = serde_json::to_string(layouts).context("failed to serialize layouts")?;
        self.backend
            .set(&self.key, Value::String(serialized))
            .with_context(|| format!("failed to write layouts under '{}'", self.key))
    }

    /// [`save`](Self::save), logging instead of returning the failure.
    pub fn persist(&self, layouts: &StickyNoteLayouts) {
        if let Err(err) = self.save(layouts) {
            log_error!("{err:#}");
        }
    }
}

/// Placement for the `index`-th note surfaced without a stored layout.
///
/// Notes cascade diagonally from (100, 120) in 30px steps and stop at 20px
/// from the right/bottom edge; the result never drops below 20.
pub fn default_layout(index: usize, viewport_width: f64, viewport_height: f64) -> StickyNoteLayout {
    let offset = CASCADE_STEP * index as f64;
    let x = (CASCADE_ORIGIN_X + offset)
        .min((viewport_width - DEFAULT_WIDTH - EDGE_MARGIN).max(EDGE_MARGIN));
    let y = (CASCADE_ORIGIN_Y + offset)
        .min((viewport_height - DEFAULT_HEIGHT - EDGE_MARGIN).max(EDGE_MARGIN));

    StickyNoteLayout {
        x,
        y,
        width: DEFAULT_WIDTH,
        height: DEFAULT_HEIGHT,
        minimized: false,
        rotation: random_rotation(),
        extra: Default::default(),
    }
}

/// Merges `patch` into the entry for `uid`, starting from
/// `default_layout(0, ..)` when there is none. Does not persist.
pub fn mutate_layout(
    layouts: &mut StickyNoteLayouts,
    uid: &str,
    patch: LayoutPatch,
    viewport: Viewport,
) {
    layouts
        .entry(uid.to_string())
        .or_insert_with(|| default_layout(0, viewport.width, viewport.height))
        .apply(&patch);
}
