use std::time::Duration;

/// Title of the host page that parents every note block.
pub const PAGE_TITLE: &str = "roam/js/sticky-note";
/// Settings key holding the serialized layout map.
pub const STORAGE_KEY: &str = "roam-sticky-note-layouts";
/// Settings key of the extension on/off switch.
pub const ENABLED_KEY: &str = "enabled";
pub const COMMAND_LABEL: &str = "Sticky Notes: Create Sticky Note";
/// Shown (and written on commit) when a note title is blank.
pub const PLACEHOLDER_TITLE: &str = "Sticky Note";

const DEFAULT_RESIZE_DEBOUNCE_MS: u64 = 250;
const DEFAULT_FOCUS_DELAYS_MS: [u64; 5] = [60, 140, 280, 520, 900];

#[derive(Debug, Clone)]
pub struct StickyNoteConfig {
    pub page_title: String,
    pub storage_key: String,
    pub command_label: String,
    pub placeholder_title: String,
    /// Quiet period after the last resize event before layouts are flushed.
    pub resize_debounce: Duration,
    /// Offsets from the start of a focus attempt, ascending.
    pub focus_delays: Vec<Duration>,
    pub debug: bool,
}

impl Default for StickyNoteConfig {
    fn default() -> Self {
        Self {
            page_title: PAGE_TITLE.into(),
            storage_key: STORAGE_KEY.into(),
            command_label: COMMAND_LABEL.into(),
            placeholder_title: PLACEHOLDER_TITLE.into(),
            resize_debounce: Duration::from_millis(DEFAULT_RESIZE_DEBOUNCE_MS),
            focus_delays: DEFAULT_FOCUS_DELAYS_MS
                .iter()
                .copied()
                .map(Duration::from_millis)
                .collect(),
            debug: false,
        }
    }
}

impl StickyNoteConfig {
    /// Defaults, overridden by `STICKY_NOTES_RESIZE_DEBOUNCE_MS` and
    /// `STICKY_NOTES_DEBUG` when present.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.debug = std::env::var("STICKY_NOTES_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        if let Some(ms) = std::env::var("STICKY_NOTES_RESIZE_DEBOUNCE_MS")
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
        {
            config.resize_debounce = Duration::from_millis(ms);
        }

        config
    }
}
