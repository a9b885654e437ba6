/// Display metadata for one note, derived from its block text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StickyNoteMeta {
    pub title_uid: String,
    pub title_text: String,
}

impl StickyNoteMeta {
    /// Blank text shows `placeholder`. Nothing is written back to the host
    /// until the user commits a title.
    pub fn from_text(uid: &str, text: &str, placeholder: &str) -> Self {
        let trimmed = text.trim();
        Self {
            title_uid: uid.to_string(),
            title_text: if trimmed.is_empty() {
                placeholder.to_string()
            } else {
                trimmed.to_string()
            },
        }
    }
}
