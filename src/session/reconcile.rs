use crate::layout::{default_layout, NoteId, StickyNoteLayout, StickyNoteLayouts, Viewport};

/// Aligns `layouts` with the notes the host currently has.
///
/// Returns one layout per entry of `note_ids`, in the same order: the stored
/// one when present, otherwise a cascade default placed by list position.
/// Entries for uids the host no longer has are removed from `layouts`.
pub fn reconcile(
    layouts: &mut StickyNoteLayouts,
    note_ids: &[NoteId],
    viewport: Viewport,
) -> Vec<(NoteId, StickyNoteLayout)> {
    let placed = note_ids
        .iter()
        .enumerate()
        .map(|(index, uid)| {
            let layout = layouts
                .entry(uid.clone())
                .or_insert_with(|| default_layout(index, viewport.width, viewport.height))
                .clone();
            (uid.clone(), layout)
        })
        .collect();

    layouts.retain(|uid, _| note_ids.contains(uid));
    placed
}
