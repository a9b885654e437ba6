use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum NotePhase {
    Mounted,
    Dragging,
    Minimized,
    Deleted,
}

/// Pointer offset from the note's top-left corner when the drag began.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragAnchor {
    pub offset_x: f64,
    pub offset_y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoteState {
    pub x: f64,
    pub y: f64,
    pub minimized: bool,
    pub drag: Option<DragAnchor>,
    /// A host delete is in flight.
    pub deleting: bool,
    pub deleted: bool,
}

impl NoteState {
    pub fn new(x: f64, y: f64, minimized: bool) -> Self {
        Self {
            x,
            y,
            minimized,
            drag: None,
            deleting: false,
            deleted: false,
        }
    }

    pub fn phase(&self) -> NotePhase {
        if self.deleted {
            NotePhase::Deleted
        } else if self.drag.is_some() {
            NotePhase::Dragging
        } else if self.minimized {
            NotePhase::Minimized
        } else {
            NotePhase::Mounted
        }
    }

    pub fn begin_drag(&mut self, client_x: f64, client_y: f64) {
        self.drag = Some(DragAnchor {
            offset_x: client_x - self.x,
            offset_y: client_y - self.y,
        });
    }

    /// New top-left for a pointer at the given client position, or `None`
    /// when no drag is active.
    pub fn drag_to(&mut self, client_x: f64, client_y: f64) -> Option<(f64, f64)> {
        let anchor = self.drag?;
        self.x = client_x - anchor.offset_x;
        self.y = client_y - anchor.offset_y;
        Some((self.x, self.y))
    }

    /// Returns whether a drag was active.
    pub fn end_drag(&mut self) -> bool {
        self.drag.take().is_some()
    }
}
