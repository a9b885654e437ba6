use rand::Rng;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Host-assigned block uid; the join key between host blocks and layouts.
pub type NoteId = String;

pub type StickyNoteLayouts = BTreeMap<NoteId, StickyNoteLayout>;

const KNOWN_FIELDS: [&str; 6] = ["x", "y", "width", "height", "minimized", "rotation"];
const ROTATION_SPREAD_DEG: f64 = 1.5;

/// Geometry and display state of one note, in viewport pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StickyNoteLayout {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub minimized: bool,
    /// Degrees. Rolled once when the layout is first created.
    pub rotation: f64,
    /// Fields written by other versions, carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StickyNoteLayout {
    /// Normalizes one persisted record.
    ///
    /// A missing or non-numeric `rotation` is replaced with a fresh random tilt
    /// and a missing `minimized` reads as `false`. Records without numeric
    /// geometry are rejected so reconciliation can place them from scratch.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut fields) = value else {
            return None;
        };

        let number = |fields: &Map<String, Value>, key: &str| {
            fields
                .get(key)
                .and_then(Value::as_f64)
                .filter(|n| n.is_finite())
        };

        let x = number(&fields, "x")?;
        let y = number(&fields, "y")?;
        let width = number(&fields, "width")?;
        let height = number(&fields, "height")?;
        let rotation = number(&fields, "rotation").unwrap_or_else(random_rotation);
        let minimized = fields
            .get("minimized")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        for key in KNOWN_FIELDS {
            fields.remove(key);
        }

        Some(Self {
            x,
            y,
            width,
            height,
            minimized,
            rotation,
            extra: fields,
        })
    }

    pub fn apply(&mut self, patch: &LayoutPatch) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(minimized) = patch.minimized {
            self.minimized = minimized;
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
    }
}

/// Partial layout update; `None` leaves the field as it is.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub minimized: Option<bool>,
    pub rotation: Option<f64>,
}

impl LayoutPatch {
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn size(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    pub fn minimized(minimized: bool) -> Self {
        Self {
            minimized: Some(minimized),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Uniform tilt in [-1.5, 1.5] degrees, rounded to one decimal.
pub fn random_rotation() -> f64 {
    let raw = rand::thread_rng().gen::<f64>() * (2.0 * ROTATION_SPREAD_DEG) - ROTATION_SPREAD_DEG;
    (raw * 10.0).round() / 10.0
}
