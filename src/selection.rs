//! Cursor hit testing.
//!
//! The cursor is drawn at the screen centre, so the selection is whatever
//! annotation lies near the camera's centre world point.

use crate::annotations::AnnotationStore;
use crate::camera::Camera;

/// Cursor circle radius in pixels (8px diameter).
pub const CURSOR_RADIUS: usize = 4;

/// Annotation currently under the cursor, if any.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    label: Option<String>,
}

impl Selection {
    pub fn none() -> Self {
        Selection { label: None }
    }

    pub fn with_label(label: impl Into<String>) -> Self {
        Selection { label: Some(label.into()) }
    }

    pub fn has_selection(&self) -> bool {
        self.label.is_some()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

/// Recompute the selection for the current camera position.
pub fn evaluate(camera: &Camera, store: &AnnotationStore) -> Selection {
    let (world_x, world_y) = camera.center_world_point();

    // Unreachable while the camera clamps, but a bad point must not panic
    let Some(point) = camera.geometry().world_to_tile(world_x, world_y) else {
        return Selection::none();
    };

    match store.find_at(point.tile_index, point.local_x, point.local_y, CURSOR_RADIUS) {
        Some(annotation) => Selection::with_label(annotation.label.clone()),
        None => Selection::none(),
    }
}
