//! Star map scroller library
//!
//! Viewport camera, tile addressing, annotation lookup and rendering for a
//! tiled map shown on a 128x64 monochrome display. Re-exports modules for use
//! by the binary and tests.

pub mod annotations;
pub mod app;
pub mod assets;
pub mod bitmap;
pub mod camera;
pub mod canvas;
pub mod error;
pub mod export;
pub mod geometry;
pub mod headless;
pub mod layout;
pub mod records;
pub mod render;
pub mod selection;
pub mod terminal;
pub mod window;

pub use annotations::{Annotation, AnnotationStore};
pub use app::{AppState, InputEvent, InputKind, Key, Transition};
pub use camera::{Camera, TileRange};
pub use geometry::{MapGeometry, TilePoint};
pub use selection::Selection;
