//! World-space camera for the fixed-size screen.

use crate::geometry::MapGeometry;

/// Inclusive range of tile rows and columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileRange {
    pub row_start: usize,
    pub row_end: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl TileRange {
    /// Iterate over (row, col) pairs in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let (cols, col_end) = (self.col_start, self.col_end);
        (self.row_start..=self.row_end).flat_map(move |row| (cols..=col_end).map(move |col| (row, col)))
    }
}

/// Top-left corner of the viewport in world pixels.
///
/// Both axes stay inside `[0, map - screen]` after every mutation, so every
/// on-screen pixel maps to a tile.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    x: f32,
    y: f32,
    geometry: MapGeometry,
}

impl Camera {
    /// Camera placed at `(x, y)`, clamped into bounds.
    pub fn new(geometry: MapGeometry, x: f32, y: f32) -> Self {
        let mut camera = Camera { x, y, geometry };
        camera.clamp();
        camera
    }

    /// Camera centred on the map.
    pub fn centered(geometry: MapGeometry) -> Self {
        let x = (geometry.map_width() as f32 - geometry.screen_width as f32) / 2.0;
        let y = (geometry.map_height() as f32 - geometry.screen_height as f32) / 2.0;
        Self::new(geometry, x, y)
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn geometry(&self) -> &MapGeometry {
        &self.geometry
    }

    /// Largest legal x.
    pub fn max_x(&self) -> f32 {
        self.geometry.map_width().saturating_sub(self.geometry.screen_width) as f32
    }

    /// Largest legal y.
    pub fn max_y(&self) -> f32 {
        self.geometry.map_height().saturating_sub(self.geometry.screen_height) as f32
    }

    /// Move by (dx, dy) and saturate each axis at the map edges.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
        self.clamp();
    }

    fn clamp(&mut self) {
        // NaN collapses to the lower bound
        self.x = if self.x.is_nan() { 0.0 } else { self.x.clamp(0.0, self.max_x()) };
        self.y = if self.y.is_nan() { 0.0 } else { self.y.clamp(0.0, self.max_y()) };
    }

    /// World pixel under the screen-centre cursor.
    pub fn center_world_point(&self) -> (i64, i64) {
        let half_w = (self.geometry.screen_width / 2) as f32;
        let half_h = (self.geometry.screen_height / 2) as f32;
        ((self.x + half_w) as i64, (self.y + half_h) as i64)
    }

    /// Integer world pixel drawn at screen (0, 0).
    pub fn screen_offset(&self) -> (i64, i64) {
        (self.x.floor() as i64, self.y.floor() as i64)
    }

    /// Tiles whose bounds intersect the screen rectangle.
    pub fn visible_tile_range(&self) -> TileRange {
        let geo = &self.geometry;
        let tw = geo.tile_width as f32;
        let th = geo.tile_height as f32;
        let last_col = geo.cols.saturating_sub(1);
        let last_row = geo.rows.saturating_sub(1);

        let col_start = ((self.x / tw).floor() as usize).min(last_col);
        let row_start = ((self.y / th).floor() as usize).min(last_row);

        // The screen covers [x, x + w), so the right edge itself is exclusive.
        let col_end = (((self.x + geo.screen_width as f32) / tw).ceil() as usize)
            .saturating_sub(1)
            .clamp(col_start, last_col);
        let row_end = (((self.y + geo.screen_height as f32) / th).ceil() as usize)
            .saturating_sub(1)
            .clamp(row_start, last_row);

        TileRange { row_start, row_end, col_start, col_end }
    }
}
