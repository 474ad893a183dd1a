//! Tile addressing for a fixed grid of equally sized tiles.
//!
//! Tiles are stored row-major, so a tile's linear index is `row * cols + col`.
//! World coordinates are pixels inside the full map; local coordinates are
//! pixels inside one tile.

/// Screen width of the display in pixels
pub const SCREEN_WIDTH: usize = 128;
/// Screen height of the display in pixels
pub const SCREEN_HEIGHT: usize = 64;

/// Tile width in pixels
pub const TILE_WIDTH: usize = 128;
/// Tile height in pixels
pub const TILE_HEIGHT: usize = 64;

/// Number of tile columns (5 * 128 = 640px)
pub const MAP_COLS: usize = 5;
/// Number of tile rows (10 * 64 = 640px)
pub const MAP_ROWS: usize = 10;

/// A point inside a specific tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TilePoint {
    pub tile_index: usize,
    pub local_x: usize,
    pub local_y: usize,
}

/// Grid and screen dimensions shared by every component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapGeometry {
    pub rows: usize,
    pub cols: usize,
    pub tile_width: usize,
    pub tile_height: usize,
    pub screen_width: usize,
    pub screen_height: usize,
}

impl Default for MapGeometry {
    fn default() -> Self {
        Self {
            rows: MAP_ROWS,
            cols: MAP_COLS,
            tile_width: TILE_WIDTH,
            tile_height: TILE_HEIGHT,
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
        }
    }
}

impl MapGeometry {
    /// Full map width in pixels.
    pub fn map_width(&self) -> usize {
        self.cols * self.tile_width
    }

    /// Full map height in pixels.
    pub fn map_height(&self) -> usize {
        self.rows * self.tile_height
    }

    pub fn tile_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Linear index of the tile at (row, col). Bounds are the caller's problem.
    pub fn tile_index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// Inverse of [`MapGeometry::tile_index`].
    pub fn row_col_of(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }

    /// World-space top-left pixel of a tile.
    pub fn tile_origin(&self, index: usize) -> (i64, i64) {
        let (row, col) = self.row_col_of(index);
        ((col * self.tile_width) as i64, (row * self.tile_height) as i64)
    }

    /// True if (x, y) is a valid pixel inside a single tile.
    pub fn contains_local(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.tile_width && (y as usize) < self.tile_height
    }

    /// Map a world pixel to the tile containing it and the pixel inside that tile.
    /// Returns `None` when the point lies outside the grid.
    pub fn world_to_tile(&self, world_x: i64, world_y: i64) -> Option<TilePoint> {
        if world_x < 0 || world_y < 0 {
            return None;
        }
        let (world_x, world_y) = (world_x as usize, world_y as usize);

        let col = world_x / self.tile_width;
        let row = world_y / self.tile_height;
        if row >= self.rows || col >= self.cols {
            return None;
        }

        Some(TilePoint {
            tile_index: self.tile_index(row, col),
            local_x: world_x % self.tile_width,
            local_y: world_y % self.tile_height,
        })
    }
}
