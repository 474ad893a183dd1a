//! One-time loading of the tile layout and annotation tables.
//!
//! Missing or unreadable tables are logged and replaced by empty ones; the
//! viewer still runs, it just has nothing to show.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::annotations::AnnotationStore;
use crate::error::LoadError;
use crate::geometry::MapGeometry;
use crate::layout::TileLayout;
use crate::records::read_records;

/// Where to find the data files.
#[derive(Clone, Debug)]
pub struct AssetPaths {
    /// Directory holding the tile images
    pub dir: PathBuf,
    pub tiles: PathBuf,
    pub annotations: PathBuf,
}

impl AssetPaths {
    /// Standard file names inside `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        AssetPaths {
            tiles: dir.join("tiles.csv"),
            annotations: dir.join("annotations.csv"),
            dir,
        }
    }
}

/// Loaded, read-only map data.
#[derive(Clone, Debug)]
pub struct Assets {
    pub layout: TileLayout,
    pub annotations: AnnotationStore,
}

impl Assets {
    pub fn empty(geometry: MapGeometry) -> Self {
        Assets {
            layout: TileLayout::new(geometry),
            annotations: AnnotationStore::new(geometry),
        }
    }

    /// Load both tables. Never fails.
    pub fn load(paths: &AssetPaths, geometry: MapGeometry) -> Self {
        let mut assets = Assets::empty(geometry);

        match read_records(&paths.tiles) {
            Ok(records) => {
                let count = assets.layout.load(records);
                info!("Loaded {} tiles from {}", count, paths.tiles.display());
            }
            Err(err) => log_load_error("tile layout", &paths.tiles, &err),
        }

        match read_records(&paths.annotations) {
            Ok(records) => {
                let count = assets.annotations.load_with_layout(records, &assets.layout);
                info!("Loaded {} annotations from {}", count, paths.annotations.display());
            }
            Err(err) => log_load_error("annotations", &paths.annotations, &err),
        }

        assets
    }
}

fn log_load_error(what: &str, path: &Path, err: &LoadError) {
    warn!(path = %path.display(), "{} unavailable, continuing without: {}", what, err);
}
