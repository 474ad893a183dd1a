//! Monochrome tile images.
//!
//! Tile images are decoded with the `image` crate and thresholded to one bit
//! per pixel. Only 8-bit-per-channel sources are accepted.

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use image::{ColorType, DynamicImage};
use tracing::{debug, warn};

use crate::error::ImageError;
use crate::geometry::MapGeometry;
use crate::layout::TileLayout;

/// Luma and alpha at or above this are background.
const INK_THRESHOLD: u8 = 128;

/// A 1-bit image, row-major, `true` = ink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl Bitmap {
    /// Blank bitmap.
    pub fn new(width: usize, height: usize) -> Self {
        Bitmap { width, height, bits: vec![false; width * height] }
    }

    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut bitmap = Bitmap::new(width, height);
        for y in 0..height {
            for x in 0..width {
                bitmap.bits[y * width + x] = f(x, y);
            }
        }
        bitmap
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.bits[y * self.width + x]
    }

    /// Number of ink pixels.
    pub fn ink_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Threshold a decoded image, requiring exact dimensions.
    pub fn from_image(img: &DynamicImage, width: usize, height: usize) -> Result<Self, ImageError> {
        match img.color() {
            ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8 => {}
            other => return Err(ImageError::UnsupportedDepth(format!("{:?}", other))),
        }

        if img.width() as usize != width || img.height() as usize != height {
            return Err(ImageError::WrongDimensions {
                width: img.width(),
                height: img.height(),
                expected_width: width as u32,
                expected_height: height as u32,
            });
        }

        let gray = img.to_luma_alpha8();
        Ok(Bitmap::from_fn(width, height, |x, y| {
            let px = gray.get_pixel(x as u32, y as u32);
            px[1] >= INK_THRESHOLD && px[0] < INK_THRESHOLD
        }))
    }

    /// Decode an in-memory image file.
    pub fn decode(bytes: &[u8], path: &Path, width: usize, height: usize) -> Result<Self, ImageError> {
        let img = image::load_from_memory(bytes).map_err(|e| ImageError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_image(&img, width, height)
    }

    /// Read and decode an image file.
    pub fn open(path: &Path, width: usize, height: usize) -> Result<Self, ImageError> {
        let bytes = std::fs::read(path).map_err(|source| ImageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::decode(&bytes, path, width, height)
    }
}

/// Supplier of tile bitmaps, keyed by tile index.
pub trait ImageSource {
    /// Bitmap for `index`, or why it is unavailable.
    fn tile_image(&mut self, index: usize) -> Result<&Bitmap, ImageError>;
}

/// Source with no images at all; every tile uses the fallback.
#[derive(Debug, Default)]
pub struct NoImages;

impl ImageSource for NoImages {
    fn tile_image(&mut self, index: usize) -> Result<&Bitmap, ImageError> {
        Err(ImageError::Missing(index))
    }
}

/// Tiles that can share the screen at once when the screen is no larger
/// than a tile.
const VISIBLE_SLOTS: usize = 4;

/// Tile images read from a directory, named by a [`TileLayout`].
///
/// Decoded images are kept only for the tiles drawn most recently, at most
/// one screenful.
#[derive(Debug)]
pub struct TileImages {
    dir: PathBuf,
    layout: TileLayout,
    geometry: MapGeometry,
    recent: VecDeque<(usize, Bitmap)>,
    reported: HashSet<usize>,
}

impl TileImages {
    pub fn new(dir: impl Into<PathBuf>, layout: TileLayout) -> Self {
        let geometry = *layout.geometry();
        TileImages {
            dir: dir.into(),
            layout,
            geometry,
            recent: VecDeque::with_capacity(VISIBLE_SLOTS),
            reported: HashSet::new(),
        }
    }

    pub fn path_for(&self, index: usize) -> PathBuf {
        self.dir.join(self.layout.filename(index))
    }

    fn load(&mut self, index: usize) -> Result<Bitmap, ImageError> {
        if index >= self.geometry.tile_count() {
            return Err(ImageError::Missing(index));
        }
        let path = self.path_for(index);
        let result = Bitmap::open(&path, self.geometry.tile_width, self.geometry.tile_height);

        if let Err(err) = &result {
            if self.note_failure(index) {
                if err.is_missing() {
                    debug!(tile = index, path = %path.display(), "tile image missing, using fallback");
                } else {
                    warn!(tile = index, "tile image unusable: {}", err);
                }
            }
        }
        result
    }

    /// True the first time a tile fails; redraws would otherwise flood the log.
    fn note_failure(&mut self, index: usize) -> bool {
        self.reported.insert(index)
    }
}

impl ImageSource for TileImages {
    fn tile_image(&mut self, index: usize) -> Result<&Bitmap, ImageError> {
        match self.recent.iter().position(|(idx, _)| *idx == index) {
            Some(pos) => {
                if let Some(entry) = self.recent.remove(pos) {
                    self.recent.push_back(entry);
                }
            }
            None => {
                let bitmap = self.load(index)?;
                if self.recent.len() == VISIBLE_SLOTS {
                    self.recent.pop_front();
                }
                self.recent.push_back((index, bitmap));
            }
        }
        match self.recent.back() {
            Some((_, bitmap)) => Ok(bitmap),
            None => Err(ImageError::Missing(index)),
        }
    }
}
