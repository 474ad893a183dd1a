//! Tile layout table: which image file belongs to which grid cell.
//!
//! Source format is `row,col,filename`. Cells without an entry fall back to
//! `tile_<row>_<col>.png`.

use tracing::debug;

use crate::geometry::MapGeometry;
use crate::records::Record;

#[derive(Clone, Debug)]
pub struct TileLayout {
    geometry: MapGeometry,
    filenames: Vec<Option<String>>,
}

impl TileLayout {
    /// Layout with no explicit entries.
    pub fn new(geometry: MapGeometry) -> Self {
        TileLayout {
            geometry,
            filenames: vec![None; geometry.tile_count()],
        }
    }

    /// Add entries from records; returns how many were accepted.
    ///
    /// Records with fewer than three fields, unparsable or out-of-grid
    /// coordinates, or an empty file name are skipped. The first entry for a
    /// cell wins.
    pub fn load<I>(&mut self, records: I) -> usize
    where
        I: IntoIterator<Item = Record>,
    {
        let mut accepted = 0;
        for record in records {
            match self.parse_entry(&record) {
                Some((idx, name)) => {
                    if self.filenames[idx].is_some() {
                        debug!(line = record.line, tile = idx, "duplicate tile entry ignored");
                        continue;
                    }
                    self.filenames[idx] = Some(name);
                    accepted += 1;
                }
                None => debug!(line = record.line, "skipping malformed tile entry"),
            }
        }
        accepted
    }

    fn parse_entry(&self, record: &Record) -> Option<(usize, String)> {
        if record.len() < 3 {
            return None;
        }
        let row = usize::try_from(record.int(0)?).ok()?;
        let col = usize::try_from(record.int(1)?).ok()?;
        if row >= self.geometry.rows || col >= self.geometry.cols {
            return None;
        }
        let name = record.field(2)?;
        if name.is_empty() {
            return None;
        }
        Some((self.geometry.tile_index(row, col), name.to_string()))
    }

    /// Number of explicit entries.
    pub fn len(&self) -> usize {
        self.filenames.iter().filter(|f| f.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Image file name for a tile, explicit or default.
    pub fn filename(&self, index: usize) -> String {
        match self.filenames.get(index) {
            Some(Some(name)) => name.clone(),
            _ => self.default_name(index),
        }
    }

    fn default_name(&self, index: usize) -> String {
        let (row, col) = self.geometry.row_col_of(index);
        format!("tile_{}_{}.png", row, col)
    }

    /// Tile index whose file name is `name`.
    ///
    /// Explicit entries win over default names, so a layout may give a cell
    /// a name that would otherwise be the default of another cell.
    pub fn resolve(&self, name: &str) -> Option<usize> {
        self.filenames
            .iter()
            .position(|f| f.as_deref() == Some(name))
            .or_else(|| {
                (0..self.filenames.len()).find(|&idx| self.filenames[idx].is_none() && self.default_name(idx) == name)
            })
    }

    pub fn geometry(&self) -> &MapGeometry {
        &self.geometry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::parse_records;

    #[test]
    fn test_default_names() {
        let layout = TileLayout::new(MapGeometry::default());
        assert!(layout.is_empty());
        assert_eq!(layout.filename(27), "tile_5_2.png");
        assert_eq!(layout.resolve("tile_5_2.png"), Some(27));
        assert_eq!(layout.resolve("tile_10_0.png"), None);
    }

    #[test]
    fn test_load_entries() {
        let mut layout = TileLayout::new(MapGeometry::default());
        let records = parse_records(
            "row,col,filename\n\
             4,2,north.png\n\
             4,2,shadowed.png\n\
             10,0,off_grid.png\n\
             -1,0,negative.png\n\
             1,1\n\
             0,1,\"a, b.png\"\n",
        );
        assert_eq!(layout.load(records), 2);
        assert_eq!(layout.len(), 2);
        assert_eq!(layout.filename(22), "north.png");
        assert_eq!(layout.resolve("north.png"), Some(22));
        assert_eq!(layout.filename(1), "a, b.png");
        // Overridden cells no longer answer to their default name
        assert_eq!(layout.resolve("tile_4_2.png"), None);
    }

    #[test]
    fn test_listed_name_beats_default_of_unlisted_cell() {
        let mut layout = TileLayout::new(MapGeometry::default());
        layout.load(parse_records("row,col,filename\n5,2,tile_4_2.png\n"));
        assert_eq!(layout.resolve("tile_4_2.png"), Some(27));
        // Cell (5,2) is taken, its own default name no longer resolves
        assert_eq!(layout.resolve("tile_5_2.png"), None);
        // Untouched cells still answer to their defaults
        assert_eq!(layout.resolve("tile_0_1.png"), Some(1));
    }
}
