//! Points of interest anchored to tile-local coordinates.

use tracing::debug;

use crate::geometry::MapGeometry;
use crate::layout::TileLayout;
use crate::records::Record;

/// Maximum number of annotations held.
pub const MAX_ANNOTATIONS: usize = 200;

/// Maximum label length in characters.
pub const MAX_LABEL_CHARS: usize = 63;

/// A named point on one tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotation {
    pub tile_index: usize,
    pub local_x: usize,
    pub local_y: usize,
    pub label: String,
}

/// Annotations in load order.
#[derive(Clone, Debug)]
pub struct AnnotationStore {
    geometry: MapGeometry,
    annotations: Vec<Annotation>,
    capacity: usize,
}

impl AnnotationStore {
    pub fn new(geometry: MapGeometry) -> Self {
        Self::with_capacity(geometry, MAX_ANNOTATIONS)
    }

    pub fn with_capacity(geometry: MapGeometry, capacity: usize) -> Self {
        AnnotationStore {
            geometry,
            annotations: Vec::new(),
            capacity,
        }
    }

    /// Load `tile,x,y,label` records where `tile` is a numeric tile index.
    /// Returns the number accepted by this call.
    pub fn load<I>(&mut self, records: I) -> usize
    where
        I: IntoIterator<Item = Record>,
    {
        self.load_inner(records, None)
    }

    /// Like [`AnnotationStore::load`], but `tile` may also be a tile image
    /// file name resolved through `layout`.
    pub fn load_with_layout<I>(&mut self, records: I, layout: &TileLayout) -> usize
    where
        I: IntoIterator<Item = Record>,
    {
        self.load_inner(records, Some(layout))
    }

    fn load_inner<I>(&mut self, records: I, layout: Option<&TileLayout>) -> usize
    where
        I: IntoIterator<Item = Record>,
    {
        let mut accepted = 0;
        for record in records {
            if self.annotations.len() >= self.capacity {
                debug!(capacity = self.capacity, "annotation capacity reached, ignoring the rest");
                break;
            }
            match self.parse(&record, layout) {
                Some(annotation) => {
                    self.annotations.push(annotation);
                    accepted += 1;
                }
                None => debug!(line = record.line, "skipping malformed annotation"),
            }
        }
        accepted
    }

    fn parse(&self, record: &Record, layout: Option<&TileLayout>) -> Option<Annotation> {
        if record.len() < 4 {
            return None;
        }

        let tile_index = match record.int(0) {
            Some(idx) => usize::try_from(idx).ok()?,
            None => layout?.resolve(record.field(0)?)?,
        };
        if tile_index >= self.geometry.tile_count() {
            return None;
        }

        let x = record.int(1)?;
        let y = record.int(2)?;
        if !self.geometry.contains_local(x, y) {
            return None;
        }

        let label: String = record.field(3)?.chars().take(MAX_LABEL_CHARS).collect();

        Some(Annotation {
            tile_index,
            local_x: x as usize,
            local_y: y as usize,
            label,
        })
    }

    /// First annotation on `tile_index` (in load order) within `radius` of the
    /// local point. The bound is inclusive.
    pub fn find_at(&self, tile_index: usize, local_x: usize, local_y: usize, radius: usize) -> Option<&Annotation> {
        let r = i64::try_from(radius).unwrap_or(i64::MAX);
        let r_sq = r.saturating_mul(r);
        self.on_tile(tile_index).find(|ann| {
            let dx = local_x as i64 - ann.local_x as i64;
            let dy = local_y as i64 - ann.local_y as i64;
            dx * dx + dy * dy <= r_sq
        })
    }

    /// All annotations on one tile, in load order.
    pub fn on_tile(&self, tile_index: usize) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter().filter(move |ann| ann.tile_index == tile_index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::parse_records;

    fn store_from(text: &str) -> (AnnotationStore, usize) {
        let mut store = AnnotationStore::new(MapGeometry::default());
        let count = store.load(parse_records(text));
        (store, count)
    }

    #[test]
    fn test_load_single_record() {
        let (store, count) = store_from("tile,x,y,label\n12,64,32,Polaris\n");
        assert_eq!(count, 1);
        let ann = store.iter().next().unwrap();
        assert_eq!(ann.tile_index, 12);
        assert_eq!((ann.local_x, ann.local_y), (64, 32));
        assert_eq!(ann.label, "Polaris");
    }

    #[test]
    fn test_out_of_range_records_skipped() {
        let (store, count) = store_from(
            "tile,x,y,label\n\
             50,1,1,OffGrid\n\
             3,128,1,TooFarRight\n\
             3,1,64,TooLow\n\
             -2,1,1,Negative\n\
             3,x,1,NotANumber\n\
             3,1,1\n\
             3,5,6,Vega\n",
        );
        assert_eq!(count, 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.iter().next().unwrap().label, "Vega");
    }

    #[test]
    fn test_capacity_limit() {
        let mut text = String::from("tile,x,y,label\n");
        for i in 0..10 {
            text.push_str(&format!("0,{},0,Star{}\n", i, i));
        }
        let mut store = AnnotationStore::with_capacity(MapGeometry::default(), 4);
        assert_eq!(store.load(parse_records(&text)), 4);
        assert_eq!(store.load(parse_records(&text)), 0);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_label_truncated() {
        let long = "x".repeat(100);
        let (store, _) = store_from(&format!("h\n0,0,0,{}\n", long));
        assert_eq!(store.iter().next().unwrap().label.chars().count(), MAX_LABEL_CHARS);
    }

    #[test]
    fn test_resolve_by_filename() {
        let geo = MapGeometry::default();
        let layout = TileLayout::new(geo);
        let mut store = AnnotationStore::new(geo);
        let records = parse_records(
            "tile_name,x,y,annotation\n\
             tile_4_2.png,64,32,\"Polaris (alpha UMi)\"\n\
             missing.png,1,1,Nowhere\n",
        );
        assert_eq!(store.load_with_layout(records.clone(), &layout), 1);
        let ann = store.iter().next().unwrap();
        assert_eq!(ann.tile_index, 22);
        assert_eq!(ann.label, "Polaris (alpha UMi)");

        // Without a layout, names are not numbers and are skipped
        let mut plain = AnnotationStore::new(geo);
        assert_eq!(plain.load(records), 0);
    }

    #[test]
    fn test_name_resolves_through_partial_layout() {
        let geo = MapGeometry::default();
        let mut layout = TileLayout::new(geo);
        layout.load(parse_records("row,col,filename\n5,2,tile_4_2.png\n"));
        let mut store = AnnotationStore::new(geo);
        store.load_with_layout(parse_records("h\ntile_4_2.png,64,4,Polaris\n"), &layout);
        assert_eq!(store.iter().next().map(|a| a.tile_index), Some(27));
    }

    #[test]
    fn test_find_at_inclusive_radius() {
        let (store, _) = store_from("h\n27,64,4,Polaris\n");
        // distance exactly 4
        assert_eq!(store.find_at(27, 64, 0, 4).map(|a| a.label.as_str()), Some("Polaris"));
        // distance sqrt(17) > 4
        assert!(store.find_at(27, 65, 0, 4).is_none());
        // (3, 3) off: 18 > 16
        assert!(store.find_at(27, 67, 7, 4).is_none());
        // wrong tile
        assert!(store.find_at(26, 64, 4, 4).is_none());
    }

    #[test]
    fn test_find_at_huge_radius_saturates() {
        let (store, _) = store_from("h\n27,127,63,Corner\n");
        assert_eq!(store.find_at(27, 0, 0, usize::MAX).map(|a| a.label.as_str()), Some("Corner"));
        assert!(store.find_at(27, 0, 0, 1 << 40).is_some());
    }

    #[test]
    fn test_find_at_first_match_wins() {
        let (store, _) = store_from("h\n5,10,10,Far\n5,12,12,Near\n");
        // Both are within radius 4 of (12, 12); the first loaded is returned
        let found = store.find_at(5, 12, 12, 4).unwrap();
        assert_eq!(found.label, "Far");
    }
}
