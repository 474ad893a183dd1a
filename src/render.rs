//! Viewport rendering: visible tiles, cursor and selection label.

use crate::bitmap::ImageSource;
use crate::camera::Camera;
use crate::canvas::{Color, Surface};
use crate::selection::{Selection, CURSOR_RADIUS};

/// Height of the selection label box.
const LABEL_BOX_HEIGHT: usize = 10;
/// Text inset inside the label box and fallback tiles.
const TEXT_INSET_X: i32 = 2;
const TEXT_BASELINE: i32 = 8;
/// Confirmation glyph drawn while something is selected.
pub const CONFIRM_GLYPH: &str = "OK";

/// Draw one frame.
pub fn render<S, I>(camera: &Camera, selection: &Selection, images: &mut I, surface: &mut S)
where
    S: Surface + ?Sized,
    I: ImageSource + ?Sized,
{
    surface.clear();
    surface.set_color(Color::Black);

    let geo = *camera.geometry();
    let (offset_x, offset_y) = camera.screen_offset();

    for (row, col) in camera.visible_tile_range().cells() {
        let index = geo.tile_index(row, col);
        let (world_x, world_y) = geo.tile_origin(index);
        let screen_x = (world_x - offset_x) as i32;
        let screen_y = (world_y - offset_y) as i32;

        match images.tile_image(index) {
            Ok(bitmap) => surface.draw_bitmap(screen_x, screen_y, bitmap),
            Err(_) => {
                surface.draw_frame(screen_x, screen_y, geo.tile_width, geo.tile_height);
                surface.draw_str(screen_x + TEXT_INSET_X, screen_y + TEXT_BASELINE, &tile_label(index));
            }
        }
    }

    let center_x = (surface.width() / 2) as i32;
    let center_y = (surface.height() / 2) as i32;
    surface.draw_circle(center_x, center_y, CURSOR_RADIUS);

    if let Some(label) = selection.label() {
        let text_width = surface.string_width(label);
        surface.draw_box(0, 0, text_width + 4, LABEL_BOX_HEIGHT);

        surface.set_color(Color::White);
        surface.draw_str(TEXT_INSET_X, TEXT_BASELINE, label);

        surface.set_color(Color::Black);
        let glyph_x = surface.width() as i32 - 18;
        let glyph_y = surface.height() as i32 - 2;
        surface.draw_str(glyph_x, glyph_y, CONFIRM_GLYPH);
    }
}

/// Text drawn on tiles without an image.
pub fn tile_label(index: usize) -> String {
    format!("#{}", index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::{Bitmap, NoImages};
    use crate::canvas::Framebuffer;
    use crate::error::ImageError;
    use crate::geometry::MapGeometry;

    /// Records every call so tests can check the draw order.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl Surface for Recorder {
        fn width(&self) -> usize {
            128
        }
        fn height(&self) -> usize {
            64
        }
        fn clear(&mut self) {
            self.calls.push("clear".into());
        }
        fn set_color(&mut self, color: Color) {
            self.calls.push(format!("color {:?}", color));
        }
        fn draw_dot(&mut self, x: i32, y: i32) {
            self.calls.push(format!("dot {} {}", x, y));
        }
        fn draw_box(&mut self, x: i32, y: i32, w: usize, h: usize) {
            self.calls.push(format!("box {} {} {} {}", x, y, w, h));
        }
        fn draw_frame(&mut self, x: i32, y: i32, w: usize, h: usize) {
            self.calls.push(format!("frame {} {} {} {}", x, y, w, h));
        }
        fn draw_circle(&mut self, cx: i32, cy: i32, r: usize) {
            self.calls.push(format!("circle {} {} {}", cx, cy, r));
        }
        fn draw_str(&mut self, x: i32, y: i32, text: &str) {
            self.calls.push(format!("str {} {} {}", x, y, text));
        }
        fn string_width(&self, text: &str) -> usize {
            text.len() * 5
        }
        fn draw_bitmap(&mut self, x: i32, y: i32, bitmap: &Bitmap) {
            self.calls.push(format!("bitmap {} {} {}x{}", x, y, bitmap.width(), bitmap.height()));
        }
    }

    /// Only tile 27 has an image.
    struct OneImage(Bitmap);

    impl ImageSource for OneImage {
        fn tile_image(&mut self, index: usize) -> Result<&Bitmap, ImageError> {
            if index == 27 {
                Ok(&self.0)
            } else {
                Err(ImageError::Missing(index))
            }
        }
    }

    #[test]
    fn test_fallback_tiles_cursor_no_label() {
        let camera = Camera::centered(MapGeometry::default());
        let mut surface = Recorder::default();
        render(&camera, &Selection::none(), &mut NoImages, &mut surface);

        assert_eq!(
            surface.calls,
            vec![
                "clear",
                "color Black",
                // Row 4 starts at y = 256, 32 px above the screen
                "frame 0 -32 128 64",
                "str 2 -24 #22",
                "frame 0 32 128 64",
                "str 2 40 #27",
                "circle 64 32 4",
            ]
        );
    }

    #[test]
    fn test_image_and_label() {
        let camera = Camera::centered(MapGeometry::default());
        let mut images = OneImage(Bitmap::new(128, 64));
        let mut surface = Recorder::default();
        render(&camera, &Selection::with_label("Polaris"), &mut images, &mut surface);

        assert!(surface.calls.contains(&"bitmap 0 32 128x64".to_string()));
        assert!(surface.calls.contains(&"frame 0 -32 128 64".to_string()));
        let tail: Vec<&str> = surface.calls.iter().rev().take(6).rev().map(|s| s.as_str()).collect();
        assert_eq!(
            tail,
            vec![
                "circle 64 32 4",
                "box 0 0 39 10",
                "color White",
                "str 2 8 Polaris",
                "color Black",
                "str 110 62 OK",
            ]
        );
    }

    #[test]
    fn test_straddling_camera_draws_four_tiles() {
        let camera = Camera::new(MapGeometry::default(), 100.0, 30.0);
        let mut surface = Recorder::default();
        render(&camera, &Selection::none(), &mut NoImages, &mut surface);
        let frames: Vec<&String> = surface.calls.iter().filter(|c| c.starts_with("frame")).collect();
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0], "frame -100 -30 128 64");
        assert_eq!(frames[3], "frame 28 34 128 64");
    }

    #[test]
    fn test_framebuffer_label_is_inverse() {
        let camera = Camera::centered(MapGeometry::default());
        let mut fb = Framebuffer::default();
        render(&camera, &Selection::with_label("I"), &mut NoImages, &mut fb);

        // Box is ink and as wide as the text plus 4; the glyph inside it is cleared
        let box_width = fb.string_width("I") as i32 + 4;
        assert!(fb.get(0, 0));
        assert!(fb.get(box_width - 1, 9));
        assert!(!fb.get(box_width, 0));
        let cleared = (2..box_width - 2)
            .flat_map(|x| (1..10).map(move |y| (x, y)))
            .filter(|&(x, y)| !fb.get(x, y))
            .count();
        assert!(cleared > 0);
        // Cursor ring; y = 32 is also the top edge of tile 27, so check below it
        assert!(fb.get(67, 34) && fb.get(61, 34));
        assert!(!fb.get(64, 34));
    }
}
