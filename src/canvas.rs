//! Drawing surface for the 128x64 monochrome display.
//!
//! All coordinates are screen pixels and may lie partly or wholly off
//! screen; drawing is clipped. Text is anchored at its baseline, like the
//! device font it stands in for. Shapes and text go through
//! `embedded-graphics`, with [`Framebuffer`] as its draw target.

use std::convert::Infallible;

use embedded_graphics::{
    mono_font::{iso_8859_1::FONT_4X6, MonoFont, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Circle, PrimitiveStyle, PrimitiveStyleBuilder, Rectangle, StrokeAlignment},
    text::{renderer::TextRenderer, Baseline, Text},
};

use crate::bitmap::Bitmap;
use crate::geometry::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Display font. Latin-1 so accented star names survive.
pub const FONT: MonoFont<'static> = FONT_4X6;

/// Pen colour. Black sets ink, white clears it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Black,
    White,
}

impl From<Color> for BinaryColor {
    fn from(color: Color) -> Self {
        match color {
            Color::Black => BinaryColor::On,
            Color::White => BinaryColor::Off,
        }
    }
}

/// Primitive draw requests issued by the renderer.
pub trait Surface {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    /// Fill everything with white.
    fn clear(&mut self);
    fn set_color(&mut self, color: Color);
    fn draw_dot(&mut self, x: i32, y: i32);
    /// Filled rectangle.
    fn draw_box(&mut self, x: i32, y: i32, w: usize, h: usize);
    /// Rectangle outline.
    fn draw_frame(&mut self, x: i32, y: i32, w: usize, h: usize);
    /// Circle outline centred on (cx, cy).
    fn draw_circle(&mut self, cx: i32, cy: i32, r: usize);
    /// Text whose baseline is at `y`.
    fn draw_str(&mut self, x: i32, y: i32, text: &str);
    fn string_width(&self, text: &str) -> usize;
    /// Paint the ink pixels of `bitmap` with the current colour.
    fn draw_bitmap(&mut self, x: i32, y: i32, bitmap: &Bitmap);
}

/// In-memory 1-bit display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<bool>,
    color: Color,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Framebuffer::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Framebuffer {
            width,
            height,
            pixels: vec![false; width * height],
            color: Color::Black,
        }
    }

    /// True if the pixel is ink. Off-screen reads are blank.
    pub fn get(&self, x: i32, y: i32) -> bool {
        self.index(x, y).map(|idx| self.pixels[idx]).unwrap_or(false)
    }

    pub fn ink_count(&self) -> usize {
        self.pixels.iter().filter(|&&p| p).count()
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    fn pen(&self) -> BinaryColor {
        self.color.into()
    }

    fn paint<D>(&mut self, item: &D)
    where
        D: Drawable<Color = BinaryColor>,
    {
        // Infallible target
        let _ = item.draw(self);
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let Some(idx) = self.index(point.x, point.y) {
                self.pixels[idx] = color.is_on();
            }
        }
        Ok(())
    }
}

fn rect(x: i32, y: i32, w: usize, h: usize) -> Rectangle {
    Rectangle::new(Point::new(x, y), Size::new(w as u32, h as u32))
}

impl Surface for Framebuffer {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn clear(&mut self) {
        self.pixels.fill(false);
        self.color = Color::Black;
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn draw_dot(&mut self, x: i32, y: i32) {
        let pixel = Pixel(Point::new(x, y), self.pen());
        self.paint(&pixel);
    }

    fn draw_box(&mut self, x: i32, y: i32, w: usize, h: usize) {
        let styled = rect(x, y, w, h).into_styled(PrimitiveStyle::with_fill(self.pen()));
        self.paint(&styled);
    }

    fn draw_frame(&mut self, x: i32, y: i32, w: usize, h: usize) {
        let style = PrimitiveStyleBuilder::new()
            .stroke_color(self.pen())
            .stroke_width(1)
            .stroke_alignment(StrokeAlignment::Inside)
            .build();
        let styled = rect(x, y, w, h).into_styled(style);
        self.paint(&styled);
    }

    fn draw_circle(&mut self, cx: i32, cy: i32, r: usize) {
        let diameter = 2 * r as u32 + 1;
        let styled = Circle::with_center(Point::new(cx, cy), diameter)
            .into_styled(PrimitiveStyle::with_stroke(self.pen(), 1));
        self.paint(&styled);
    }

    fn draw_str(&mut self, x: i32, y: i32, text: &str) {
        let style = MonoTextStyle::new(&FONT, self.pen());
        let text = Text::with_baseline(text, Point::new(x, y), style, Baseline::Alphabetic);
        self.paint(&text);
    }

    fn string_width(&self, text: &str) -> usize {
        let style = MonoTextStyle::new(&FONT, BinaryColor::On);
        style
            .measure_string(text, Point::zero(), Baseline::Alphabetic)
            .bounding_box
            .size
            .width as usize
    }

    fn draw_bitmap(&mut self, x: i32, y: i32, bitmap: &Bitmap) {
        let color = self.pen();
        let ink = (0..bitmap.height()).flat_map(|by| {
            (0..bitmap.width())
                .filter(move |&bx| bitmap.get(bx, by))
                .map(move |bx| Pixel(Point::new(x + bx as i32, y + by as i32), color))
        });
        let _ = self.draw_iter(ink);
    }
}
