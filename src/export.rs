use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};
use serde::Serialize;

use crate::app::AppState;
use crate::canvas::{Framebuffer, Surface};

/// Backlight colour used for blank pixels in exported frames.
const BACKLIGHT: [u8; 3] = [255, 140, 41];
/// Ink colour.
const INK: [u8; 3] = [20, 20, 20];

/// Camera and selection at one presented frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameRecord {
    pub camera_x: f32,
    pub camera_y: f32,
    pub selection: Option<String>,
}

impl FrameRecord {
    pub fn capture(state: &AppState) -> Self {
        let (camera_x, camera_y) = state.camera().position();
        FrameRecord {
            camera_x,
            camera_y,
            selection: state.selection().label().map(String::from),
        }
    }
}

/// Summary of a headless run.
#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub annotations_loaded: usize,
    pub tiles_in_layout: usize,
    #[serde(rename = "final")]
    pub final_frame: FrameRecord,
    pub frames: Vec<FrameRecord>,
}

/// Export a frame as a PNG, each display pixel scaled to a square block.
pub fn export_frame(frame: &Framebuffer, scale: usize, path: &Path) -> Result<(), image::ImageError> {
    let scale = scale.max(1);
    let width = frame.width() * scale;
    let height = frame.height() * scale;
    let mut img: RgbImage = ImageBuffer::new(width as u32, height as u32);

    for y in 0..height {
        for x in 0..width {
            let ink = frame.get((x / scale) as i32, (y / scale) as i32);
            img.put_pixel(x as u32, y as u32, Rgb(if ink { INK } else { BACKLIGHT }));
        }
    }

    img.save(path)
}

/// Write the report as pretty JSON.
pub fn export_report(report: &Report, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report).map_err(io::Error::from)?;
    writer.flush()
}
