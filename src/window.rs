//! Desktop window frontend using minifb.
//!
//! The window shows the framebuffer scaled up by an integer factor. Input is
//! polled on the calling thread, so key events go into a local FIFO rather
//! than the threaded queue.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use minifb::{KeyRepeat, Window, WindowOptions};

use crate::app::{AppState, Frontend, InputEvent, InputKind, Key, Poll};
use crate::canvas::{Framebuffer, Surface};
use crate::error::FrontendError;

/// 0RGB colours for the backlight and for ink.
const BACKLIGHT: u32 = (255 << 16) | (140 << 8) | 41;
const INK: u32 = (20 << 16) | (20 << 8) | 20;

fn map_key(key: minifb::Key) -> Option<Key> {
    use minifb::Key as K;
    match key {
        K::Up | K::W | K::K => Some(Key::Up),
        K::Down | K::S | K::J => Some(Key::Down),
        K::Left | K::A | K::H => Some(Key::Left),
        K::Right | K::D | K::L => Some(Key::Right),
        K::Enter | K::Space => Some(Key::Confirm),
        K::Escape | K::Backspace | K::Q => Some(Key::Cancel),
        _ => None,
    }
}

/// Scale the framebuffer into a 0RGB pixel buffer.
pub fn scale_frame(frame: &Framebuffer, scale: usize) -> Vec<u32> {
    let scale = scale.max(1);
    let out_width = frame.width() * scale;
    let out_height = frame.height() * scale;
    let mut buffer = vec![BACKLIGHT; out_width * out_height];

    for oy in 0..out_height {
        for ox in 0..out_width {
            if frame.get((ox / scale) as i32, (oy / scale) as i32) {
                buffer[oy * out_width + ox] = INK;
            }
        }
    }

    buffer
}

/// Turns per-frame key snapshots into press, repeat and release events.
#[derive(Debug, Default)]
struct KeyTracker {
    held: Vec<minifb::Key>,
}

impl KeyTracker {
    /// `pressed` includes OS key repeats; `down` is every key held now.
    fn update(&mut self, pressed: &[minifb::Key], released: &[minifb::Key], down: Vec<minifb::Key>) -> Vec<InputEvent> {
        let mut events = Vec::new();
        for &key in pressed {
            let kind = if self.held.contains(&key) { InputKind::Repeat } else { InputKind::Press };
            if let Some(key) = map_key(key) {
                events.push(InputEvent { kind, key });
            }
        }
        for &key in released {
            if let Some(key) = map_key(key) {
                events.push(InputEvent::release(key));
            }
        }
        self.held = down;
        events
    }
}

pub struct WindowFrontend {
    window: Window,
    scale: usize,
    /// Last presented pixels; input is pumped by re-submitting them
    buffer: Vec<u32>,
    buffer_width: usize,
    buffer_height: usize,
    pending: VecDeque<InputEvent>,
    keys: KeyTracker,
}

impl WindowFrontend {
    pub fn new(width: usize, height: usize, scale: usize) -> Result<Self, FrontendError> {
        let scale = scale.max(1);
        let buffer_width = width * scale;
        let buffer_height = height * scale;
        let mut window = Window::new(
            "Star Map - Arrows: Pan, Enter: Select, Esc: Exit",
            buffer_width,
            buffer_height,
            WindowOptions {
                resize: false,
                scale: minifb::Scale::X1,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| FrontendError::Window(e.to_string()))?;

        // Limit to ~60fps
        window.set_target_fps(60);

        Ok(WindowFrontend {
            window,
            scale,
            buffer: vec![BACKLIGHT; buffer_width * buffer_height],
            buffer_width,
            buffer_height,
            pending: VecDeque::new(),
            keys: KeyTracker::default(),
        })
    }

    /// Push the current buffer to the window. This is also what pumps window
    /// events, so keys are collected right after every call.
    fn refresh(&mut self) -> Result<(), FrontendError> {
        self.window
            .update_with_buffer(&self.buffer, self.buffer_width, self.buffer_height)
            .map_err(|e| FrontendError::Window(e.to_string()))?;

        let pressed = self.window.get_keys_pressed(KeyRepeat::Yes);
        let released = self.window.get_keys_released();
        let events = self.keys.update(&pressed, &released, self.window.get_keys());
        self.pending.extend(events);
        Ok(())
    }
}

impl Frontend for WindowFrontend {
    fn next_event(&mut self, timeout: Duration) -> Result<Poll, FrontendError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(Poll::Event(event));
            }
            if !self.window.is_open() {
                return Ok(Poll::Closed);
            }
            if Instant::now() >= deadline {
                return Ok(Poll::Idle);
            }
            // Paced by the target fps
            self.refresh()?;
        }
    }

    fn present(&mut self, frame: &Framebuffer, _state: &AppState) -> Result<(), FrontendError> {
        self.buffer = scale_frame(frame, self.scale);
        self.buffer_width = frame.width() * self.scale;
        self.buffer_height = frame.height() * self.scale;
        self.refresh()
    }
}
