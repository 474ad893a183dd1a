//! Scripted frontend with no display.
//!
//! A script is a string of key letters: `U D L R` pan, `O` confirms, `B`
//! cancels. Whitespace is ignored. Events are fed through the bounded input
//! queue by a producer thread, exactly as a live input source would.

use std::thread;
use std::time::Duration;

use thiserror::Error;

use crate::app::{input_queue, AppState, Frontend, InputEvent, InputQueue, Key, Poll, QUEUE_CAPACITY};
use crate::canvas::Framebuffer;
use crate::error::FrontendError;
use crate::export::FrameRecord;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("unknown script key {ch:?} at position {pos}")]
    UnknownKey { ch: char, pos: usize },
}

/// Parse a key script into press events.
pub fn parse_script(script: &str) -> Result<Vec<InputEvent>, ScriptError> {
    script
        .chars()
        .enumerate()
        .filter(|(_, ch)| !ch.is_whitespace())
        .map(|(pos, ch)| {
            let key = match ch.to_ascii_uppercase() {
                'U' => Key::Up,
                'D' => Key::Down,
                'L' => Key::Left,
                'R' => Key::Right,
                'O' => Key::Confirm,
                'B' => Key::Cancel,
                _ => return Err(ScriptError::UnknownKey { ch, pos }),
            };
            Ok(InputEvent::press(key))
        })
        .collect()
}

pub struct HeadlessFrontend {
    queue: InputQueue,
    frames: Vec<FrameRecord>,
}

impl HeadlessFrontend {
    pub fn new(events: Vec<InputEvent>) -> Self {
        let (sender, queue) = input_queue(QUEUE_CAPACITY);
        thread::spawn(move || {
            for event in events {
                if !sender.send(event) {
                    break;
                }
            }
        });
        HeadlessFrontend { queue, frames: Vec::new() }
    }

    /// One record per presented frame, in order.
    pub fn into_frames(self) -> Vec<FrameRecord> {
        self.frames
    }
}

impl Frontend for HeadlessFrontend {
    /// Blocks until the script produces an event or ends; never idles, so
    /// the recorded frames do not depend on timing.
    fn next_event(&mut self, timeout: Duration) -> Result<Poll, FrontendError> {
        loop {
            match self.queue.recv_timeout(timeout) {
                Poll::Idle => continue,
                other => return Ok(other),
            }
        }
    }

    fn present(&mut self, _frame: &Framebuffer, state: &AppState) -> Result<(), FrontendError> {
        self.frames.push(FrameRecord::capture(state));
        Ok(())
    }
}
