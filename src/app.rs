//! Application state, input handling and the event loop.
//!
//! `AppState::handle` is the whole reaction to an input event; the loop in
//! [`run`] only moves events from a [`Frontend`] into it and frames back out.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::time::Duration;

use tracing::{debug, info};

use crate::annotations::AnnotationStore;
use crate::bitmap::ImageSource;
use crate::camera::Camera;
use crate::canvas::{Framebuffer, Surface};
use crate::error::FrontendError;
use crate::geometry::MapGeometry;
use crate::render;
use crate::selection::{self, Selection};

/// Pixels moved per directional event.
pub const DEFAULT_STEP: f32 = 4.0;
/// Idle wait between input polls.
pub const DEFAULT_POLL: Duration = Duration::from_millis(100);
/// Input queue depth.
pub const QUEUE_CAPACITY: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    Press,
    Repeat,
    Release,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Confirm,
    Cancel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputEvent {
    pub kind: InputKind,
    pub key: Key,
}

impl InputEvent {
    pub fn press(key: Key) -> Self {
        InputEvent { kind: InputKind::Press, key }
    }

    pub fn repeat(key: Key) -> Self {
        InputEvent { kind: InputKind::Repeat, key }
    }

    pub fn release(key: Key) -> Self {
        InputEvent { kind: InputKind::Release, key }
    }
}

/// What the loop should do after an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// State may have changed; draw a new frame
    Redraw,
    /// Event had no effect
    Ignored,
    /// Leave the loop
    Exit,
}

/// Everything the viewer knows, owned in one place.
#[derive(Clone, Debug)]
pub struct AppState {
    camera: Camera,
    annotations: AnnotationStore,
    selection: Selection,
    step: f32,
}

impl AppState {
    /// Camera at map centre, selection evaluated once.
    pub fn new(geometry: MapGeometry, annotations: AnnotationStore, step: f32) -> Self {
        let camera = Camera::centered(geometry);
        let selection = selection::evaluate(&camera, &annotations);
        AppState { camera, annotations, selection, step }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn annotations(&self) -> &AnnotationStore {
        &self.annotations
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Apply one input event.
    pub fn handle(&mut self, event: InputEvent) -> Transition {
        if event.kind == InputKind::Release {
            return Transition::Ignored;
        }

        let step = self.step;
        match event.key {
            Key::Up => self.camera.pan(0.0, -step),
            Key::Down => self.camera.pan(0.0, step),
            Key::Left => self.camera.pan(-step, 0.0),
            Key::Right => self.camera.pan(step, 0.0),
            Key::Confirm => {
                if let Some(label) = self.selection.label() {
                    info!("Selected: {}", label);
                }
            }
            Key::Cancel => {
                debug!("cancel pressed, exiting");
                return Transition::Exit;
            }
        }

        self.selection = selection::evaluate(&self.camera, &self.annotations);
        Transition::Redraw
    }

    /// Draw the current state onto `surface`.
    pub fn render<I, S>(&self, images: &mut I, surface: &mut S)
    where
        I: ImageSource + ?Sized,
        S: Surface + ?Sized,
    {
        render::render(&self.camera, &self.selection, images, surface);
    }
}

/// Result of waiting for input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Poll {
    Event(InputEvent),
    /// Timed out with nothing to do
    Idle,
    /// No more input will ever arrive
    Closed,
}

/// Producer half of the input queue. Sending blocks while the queue is full.
#[derive(Clone, Debug)]
pub struct InputSender {
    tx: SyncSender<InputEvent>,
}

impl InputSender {
    /// Queue an event; false once the consumer is gone.
    pub fn send(&self, event: InputEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Consumer half of the input queue. Events come out in FIFO order.
#[derive(Debug)]
pub struct InputQueue {
    rx: Receiver<InputEvent>,
}

impl InputQueue {
    pub fn recv_timeout(&self, timeout: Duration) -> Poll {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Poll::Event(event),
            Err(RecvTimeoutError::Timeout) => Poll::Idle,
            Err(RecvTimeoutError::Disconnected) => Poll::Closed,
        }
    }
}

/// Bounded input queue.
pub fn input_queue(capacity: usize) -> (InputSender, InputQueue) {
    let (tx, rx) = mpsc::sync_channel(capacity);
    (InputSender { tx }, InputQueue { rx })
}

/// A place that delivers input and shows frames.
pub trait Frontend {
    /// Wait up to `timeout` for the next input event.
    fn next_event(&mut self, timeout: Duration) -> Result<Poll, FrontendError>;

    /// Show a finished frame.
    fn present(&mut self, frame: &Framebuffer, state: &AppState) -> Result<(), FrontendError>;
}

/// Drive the viewer until cancel or until input closes. Returns the last frame.
pub fn run<F, I>(state: &mut AppState, images: &mut I, frontend: &mut F, poll: Duration) -> Result<Framebuffer, FrontendError>
where
    F: Frontend + ?Sized,
    I: ImageSource + ?Sized,
{
    let geo = *state.camera().geometry();
    let mut frame = Framebuffer::new(geo.screen_width, geo.screen_height);

    state.render(images, &mut frame);
    frontend.present(&frame, state)?;

    loop {
        match frontend.next_event(poll)? {
            Poll::Event(event) => match state.handle(event) {
                Transition::Redraw => {
                    state.render(images, &mut frame);
                    frontend.present(&frame, state)?;
                }
                Transition::Ignored => {}
                Transition::Exit => break,
            },
            // Housekeeping only: show the same frame again
            Poll::Idle => frontend.present(&frame, state)?,
            Poll::Closed => {
                info!("input closed");
                break;
            }
        }
    }

    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::NoImages;
    use crate::records::parse_records;

    fn state_with(text: &str) -> AppState {
        let geo = MapGeometry::default();
        let mut store = AnnotationStore::new(geo);
        store.load(parse_records(text));
        AppState::new(geo, store, DEFAULT_STEP)
    }

    /// Frontend fed from a list; records the selection seen at each frame.
    struct Scripted {
        events: Vec<InputEvent>,
        seen: Vec<Option<String>>,
        idles: usize,
    }

    impl Frontend for Scripted {
        fn next_event(&mut self, _timeout: Duration) -> Result<Poll, FrontendError> {
            if self.events.is_empty() {
                self.idles += 1;
                return Ok(if self.idles > 2 { Poll::Closed } else { Poll::Idle });
            }
            Ok(Poll::Event(self.events.remove(0)))
        }

        fn present(&mut self, _frame: &Framebuffer, state: &AppState) -> Result<(), FrontendError> {
            self.seen.push(state.selection().label().map(String::from));
            Ok(())
        }
    }

    #[test]
    fn test_startup_selection() {
        let state = state_with("tile,x,y,label\n27,64,4,Polaris\n");
        assert_eq!(state.camera().position(), (256.0, 288.0));
        assert_eq!(state.selection().label(), Some("Polaris"));
    }

    #[test]
    fn test_release_ignored() {
        let mut state = state_with("h\n");
        assert_eq!(state.handle(InputEvent::release(Key::Right)), Transition::Ignored);
        assert_eq!(state.camera().x(), 256.0);
        assert_eq!(state.handle(InputEvent::release(Key::Cancel)), Transition::Ignored);
    }

    #[test]
    fn test_directions() {
        let mut state = state_with("h\n");
        state.handle(InputEvent::press(Key::Right));
        state.handle(InputEvent::repeat(Key::Down));
        assert_eq!(state.camera().position(), (260.0, 292.0));
        state.handle(InputEvent::press(Key::Left));
        state.handle(InputEvent::press(Key::Up));
        assert_eq!(state.camera().position(), (256.0, 288.0));
    }

    #[test]
    fn test_right_presses_move_and_saturate() {
        let max_x = 512.0;
        for n in [1usize, 10, 64, 200] {
            let mut state = state_with("h\n");
            for _ in 0..n {
                assert_eq!(state.handle(InputEvent::press(Key::Right)), Transition::Redraw);
            }
            let expected = (4.0 * n as f32).min(max_x - 256.0);
            assert_eq!(state.camera().x() - 256.0, expected, "n = {}", n);
        }
    }

    #[test]
    fn test_selection_reevaluated_every_step() {
        // Polaris sits under the start point; one step away is exactly on the
        // cursor radius, two steps is outside it.
        let mut state = state_with("h\n27,64,0,Polaris\n");
        let mut labels = Vec::new();
        for _ in 0..3 {
            state.handle(InputEvent::repeat(Key::Right));
            labels.push(state.selection().label().map(String::from));
        }
        assert_eq!(labels, vec![Some("Polaris".to_string()), None, None]);
    }

    #[test]
    fn test_confirm_and_cancel() {
        let mut state = state_with("h\n27,64,4,Polaris\n");
        assert_eq!(state.handle(InputEvent::press(Key::Confirm)), Transition::Redraw);
        assert_eq!(state.selection().label(), Some("Polaris"));
        assert_eq!(state.handle(InputEvent::press(Key::Cancel)), Transition::Exit);
    }

    #[test]
    fn test_run_processes_in_order_and_exits() {
        let mut state = state_with("h\n27,64,4,Polaris\n");
        let mut frontend = Scripted {
            events: vec![
                InputEvent::press(Key::Right),
                InputEvent::release(Key::Right),
                InputEvent::press(Key::Left),
                InputEvent::press(Key::Cancel),
                InputEvent::press(Key::Right),
            ],
            seen: Vec::new(),
            idles: 0,
        };
        run(&mut state, &mut NoImages, &mut frontend, Duration::from_millis(1)).unwrap();

        // initial frame, Right, Left; release draws nothing; cancel stops the loop
        assert_eq!(
            frontend.seen,
            vec![Some("Polaris".to_string()), None, Some("Polaris".to_string())]
        );
        assert_eq!(frontend.events.len(), 1);
        assert_eq!(state.camera().x(), 256.0);
    }

    #[test]
    fn test_run_stops_when_input_closes() {
        let mut state = state_with("h\n");
        let mut frontend = Scripted { events: Vec::new(), seen: Vec::new(), idles: 0 };
        let frame = run(&mut state, &mut NoImages, &mut frontend, Duration::from_millis(1)).unwrap();
        // initial frame plus two idle refreshes
        assert_eq!(frontend.seen.len(), 3);
        assert!(frame.ink_count() > 0);
    }

    #[test]
    fn test_queue_is_fifo_and_bounded() {
        let (tx, rx) = input_queue(2);
        let producer = std::thread::spawn(move || {
            for i in 0..6 {
                let key = if i % 2 == 0 { Key::Left } else { Key::Right };
                assert!(tx.send(InputEvent::repeat(key)));
            }
        });

        let mut got = Vec::new();
        loop {
            match rx.recv_timeout(Duration::from_secs(5)) {
                Poll::Event(ev) => got.push(ev.key),
                Poll::Idle => panic!("producer stalled"),
                Poll::Closed => break,
            }
        }
        producer.join().unwrap();
        assert_eq!(got, vec![Key::Left, Key::Right, Key::Left, Key::Right, Key::Left, Key::Right]);
    }
}
