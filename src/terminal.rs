//! Terminal frontend using crossterm and ratatui.
//!
//! The framebuffer is packed two pixel rows per terminal cell with half-block
//! glyphs, so the 128x64 display needs 128x32 cells plus a border and a
//! status line. Keys are read on a separate thread and pushed through the
//! bounded input queue.

use std::io::{self, stdout, Stdout};
use std::thread;
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};
use tracing::debug;

use crate::app::{input_queue, AppState, Frontend, InputEvent, InputKind, InputQueue, InputSender, Key, Poll, QUEUE_CAPACITY};
use crate::canvas::{Framebuffer, Surface};
use crate::error::FrontendError;

/// Backlight and ink colours, roughly those of an orange monochrome LCD.
const BACKLIGHT: Color = Color::Rgb(255, 140, 41);
const INK: Color = Color::Rgb(20, 20, 20);

/// Translate a crossterm key event.
pub fn map_key(key: KeyEvent) -> Option<InputEvent> {
    let kind = match key.kind {
        KeyEventKind::Press => InputKind::Press,
        KeyEventKind::Repeat => InputKind::Repeat,
        KeyEventKind::Release => InputKind::Release,
    };

    let key = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Key::Cancel,
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('w') => Key::Up,
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('s') => Key::Down,
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('a') => Key::Left,
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('d') => Key::Right,
        KeyCode::Enter | KeyCode::Char(' ') => Key::Confirm,
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q') => Key::Cancel,
        _ => return None,
    };

    Some(InputEvent { kind, key })
}

/// Half-block glyph for a (top, bottom) pixel pair.
fn half_block(top: bool, bottom: bool) -> char {
    match (top, bottom) {
        (false, false) => ' ',
        (true, false) => '▀',
        (false, true) => '▄',
        (true, true) => '█',
    }
}

/// Widget drawing a framebuffer at one cell per two pixels.
pub struct FramebufferView<'a> {
    frame: &'a Framebuffer,
}

impl<'a> FramebufferView<'a> {
    pub fn new(frame: &'a Framebuffer) -> Self {
        FramebufferView { frame }
    }
}

impl Widget for FramebufferView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let cols = (self.frame.width() as u16).min(area.width);
        let rows = (self.frame.height().div_ceil(2) as u16).min(area.height);
        let style = Style::default().fg(INK).bg(BACKLIGHT);

        for cy in 0..rows {
            for cx in 0..cols {
                let top = self.frame.get(cx as i32, 2 * cy as i32);
                let bottom = self.frame.get(cx as i32, 2 * cy as i32 + 1);
                if let Some(cell) = buf.cell_mut((area.x + cx, area.y + cy)) {
                    cell.set_char(half_block(top, bottom)).set_style(style);
                }
            }
        }
    }
}

/// Reads keys until the queue is closed or the terminal errors out.
fn spawn_key_reader(sender: InputSender) {
    thread::spawn(move || loop {
        match event::read() {
            Ok(Event::Key(key)) => {
                if let Some(input) = map_key(key) {
                    if !sender.send(input) {
                        break;
                    }
                }
            }
            Ok(_) => {}
            Err(err) => {
                debug!("key reader stopped: {}", err);
                break;
            }
        }
    });
}

pub struct TerminalFrontend {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    queue: InputQueue,
}

impl TerminalFrontend {
    /// Enter raw mode and the alternate screen, and start reading keys.
    pub fn new() -> Result<Self, FrontendError> {
        terminal::enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let (sender, queue) = input_queue(QUEUE_CAPACITY);
        spawn_key_reader(sender);

        Ok(TerminalFrontend { terminal, queue })
    }

    fn restore(&mut self) -> io::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)
    }
}

impl Drop for TerminalFrontend {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

impl Frontend for TerminalFrontend {
    fn next_event(&mut self, timeout: Duration) -> Result<Poll, FrontendError> {
        Ok(self.queue.recv_timeout(timeout))
    }

    fn present(&mut self, frame: &Framebuffer, state: &AppState) -> Result<(), FrontendError> {
        let display_rows = frame.height().div_ceil(2) as u16;
        let display_cols = frame.width() as u16;
        let (cam_x, cam_y) = state.camera().position();
        let selected = state.selection().label().unwrap_or("-");

        self.terminal.draw(|f| {
            let size = f.area();

            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(display_rows + 2),
                    Constraint::Length(1),
                    Constraint::Min(0),
                ])
                .split(size);

            let column = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(display_cols + 2), Constraint::Min(0)])
                .split(chunks[0]);

            let block = Block::default().borders(Borders::ALL).title(" Star Map ");
            let inner = block.inner(column[0]);
            f.render_widget(block, column[0]);
            f.render_widget(FramebufferView::new(frame), inner);

            let status = format!(
                " ({:.0},{:.0}) | {} | Arrows:Pan  Enter:Select  Esc:Quit",
                cam_x, cam_y, selected,
            );
            let status_para = Paragraph::new(status)
                .style(Style::default().bg(Color::DarkGray).fg(Color::White));
            f.render_widget(status_para, chunks[1]);
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_keys() {
        let press = map_key(KeyEvent::new(KeyCode::Left, KeyModifiers::NONE)).unwrap();
        assert_eq!(press, InputEvent::press(Key::Left));

        let q = map_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)).unwrap();
        assert_eq!(q.key, Key::Cancel);

        let ctrl_c = map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)).unwrap();
        assert_eq!(ctrl_c.key, Key::Cancel);

        let enter = map_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)).unwrap();
        assert_eq!(enter.key, Key::Confirm);

        let mut release = KeyEvent::new(KeyCode::Up, KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(map_key(release), Some(InputEvent::release(Key::Up)));

        assert!(map_key(KeyEvent::new(KeyCode::Char('z'), KeyModifiers::NONE)).is_none());
    }

    #[test]
    fn test_framebuffer_view_packs_rows() {
        let mut fb = Framebuffer::new(4, 4);
        fb.draw_dot(0, 0);
        fb.draw_dot(1, 1);
        fb.draw_dot(2, 0);
        fb.draw_dot(2, 1);

        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        FramebufferView::new(&fb).render(area, &mut buf);

        let symbols: String = (0..4u16).map(|x| buf[(x, 0u16)].symbol().to_string()).collect();
        assert_eq!(symbols, "▀▄█ ");
        assert_eq!(buf[(0u16, 1u16)].symbol(), " ");
    }
}
