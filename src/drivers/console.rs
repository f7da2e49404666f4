use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture, Event, MouseEventKind};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, SetTitle};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use super::keyboard::KeyboardNormalizer;
use super::{InputDriver, OutputDriver};
use crate::ui::UiFrame;

/// Reads crossterm events from the real terminal.
///
/// A fast pointer produces far more drag and resize events than a frame
/// can show. When several are already waiting, only the newest of a run is
/// handed out: a drag preview depends on the pointer position alone, and a
/// terminal resize on the final size.
pub struct ConsoleInputDriver {
    normalizer: KeyboardNormalizer,
    lookahead: VecDeque<Event>,
    mouse_capture: bool,
}

impl Default for ConsoleInputDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleInputDriver {
    pub fn new() -> Self {
        Self {
            normalizer: KeyboardNormalizer::new(),
            lookahead: VecDeque::new(),
            mouse_capture: false,
        }
    }

    fn next_raw(&mut self) -> io::Result<Event> {
        if let Some(evt) = self.lookahead.pop_front() {
            return Ok(evt);
        }
        loop {
            let evt = crossterm::event::read()?;
            if let Some(normalized) = self.normalizer.normalize(evt) {
                return Ok(normalized);
            }
        }
    }

    /// Pull one more already-waiting event into the lookahead, if any.
    fn peek_ready(&mut self) -> io::Result<Option<&Event>> {
        if self.lookahead.is_empty() {
            while crossterm::event::poll(Duration::ZERO)? {
                if let Some(normalized) = self.normalizer.normalize(crossterm::event::read()?) {
                    self.lookahead.push_back(normalized);
                    break;
                }
            }
        }
        Ok(self.lookahead.front())
    }
}

/// Whether `next` makes `current` redundant.
fn supersedes(current: &Event, next: &Event) -> bool {
    match (current, next) {
        (Event::Resize(..), Event::Resize(..)) => true,
        (Event::Mouse(a), Event::Mouse(b)) => {
            matches!((a.kind, b.kind), (MouseEventKind::Drag(x), MouseEventKind::Drag(y)) if x == y)
        }
        _ => false,
    }
}

impl InputDriver for ConsoleInputDriver {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        if !self.lookahead.is_empty() {
            return Ok(true);
        }
        crossterm::event::poll(timeout)
    }

    fn read(&mut self) -> io::Result<Event> {
        let mut current = self.next_raw()?;
        loop {
            let superseded = match self.peek_ready()? {
                Some(next) => supersedes(&current, next),
                None => false,
            };
            if !superseded {
                return Ok(current);
            }
            current = self.next_raw()?;
        }
    }

    fn set_mouse_capture(&mut self, enabled: bool) -> io::Result<()> {
        if enabled == self.mouse_capture {
            return Ok(());
        }
        if enabled {
            execute!(io::stdout(), EnableMouseCapture)?;
        } else {
            execute!(io::stdout(), DisableMouseCapture)?;
        }
        self.mouse_capture = enabled;
        Ok(())
    }
}

pub struct ConsoleOutputDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    entered: bool,
}

impl ConsoleOutputDriver {
    pub fn new() -> io::Result<Self> {
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;
        Ok(Self {
            terminal,
            entered: false,
        })
    }
}

impl OutputDriver for ConsoleOutputDriver {
    type Backend = CrosstermBackend<Stdout>;

    fn enter(&mut self) -> io::Result<()> {
        if self.entered {
            return Ok(());
        }
        execute!(
            self.terminal.backend_mut(),
            EnterAlternateScreen,
            SetTitle("dashgrid")
        )?;
        terminal::enable_raw_mode()?;
        self.terminal.hide_cursor()?;
        self.terminal.clear()?;
        self.entered = true;
        Ok(())
    }

    fn exit(&mut self) -> io::Result<()> {
        if !self.entered {
            return Ok(());
        }
        terminal::disable_raw_mode()?;
        // capture may still be on if the loop failed mid-run
        execute!(
            self.terminal.backend_mut(),
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        self.terminal.show_cursor()?;
        self.entered = false;
        Ok(())
    }

    fn size(&self) -> io::Result<(u16, u16)> {
        let size = self.terminal.size()?;
        Ok((size.width, size.height))
    }

    fn draw<F>(&mut self, f: F) -> io::Result<()>
    where
        F: FnOnce(UiFrame<'_>),
    {
        self.terminal
            .draw(move |frame| f(UiFrame::new(frame)))
            .map(|_| ())
            .map_err(|err| io::Error::other(err.to_string()))
    }
}

impl Drop for ConsoleOutputDriver {
    fn drop(&mut self) {
        let _ = self.exit();
    }
}
