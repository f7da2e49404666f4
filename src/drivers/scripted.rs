//! Drivers that replay a fixed list of events and draw into an in-memory
//! buffer. Used to run the dashboard loop headless.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crossterm::event::Event;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;

use super::keyboard::KeyboardNormalizer;
use super::{InputDriver, OutputDriver};
use crate::ui::UiFrame;

/// Input driver fed from a queue. Once the queue runs dry `poll` keeps
/// returning `false` and `read` fails, so a loop driven by it must stop on
/// its own (usually through a quit key at the end of the script).
#[derive(Default)]
pub struct ScriptedInputDriver {
    normalizer: KeyboardNormalizer,
    events: VecDeque<Event>,
    polls: usize,
    mouse_capture: Option<bool>,
}

impl ScriptedInputDriver {
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            events: events.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }

    /// How many times the loop polled without getting an event.
    pub fn idle_polls(&self) -> usize {
        self.polls
    }

    pub fn mouse_capture(&self) -> Option<bool> {
        self.mouse_capture
    }
}

impl InputDriver for ScriptedInputDriver {
    fn poll(&mut self, _timeout: Duration) -> io::Result<bool> {
        if self.events.is_empty() {
            self.polls += 1;
            return Ok(false);
        }
        Ok(true)
    }

    fn read(&mut self) -> io::Result<Event> {
        while let Some(evt) = self.events.pop_front() {
            if let Some(normalized) = self.normalizer.normalize(evt) {
                return Ok(normalized);
            }
        }
        Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "script exhausted",
        ))
    }

    fn set_mouse_capture(&mut self, enabled: bool) -> io::Result<()> {
        self.mouse_capture = Some(enabled);
        Ok(())
    }
}

pub struct BufferOutputDriver {
    terminal: Terminal<TestBackend>,
    entered: bool,
}

impl BufferOutputDriver {
    pub fn new(width: u16, height: u16) -> io::Result<Self> {
        let terminal = Terminal::new(TestBackend::new(width, height))
            .map_err(|err| io::Error::other(err.to_string()))?;
        Ok(Self {
            terminal,
            entered: false,
        })
    }

    pub fn is_entered(&self) -> bool {
        self.entered
    }

    pub fn buffer(&self) -> &Buffer {
        self.terminal.backend().buffer()
    }

    /// The rendered screen as one string per row.
    pub fn lines(&self) -> Vec<String> {
        let buffer = self.buffer();
        let area = buffer.area;
        (area.y..area.y + area.height)
            .map(|y| {
                (area.x..area.x + area.width)
                    .filter_map(|x| buffer.cell((x, y)).map(|cell| cell.symbol().to_string()))
                    .collect()
            })
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl OutputDriver for BufferOutputDriver {
    type Backend = TestBackend;

    fn enter(&mut self) -> io::Result<()> {
        self.entered = true;
        Ok(())
    }

    fn exit(&mut self) -> io::Result<()> {
        self.entered = false;
        Ok(())
    }

    fn size(&self) -> io::Result<(u16, u16)> {
        let size = self
            .terminal
            .size()
            .map_err(|err| io::Error::other(err.to_string()))?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::style::Style;

    #[test]
    fn script_drains_then_reports_idle() {
        let mut driver = ScriptedInputDriver::new([Event::Key(KeyEvent::new(
            KeyCode::Char('q'),
            KeyModifiers::NONE,
        ))]);
        assert!(driver.poll(Duration::ZERO).unwrap());
        assert!(matches!(driver.read().unwrap(), Event::Key(_)));
        assert!(!driver.poll(Duration::ZERO).unwrap());
        assert_eq!(driver.idle_polls(), 1);
        assert!(driver.read().is_err());
    }

    #[test]
    fn buffer_driver_captures_draws() {
        let mut out = BufferOutputDriver::new(20, 2).unwrap();
        assert_eq!(out.size().unwrap(), (20, 2));
        out.draw(|mut frame| frame.set_string(0, 1, "dashboard", Style::default()))
            .unwrap();
        assert!(out.contains("dashboard"));
        assert!(out.lines()[0].trim().is_empty());
    }
}
