//! Subscriber setup. The terminal host owns the screen, so engine logs go
//! into the host's [`LogBuffer`] there; headless tools log to stderr.

use std::io::{self, Write};
use std::str::FromStr;

use tracing::Level;

use crate::log_buffer::{LogBuffer, LogWriter, global_log_buffer};

/// Environment variable holding the maximum log level (`error` .. `trace`).
pub const LOG_LEVEL_ENV: &str = "DASHGRID_LOG";

/// Where formatted log lines end up.
#[derive(Debug, Clone, Default)]
pub enum LogSink {
    /// The process-wide buffer if one is registered, stderr otherwise.
    #[default]
    Global,
    Buffer(LogBuffer),
    Stderr,
}

pub enum SinkWriter {
    Buffer(LogWriter),
    Stderr(io::Stderr),
}

impl Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            SinkWriter::Buffer(w) => w.write(buf),
            SinkWriter::Stderr(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            SinkWriter::Buffer(w) => w.flush(),
            SinkWriter::Stderr(s) => s.flush(),
        }
    }
}

impl LogSink {
    fn writer(&self) -> SinkWriter {
        match self {
            LogSink::Buffer(buffer) => SinkWriter::Buffer(buffer.writer()),
            LogSink::Stderr => SinkWriter::Stderr(io::stderr()),
            LogSink::Global => match global_log_buffer() {
                Some(buffer) => SinkWriter::Buffer(buffer.writer()),
                None => SinkWriter::Stderr(io::stderr()),
            },
        }
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogSink {
    type Writer = SinkWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.writer()
    }
}

/// Parse a level name; unknown names yield `None`.
pub fn parse_level(raw: &str) -> Option<Level> {
    Level::from_str(raw.trim()).ok()
}

/// Level from [`LOG_LEVEL_ENV`], or `fallback` when unset or unparsable.
pub fn level_from_env(fallback: Level) -> Level {
    std::env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|raw| parse_level(&raw))
        .unwrap_or(fallback)
}

/// Log into the registered buffer (stderr when there is none) at the level
/// from the environment, debug by default.
pub fn init_default() {
    init(LogSink::Global, level_from_env(Level::DEBUG));
}

/// Install the global subscriber. Later calls leave the first one in place.
pub fn init(sink: LogSink, level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(sink)
        .with_target(false)
        .with_thread_names(false)
        .with_ansi(false)
        .try_init();
}
