//! `tracing` subscriber that writes to the browser console.
//!
//! Each formatted event is buffered and handed to `console.error`,
//! `console.warn` or `console.log` depending on its level. Off-wasm
//! (unit tests) the same lines go to stderr.

use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConsoleMethod {
    Error,
    Warn,
    Log,
}

fn console_method(level: Level) -> ConsoleMethod {
    if level == Level::ERROR {
        ConsoleMethod::Error
    } else if level == Level::WARN {
        ConsoleMethod::Warn
    } else {
        ConsoleMethod::Log
    }
}

pub struct ConsoleWriter {
    method: ConsoleMethod,
    buf: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(&self.buf);
        emit(self.method, text.trim_end());
    }
}

#[cfg(target_arch = "wasm32")]
fn emit(method: ConsoleMethod, line: &str) {
    let value = line.into();
    match method {
        ConsoleMethod::Error => web_sys::console::error_1(&value),
        ConsoleMethod::Warn => web_sys::console::warn_1(&value),
        ConsoleMethod::Log => web_sys::console::log_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(_method: ConsoleMethod, line: &str) {
    eprintln!("{line}");
}

pub struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            method: ConsoleMethod::Log,
            buf: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            method: console_method(*meta.level()),
            buf: Vec::new(),
        }
    }
}

/// Build the filter, falling back to `info` when the directive is unusable.
fn build_filter(directives: &str) -> (EnvFilter, bool) {
    match EnvFilter::try_new(directives) {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new("info"), false),
    }
}

/// Install the global subscriber. Returns false if `directives` was rejected
/// and the default filter was used instead.
pub fn init(directives: &str) -> bool {
    let (filter, accepted) = build_filter(directives);
    // `without_time`: SystemTime is unavailable on wasm32-unknown-unknown.
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(ConsoleMakeWriter)
        .with_ansi(false)
        .without_time()
        .try_init();
    if installed.is_err() {
        tracing::debug!("subscriber already installed");
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_route_to_matching_console_method() {
        assert_eq!(console_method(Level::ERROR), ConsoleMethod::Error);
        assert_eq!(console_method(Level::WARN), ConsoleMethod::Warn);
        assert_eq!(console_method(Level::INFO), ConsoleMethod::Log);
        assert_eq!(console_method(Level::DEBUG), ConsoleMethod::Log);
        assert_eq!(console_method(Level::TRACE), ConsoleMethod::Log);
    }

    #[test]
    fn writer_buffers_until_dropped() {
        use std::io::Write;
        let mut w = ConsoleMakeWriter.make_writer();
        w.write_all(b"hello ").unwrap();
        w.write_all(b"world\n").unwrap();
        assert_eq!(w.buf, b"hello world\n");
    }

    #[test]
    fn bad_directive_falls_back() {
        let (_, accepted) = build_filter("office_escape=loud");
        assert!(!accepted);
        let (_, accepted) = build_filter("info,office_escape=debug");
        assert!(accepted);
    }
}
