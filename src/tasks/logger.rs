//! Serial logger task
//!
//! Any task (or interrupt handler) posts short diagnostic messages to the
//! [`LogChannel`]; the logger task alone drains them in FIFO order and
//! writes them to the serial transport. Producers never block: a full
//! queue rejects the newest message and counts the loss.

use heapless::String;

use crate::config::{CFG_LOG_BURST, CFG_LOG_MSG_LEN, CFG_LOG_QUEUE_SIZE};
use crate::core::cs_cell::CsCell;
use crate::error::Result;
use crate::hal::SerialWrite;
use crate::queue::Ring;
use crate::task::{Control, Task};
use crate::types::Tick;

/// Message severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl LogLevel {
    /// Fixed-width tag used in the serial output
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO ",
            LogLevel::Warn => "WARN ",
            LogLevel::Error => "ERROR",
        }
    }
}

/// One queued diagnostic message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub level: LogLevel,
    pub text: String<CFG_LOG_MSG_LEN>,
}

impl LogMessage {
    /// Build a message, truncating the text at a character boundary if it
    /// exceeds the configured length.
    pub fn new(level: LogLevel, text: &str) -> Self {
        let mut buf = String::new();
        for ch in text.chars() {
            if buf.push(ch).is_err() {
                break;
            }
        }
        Self { level, text: buf }
    }
}

/// Shared, interrupt-safe log message queue.
///
/// `const`-constructible for placement in a `static`.
pub struct LogChannel {
    q: CsCell<Ring<LogMessage, CFG_LOG_QUEUE_SIZE>>,
}

impl LogChannel {
    /// Create an empty channel
    pub const fn new() -> Self {
        Self {
            q: CsCell::new(Ring::new()),
        }
    }

    /// Post a message.
    ///
    /// Non-blocking; at capacity the newest message is dropped, counted,
    /// and [`Error::QueueFull`](crate::Error::QueueFull) returned.
    pub fn log(&self, level: LogLevel, text: &str) -> Result<()> {
        self.q.with(|ring| ring.push(LogMessage::new(level, text)))
    }

    /// Post a debug message
    pub fn debug(&self, text: &str) -> Result<()> {
        self.log(LogLevel::Debug, text)
    }

    /// Post an info message
    pub fn info(&self, text: &str) -> Result<()> {
        self.log(LogLevel::Info, text)
    }

    /// Post a warning
    pub fn warn(&self, text: &str) -> Result<()> {
        self.log(LogLevel::Warn, text)
    }

    /// Post an error message
    pub fn error(&self, text: &str) -> Result<()> {
        self.log(LogLevel::Error, text)
    }

    /// Take the oldest message; consumer side, used by the logger task
    pub fn pop(&self) -> Option<LogMessage> {
        self.q.with(|ring| ring.pop())
    }

    /// Queued messages
    pub fn pending(&self) -> usize {
        self.q.with(|ring| ring.len())
    }

    /// Messages rejected because the queue was full
    pub fn dropped(&self) -> u32 {
        self.q.with(|ring| ring.dropped())
    }
}

impl Default for LogChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// FIFO consumer writing `[LEVEL] text` lines to the serial transport
pub struct LoggerTask<'a, S: SerialWrite> {
    channel: &'a LogChannel,
    serial: S,
    written: u32,
    transport_errors: u32,
}

impl<'a, S: SerialWrite> LoggerTask<'a, S> {
    pub fn new(channel: &'a LogChannel, serial: S) -> Self {
        Self {
            channel,
            serial,
            written: 0,
            transport_errors: 0,
        }
    }

    /// Messages successfully written
    pub fn written(&self) -> u32 {
        self.written
    }

    /// Messages lost to transport write failures
    pub fn transport_errors(&self) -> u32 {
        self.transport_errors
    }

    /// Access the underlying transport
    pub fn serial(&self) -> &S {
        &self.serial
    }

    fn write_message(&mut self, msg: &LogMessage) {
        // Line buffer is sized so the formatted message always fits.
        let mut line: String<{ CFG_LOG_MSG_LEN + 16 }> = String::new();
        let _ = line.push('[');
        let _ = line.push_str(msg.level.as_str());
        let _ = line.push_str("] ");
        let _ = line.push_str(&msg.text);
        let _ = line.push_str("\r\n");

        // A failed write drops the message; producers are never stalled.
        if self.serial.write(line.as_bytes()).is_err() {
            self.transport_errors = self.transport_errors.saturating_add(1);
        } else {
            self.written = self.written.wrapping_add(1);
        }
    }
}

impl<S: SerialWrite> Task for LoggerTask<'_, S> {
    fn name(&self) -> &'static str {
        "logger"
    }

    fn poll(&mut self, _now: Tick) -> crate::Result<Control> {
        for _ in 0..CFG_LOG_BURST {
            match self.channel.pop() {
                Some(msg) => self.write_message(&msg),
                None => break,
            }
        }
        Ok(Control::Yield)
    }
}
