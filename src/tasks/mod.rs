//! Application tasks
//!
//! The three fixed tasks of the test application: LED blink, serial
//! logger, and CAN communication.

pub mod blink;
pub mod can;
pub mod logger;

pub use blink::BlinkTask;
pub use can::{CanStats, CanTask};
pub use logger::{LogChannel, LogLevel, LogMessage, LoggerTask};
