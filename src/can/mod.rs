//! CAN transport layer
//!
//! Frame and identifier types, acceptance filtering, bus-off recovery,
//! and the queues bridging application tasks to the controller.

mod bus;
mod filter;
mod frame;
mod queues;

pub use bus::{BusRecovery, BusState, RecoveryAction};
pub use filter::{Filter, FilterTable};
pub use frame::CanFrame;
pub use queues::CanQueues;
