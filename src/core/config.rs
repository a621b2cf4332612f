//! Compile-time configuration
//!
//! These constants control the resource limits and timing of the framework.

use crate::types::Tick;

/// Maximum number of registered tasks
pub const CFG_TASK_MAX: usize = 8;

/// System tick rate in Hz
pub const CFG_TICK_RATE_HZ: u32 = 1000;

/// CAN transmit queue depth (frames)
pub const CFG_CAN_TX_QUEUE_SIZE: usize = 16;

/// CAN receive queue depth (frames)
pub const CFG_CAN_RX_QUEUE_SIZE: usize = 32;

/// Maximum number of CAN acceptance filter entries
pub const CFG_CAN_FILTER_MAX: usize = 8;

/// Quiescent period after bus-off before the controller reset is attempted
pub const CFG_BUS_OFF_QUIET_TICKS: Tick = 128;

/// Log message queue depth
pub const CFG_LOG_QUEUE_SIZE: usize = 16;

/// Maximum log message text length in bytes
pub const CFG_LOG_MSG_LEN: usize = 48;

/// Messages the logger task drains per scheduling pass
pub const CFG_LOG_BURST: usize = 4;

/// Default blink interval in ticks
pub const CFG_BLINK_INTERVAL_TICKS: Tick = 500;
