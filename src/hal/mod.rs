//! Hardware abstraction contracts
//!
//! The framework consumes hardware through these traits; concrete
//! implementations live in the application (register-level drivers) or in
//! [`mock`] for host-side testing.

pub mod mock;

use crate::can::{BusState, CanFrame};
use crate::error::Result;
use crate::types::Tick;

/// Monotonic tick source.
///
/// Wraps at the counter width; consumers compare ticks with wrapping
/// subtraction only.
pub trait TickSource {
    /// Current tick count
    fn now(&self) -> Tick;
}

/// Output line driven by the blink task
pub trait OutputPin {
    /// Drive the line high
    fn set_high(&mut self);

    /// Drive the line low
    fn set_low(&mut self);
}

/// Byte-oriented serial transport consumed by the logger task
pub trait SerialWrite {
    /// Write the whole buffer.
    ///
    /// Fails with [`Error::Transport`](crate::Error::Transport) when the
    /// transport cannot accept the data; the caller decides whether to
    /// drop or retry.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;
}

/// Raw CAN controller interface.
///
/// Models the hardware ring buffers and error state machine; the CAN task
/// polls it once per scheduling pass.
pub trait CanController {
    /// Check whether the controller can accept a frame for transmission
    fn transmit_ready(&self) -> bool;

    /// Hand a frame to the controller.
    ///
    /// Transient refusals (bus-off window, arbitration loss) surface as
    /// [`Error::BusOff`](crate::Error::BusOff); the frame stays queued and
    /// is retried. [`Error::HardwareFault`](crate::Error::HardwareFault)
    /// is fatal.
    fn transmit(&mut self, frame: &CanFrame) -> Result<()>;

    /// Take the next received frame out of the hardware buffer, if any
    fn receive(&mut self) -> Option<CanFrame>;

    /// Bus state mirrored from the controller error counters
    fn bus_state(&self) -> BusState;

    /// Run the controller's bus-off reset sequence.
    ///
    /// On success the bus returns to [`BusState::Active`].
    fn reset(&mut self) -> Result<()>;
}
