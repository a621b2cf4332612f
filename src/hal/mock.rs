//! Simulated HAL implementations
//!
//! Deterministic stand-ins for the hardware contracts so the scheduler and
//! tasks can be exercised on the host. Kept in the library proper so
//! downstream crates can build software-in-the-loop rigs against them.

use core::cell::Cell;

use heapless::{Deque, Vec};

use super::{CanController, OutputPin, SerialWrite, TickSource};
use crate::can::{BusState, CanFrame};
use crate::error::{Error, Result};
use crate::types::Tick;

/// Manually advanced tick source
pub struct MockClock {
    ticks: Cell<Tick>,
}

impl MockClock {
    pub const fn new() -> Self {
        Self { ticks: Cell::new(0) }
    }

    /// Advance the clock by `n` ticks
    pub fn advance(&self, n: Tick) {
        self.ticks.set(self.ticks.get().wrapping_add(n));
    }

    /// Set the clock to an absolute tick
    pub fn set(&self, t: Tick) {
        self.ticks.set(t);
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for MockClock {
    fn now(&self) -> Tick {
        self.ticks.get()
    }
}

/// Output pin recording every level change
#[derive(Default)]
pub struct MockPin {
    level: bool,
    toggles: u32,
}

impl MockPin {
    pub const fn new() -> Self {
        Self {
            level: false,
            toggles: 0,
        }
    }

    /// Current level
    pub fn is_high(&self) -> bool {
        self.level
    }

    /// Number of level changes observed
    pub fn toggles(&self) -> u32 {
        self.toggles
    }
}

impl OutputPin for MockPin {
    fn set_high(&mut self) {
        if !self.level {
            self.toggles += 1;
        }
        self.level = true;
    }

    fn set_low(&mut self) {
        if self.level {
            self.toggles += 1;
        }
        self.level = false;
    }
}

/// Serial transport capturing written bytes
pub struct MockSerial {
    out: Vec<u8, 1024>,
    fail_writes: bool,
}

impl MockSerial {
    pub const fn new() -> Self {
        Self {
            out: Vec::new(),
            fail_writes: false,
        }
    }

    /// Make subsequent writes fail with a transport error
    pub fn set_failing(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Everything written so far
    pub fn output(&self) -> &[u8] {
        &self.out
    }
}

impl Default for MockSerial {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialWrite for MockSerial {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        if self.fail_writes {
            return Err(Error::Transport);
        }
        // Capture what fits; tests size their traffic below the cap.
        let _ = self.out.extend_from_slice(bytes);
        Ok(())
    }
}

/// Scripted CAN controller.
///
/// Tests inject received frames and drive the bus state; transmitted
/// frames are recorded in arrival order.
pub struct MockCan {
    rx_fifo: Deque<CanFrame, 64>,
    tx_log: Vec<CanFrame, 64>,
    bus: BusState,
    tx_ready: bool,
    resets: u32,
    fail_transmit: Option<Error>,
    fail_reset: Option<Error>,
}

impl MockCan {
    pub const fn new() -> Self {
        Self {
            rx_fifo: Deque::new(),
            tx_log: Vec::new(),
            bus: BusState::Active,
            tx_ready: true,
            resets: 0,
            fail_transmit: None,
            fail_reset: None,
        }
    }

    /// Queue a frame as if the hardware had received it
    pub fn inject_rx(&mut self, frame: CanFrame) {
        let _ = self.rx_fifo.push_back(frame);
    }

    /// Force the reported bus state
    pub fn set_bus_state(&mut self, bus: BusState) {
        self.bus = bus;
    }

    /// Control whether the controller accepts frames
    pub fn set_tx_ready(&mut self, ready: bool) {
        self.tx_ready = ready;
    }

    /// Fail the next transmit with the given error
    pub fn fail_next_transmit(&mut self, err: Error) {
        self.fail_transmit = Some(err);
    }

    /// Fail the next reset with the given error
    pub fn fail_next_reset(&mut self, err: Error) {
        self.fail_reset = Some(err);
    }

    /// Frames handed to the controller, in order
    pub fn transmitted(&self) -> &[CanFrame] {
        &self.tx_log
    }

    /// Forget recorded transmissions
    pub fn clear_transmitted(&mut self) {
        self.tx_log.clear();
    }

    /// Number of reset sequences run
    pub fn resets(&self) -> u32 {
        self.resets
    }
}

impl Default for MockCan {
    fn default() -> Self {
        Self::new()
    }
}

impl CanController for MockCan {
    fn transmit_ready(&self) -> bool {
        self.tx_ready && self.bus != BusState::BusOff
    }

    fn transmit(&mut self, frame: &CanFrame) -> Result<()> {
        if let Some(err) = self.fail_transmit.take() {
            return Err(err);
        }
        if self.bus == BusState::BusOff {
            return Err(Error::BusOff);
        }
        self.tx_log.push(*frame).map_err(|_| Error::HardwareFault)?;
        Ok(())
    }

    fn receive(&mut self) -> Option<CanFrame> {
        self.rx_fifo.pop_front()
    }

    fn bus_state(&self) -> BusState {
        self.bus
    }

    fn reset(&mut self) -> Result<()> {
        self.resets += 1;
        if let Some(err) = self.fail_reset.take() {
            return Err(err);
        }
        self.bus = BusState::Active;
        Ok(())
    }
}
