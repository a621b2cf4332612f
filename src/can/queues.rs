//! Frame queues shared between the CAN task and its clients
//!
//! Single consumer per direction: the CAN task drains TX toward the
//! controller and fills RX from it; other tasks (or interrupt handlers)
//! submit TX frames and pop RX frames. Every access runs inside a
//! critical section, which is the only synchronization a single-core
//! cooperative system needs at the ISR boundary.

use crate::config::{CFG_CAN_RX_QUEUE_SIZE, CFG_CAN_TX_QUEUE_SIZE};
use crate::core::cs_cell::CsCell;
use crate::error::Result;
use crate::queue::Ring;
use crate::types::Direction;

use super::CanFrame;

/// Bounded TX/RX frame queues with interrupt-safe access.
///
/// `const`-constructible so the application can place it in a `static`
/// and hand references to the producing tasks and the CAN task.
pub struct CanQueues {
    tx: CsCell<Ring<CanFrame, CFG_CAN_TX_QUEUE_SIZE>>,
    rx: CsCell<Ring<CanFrame, CFG_CAN_RX_QUEUE_SIZE>>,
}

impl CanQueues {
    /// Create empty queues
    pub const fn new() -> Self {
        Self {
            tx: CsCell::new(Ring::new()),
            rx: CsCell::new(Ring::new()),
        }
    }

    /// Enqueue a frame for transmission.
    ///
    /// Non-blocking: at capacity the submitted (newest) frame is rejected
    /// with [`Error::QueueFull`](crate::Error::QueueFull) and counted;
    /// frames already accepted keep their order. Frames submitted while
    /// the bus is off are accepted and held until recovery completes.
    pub fn submit_transmit(&self, mut frame: CanFrame) -> Result<()> {
        frame.set_direction(Direction::Tx);
        self.tx.with(|ring| ring.push(frame))
    }

    /// Pop the oldest received frame, or `None` when the queue is empty.
    ///
    /// Never blocks; callers retry on their next poll.
    pub fn receive(&self) -> Option<CanFrame> {
        self.rx.with(|ring| ring.pop())
    }

    /// Frames waiting for transmission
    pub fn tx_pending(&self) -> usize {
        self.tx.with(|ring| ring.len())
    }

    /// Frames waiting to be consumed
    pub fn rx_pending(&self) -> usize {
        self.rx.with(|ring| ring.len())
    }

    /// TX frames rejected because the queue was full
    pub fn tx_dropped(&self) -> u32 {
        self.tx.with(|ring| ring.dropped())
    }

    /// RX frames lost because the queue was full
    pub fn rx_dropped(&self) -> u32 {
        self.rx.with(|ring| ring.dropped())
    }

    /// Copy of the oldest queued TX frame, for the CAN task's drain loop
    pub(crate) fn peek_transmit(&self) -> Option<CanFrame> {
        self.tx.with(|ring| ring.front().copied())
    }

    /// Drop the oldest queued TX frame after the controller accepted it
    pub(crate) fn pop_transmit(&self) -> Option<CanFrame> {
        self.tx.with(|ring| ring.pop())
    }

    /// Store a received frame; full queues count the loss
    pub(crate) fn push_received(&self, frame: CanFrame) -> Result<()> {
        self.rx.with(|ring| ring.push(frame))
    }
}

impl Default for CanQueues {
    fn default() -> Self {
        Self::new()
    }
}
