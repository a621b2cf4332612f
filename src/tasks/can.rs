//! CAN communication task
//!
//! Bridges the controller's hardware buffers and the shared frame queues.
//! Each poll drains received frames through the acceptance filter, drives
//! the bus-off recovery machine, and hands queued TX frames to the
//! controller as bus state and mailbox availability permit.
//!
//! Ordering contract: frames reach the controller in the order they were
//! accepted by [`CanQueues::submit_transmit`], including across a bus-off
//! recovery boundary. A frame is only removed from the TX queue after the
//! controller has accepted it.

use crate::can::{BusRecovery, BusState, CanQueues, FilterTable, RecoveryAction};
use crate::config::CFG_CAN_RX_QUEUE_SIZE;
use crate::error::Result;
use crate::hal::CanController;
use crate::task::{Control, Task};
use crate::tasks::logger::LogChannel;
use crate::types::{Direction, Tick};

/// Traffic and recovery counters
#[derive(Debug, Clone, Copy, Default)]
pub struct CanStats {
    /// Frames accepted by the controller
    pub tx_sent: u32,
    /// Received frames that passed the filter and entered the RX queue
    pub rx_accepted: u32,
    /// Received frames rejected by the acceptance filter
    pub rx_filtered: u32,
    /// Completed bus-off recoveries
    pub recoveries: u32,
}

/// The CAN communication task
pub struct CanTask<'a, C: CanController> {
    ctl: C,
    queues: &'a CanQueues,
    log: &'a LogChannel,
    filters: FilterTable,
    recovery: BusRecovery,
    stats: CanStats,
}

impl<'a, C: CanController> CanTask<'a, C> {
    /// Task accepting every identifier
    pub fn new(ctl: C, queues: &'a CanQueues, log: &'a LogChannel) -> Self {
        Self::with_filters(ctl, queues, log, FilterTable::accept_all())
    }

    /// Task with a fixed acceptance filter table
    pub fn with_filters(
        ctl: C,
        queues: &'a CanQueues,
        log: &'a LogChannel,
        filters: FilterTable,
    ) -> Self {
        Self {
            ctl,
            queues,
            log,
            filters,
            recovery: BusRecovery::new(),
            stats: CanStats::default(),
        }
    }

    /// Traffic counters
    pub fn stats(&self) -> CanStats {
        self.stats
    }

    /// Current controller bus state
    pub fn bus_state(&self) -> BusState {
        self.ctl.bus_state()
    }

    /// Access the controller (register inspection, test injection)
    pub fn controller(&self) -> &C {
        &self.ctl
    }

    /// Mutable controller access
    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.ctl
    }

    /// Move received frames from the controller into the RX queue,
    /// applying the acceptance filter. Bounded per pass so a babbling bus
    /// cannot starve other tasks.
    fn service_rx(&mut self, now: Tick) {
        for _ in 0..CFG_CAN_RX_QUEUE_SIZE {
            let Some(mut frame) = self.ctl.receive() else {
                break;
            };

            if !self.filters.matches(&frame.id()) {
                self.stats.rx_filtered = self.stats.rx_filtered.saturating_add(1);
                continue;
            }

            frame.set_direction(Direction::Rx);
            frame.timestamp = now;
            // Overflow is counted by the queue; accepted frames below
            // capacity are never lost.
            if self.queues.push_received(frame).is_ok() {
                self.stats.rx_accepted = self.stats.rx_accepted.saturating_add(1);
            }
        }
    }

    /// Drive the bus-off recovery machine; returns whether transmission
    /// may be attempted this pass.
    fn service_bus(&mut self, now: Tick) -> Result<bool> {
        let bus = self.ctl.bus_state();
        let was_idle = !self.recovery.in_progress();

        match self.recovery.step(bus, now) {
            RecoveryAction::None => Ok(bus.allows_transmit()),
            RecoveryAction::Wait => {
                if was_idle {
                    let _ = self.log.warn("can: bus-off, holding transmissions");
                }
                Ok(false)
            }
            RecoveryAction::Reset => match self.ctl.reset() {
                Ok(()) => {
                    self.recovery.finish();
                    self.stats.recoveries = self.stats.recoveries.saturating_add(1);
                    let _ = self.log.info("can: bus recovered");
                    Ok(self.ctl.bus_state().allows_transmit())
                }
                Err(e) if e.is_fatal() => Err(e),
                Err(_) => {
                    self.recovery.backoff(now);
                    Ok(false)
                }
            },
        }
    }

    /// Hand queued frames to the controller in FIFO order. A frame is
    /// popped only after the controller accepted it, so transient refusals
    /// leave the queue intact.
    fn service_tx(&mut self) -> Result<()> {
        while self.ctl.transmit_ready() {
            let Some(frame) = self.queues.peek_transmit() else {
                break;
            };

            match self.ctl.transmit(&frame) {
                Ok(()) => {
                    let _ = self.queues.pop_transmit();
                    self.stats.tx_sent = self.stats.tx_sent.saturating_add(1);
                }
                Err(e) if e.is_fatal() => return Err(e),
                // Transient refusal (bus-off window); retry next pass.
                Err(_) => break,
            }
        }
        Ok(())
    }
}

impl<C: CanController> Task for CanTask<'_, C> {
    fn name(&self) -> &'static str {
        "can"
    }

    fn poll(&mut self, now: Tick) -> Result<Control> {
        self.service_rx(now);

        if self.service_bus(now)? {
            self.service_tx()?;
        }

        Ok(Control::Yield)
    }
}
