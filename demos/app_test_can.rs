//! appTestCAN - CAN framework test application on STM32F401
//!
//! Registers the blink, logger, and CAN tasks plus a small traffic
//! generator, then hands control to the scheduler. The CAN controller is
//! a software loopback so the application runs on a board without a
//! transceiver fitted.

#![no_std]
#![no_main]

use cortex_m::peripheral::syst::SystClkSource;
use cortex_m_rt::{entry, exception};
use embedded_can::StandardId;
use heapless::Deque;

use cotask::can::{BusState, CanQueues};
use cotask::hal::{CanController, OutputPin, SerialWrite};
use cotask::tasks::{BlinkTask, CanTask, LogChannel, LoggerTask};
use cotask::time::{ms_to_ticks, TickCounter};
use cotask::{CanFrame, Control, Error, Scheduler, Task, Tick};

use cotask::pac;

#[cfg(not(feature = "defmt"))]
use panic_halt as _;

// ============ Shared State ============

static TICKS: TickCounter = TickCounter::new();
static LOG_CHANNEL: LogChannel = LogChannel::new();
static CAN_QUEUES: CanQueues = CanQueues::new();

#[exception]
fn SysTick() {
    TICKS.increment();
}

// ============ Board Support ============

/// User LED on PA5
struct Led;

impl Led {
    fn init() {
        pac::RCC.ahb1enr().modify(|w| w.set_gpioaen(true));
        pac::GPIOA
            .moder()
            .modify(|w| w.set_moder(5, pac::gpio::vals::Moder::OUTPUT));
        pac::GPIOA
            .otyper()
            .modify(|w| w.set_ot(5, pac::gpio::vals::Ot::PUSHPULL));
    }
}

impl OutputPin for Led {
    fn set_high(&mut self) {
        pac::GPIOA.bsrr().write(|w| w.set_bs(5, true));
    }

    fn set_low(&mut self) {
        pac::GPIOA.bsrr().write(|w| w.set_br(5, true));
    }
}

/// Semihosting console as the logger transport
struct HostConsole(cortex_m_semihosting::hio::HostStream);

impl SerialWrite for HostConsole {
    fn write(&mut self, bytes: &[u8]) -> cotask::Result<()> {
        self.0.write_all(bytes).map_err(|_| Error::Transport)
    }
}

/// Software loopback standing in for the bxCAN controller: transmitted
/// frames come back as received frames.
struct LoopbackCan {
    echo: Deque<CanFrame, 8>,
}

impl LoopbackCan {
    const fn new() -> Self {
        Self { echo: Deque::new() }
    }
}

impl CanController for LoopbackCan {
    fn transmit_ready(&self) -> bool {
        !self.echo.is_full()
    }

    fn transmit(&mut self, frame: &CanFrame) -> cotask::Result<()> {
        self.echo.push_back(*frame).map_err(|_| Error::BusOff)
    }

    fn receive(&mut self) -> Option<CanFrame> {
        self.echo.pop_front()
    }

    fn bus_state(&self) -> BusState {
        BusState::Active
    }

    fn reset(&mut self) -> cotask::Result<()> {
        Ok(())
    }
}

// ============ Traffic Generator ============

/// Submits a sequence-numbered test frame every 100 ms and reports the
/// loopback echoes.
struct TrafficTask<'a> {
    queues: &'a CanQueues,
    log: &'a LogChannel,
    seq: u8,
}

impl Task for TrafficTask<'_> {
    fn name(&self) -> &'static str {
        "traffic"
    }

    fn poll(&mut self, _now: Tick) -> cotask::Result<Control> {
        while let Some(_echo) = self.queues.receive() {
            let _ = self.log.debug("can: echo received");
        }

        let id = StandardId::new(0x123).expect("test frame id");
        let frame = CanFrame::new(id, &[self.seq])?;
        if self.queues.submit_transmit(frame).is_err() {
            let _ = self.log.warn("can: tx queue full");
        }
        self.seq = self.seq.wrapping_add(1);

        Ok(Control::Sleep(ms_to_ticks(100)))
    }
}

// ============ Main ============

fn systick_init() {
    let mut cp = cortex_m::Peripherals::take().expect("core peripherals");
    cp.SYST.set_clock_source(SystClkSource::Core);
    cp.SYST
        .set_reload(16_000_000 / cotask::CFG_TICK_RATE_HZ - 1);
    cp.SYST.clear_current();
    cp.SYST.enable_counter();
    cp.SYST.enable_interrupt();
}

#[entry]
fn main() -> ! {
    Led::init();
    systick_init();
    cotask::info!("appTestCAN boot");

    let console = HostConsole(
        cortex_m_semihosting::hio::hstdout().expect("semihosting console"),
    );

    let mut can = CanTask::new(LoopbackCan::new(), &CAN_QUEUES, &LOG_CHANNEL);
    let mut logger = LoggerTask::new(&LOG_CHANNEL, console);
    let mut blink = BlinkTask::new(Led);
    let mut traffic = TrafficTask {
        queues: &CAN_QUEUES,
        log: &LOG_CHANNEL,
        seq: 0,
    };

    let mut sched: Scheduler = Scheduler::new();
    sched.register(&mut can, 0).expect("can task");
    sched.register(&mut logger, 1).expect("logger task");
    sched.register(&mut blink, 2).expect("blink task");
    sched.register(&mut traffic, 2).expect("traffic task");

    let _ = LOG_CHANNEL.info("appTestCAN started");
    cotask::info!("starting scheduler with {} tasks", sched.len());

    match sched.start(&TICKS) {
        Ok(never) => match never {},
        // Unrecoverable controller fault: hand over to the panic strategy,
        // which resets or halts the device.
        Err(_) => {
            cotask::error!("fatal hardware fault");
            panic!("fatal hardware fault");
        }
    }
}
