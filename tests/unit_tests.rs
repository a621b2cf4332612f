//! Unit tests for the scheduler and application tasks
//!
//! These tests run on the host (not the embedded target) against the
//! simulated HAL to verify the dispatch and transport contracts.

#[cfg(test)]
mod sched_tests {
    use cotask::hal::mock::{MockClock, MockPin};
    use cotask::hal::TickSource;
    use cotask::tasks::BlinkTask;
    use cotask::{Error, Scheduler};

    #[test]
    fn blink_toggles_once_per_interval() {
        // 1000 ticks at interval 50 must produce exactly 20 toggles.
        let mut blink = BlinkTask::with_interval(MockPin::new(), 50);

        let mut sched: Scheduler<2> = Scheduler::new();
        sched.register(&mut blink, 0).unwrap();
        sched.begin().unwrap();

        for now in 1..=1000 {
            sched.run_pass(now).unwrap();
        }
        drop(sched);

        assert_eq!(blink.toggles(), 20);
    }

    #[test]
    fn clock_drives_the_dispatch_loop() {
        let clock = MockClock::new();
        clock.set(7);
        assert_eq!(clock.now(), 7);
        clock.advance(3);
        assert_eq!(clock.now(), 10);
    }

    #[test]
    fn registration_is_closed_once_running() {
        let mut a = BlinkTask::with_interval(MockPin::new(), 10);
        let mut b = BlinkTask::with_interval(MockPin::new(), 10);

        let mut sched: Scheduler<4> = Scheduler::new();
        sched.register(&mut a, 0).unwrap();
        sched.begin().unwrap();
        assert_eq!(sched.register(&mut b, 0), Err(Error::RegistrationClosed));
    }
}

#[cfg(test)]
mod can_tests {
    use embedded_can::{Id, StandardId};

    use cotask::can::{BusState, CanQueues};
    use cotask::hal::mock::MockCan;
    use cotask::tasks::{CanTask, LogChannel};
    use cotask::{CanFrame, Error, Task, CFG_BUS_OFF_QUIET_TICKS, CFG_CAN_TX_QUEUE_SIZE};

    fn frame(raw: u16) -> CanFrame {
        CanFrame::new(StandardId::new(raw).unwrap(), &[raw as u8, (raw >> 8) as u8]).unwrap()
    }

    fn raw_id(id: Id) -> u32 {
        match id {
            Id::Standard(id) => u32::from(id.as_raw()),
            Id::Extended(id) => id.as_raw(),
        }
    }

    #[test]
    fn accepted_frames_reach_hardware_in_submission_order() {
        let queues = CanQueues::new();
        let log = LogChannel::new();
        let mut task = CanTask::new(MockCan::new(), &queues, &log);

        for raw in [0x101, 0x102, 0x103, 0x104] {
            queues.submit_transmit(frame(raw)).unwrap();
        }
        task.poll(0).unwrap();

        let sent: Vec<u32> = task
            .controller()
            .transmitted()
            .iter()
            .map(|f| raw_id(f.id()))
            .collect();
        assert_eq!(sent, vec![0x101, 0x102, 0x103, 0x104]);
    }

    #[test]
    fn recovery_preserves_order_across_bus_off() {
        let queues = CanQueues::new();
        let log = LogChannel::new();
        let mut task = CanTask::new(MockCan::new(), &queues, &log);

        // Two frames drain while the bus is healthy.
        queues.submit_transmit(frame(0x201)).unwrap();
        queues.submit_transmit(frame(0x202)).unwrap();
        task.poll(0).unwrap();

        // Bus drops; more frames are accepted and retained.
        task.controller_mut().set_bus_state(BusState::BusOff);
        queues.submit_transmit(frame(0x203)).unwrap();
        queues.submit_transmit(frame(0x204)).unwrap();

        task.poll(1).unwrap();
        task.poll(2).unwrap();
        assert_eq!(task.controller().transmitted().len(), 2);
        assert_eq!(queues.tx_pending(), 2);
        assert_eq!(task.controller().resets(), 0);

        // Quiescent period elapses: reset runs, retained frames drain in
        // original order with nothing reordered ahead of them.
        task.poll(1 + CFG_BUS_OFF_QUIET_TICKS).unwrap();
        assert_eq!(task.controller().resets(), 1);
        assert_eq!(task.stats().recoveries, 1);

        let sent: Vec<u32> = task
            .controller()
            .transmitted()
            .iter()
            .map(|f| raw_id(f.id()))
            .collect();
        assert_eq!(sent, vec![0x201, 0x202, 0x203, 0x204]);
        assert_eq!(queues.tx_pending(), 0);
    }

    #[test]
    fn rx_round_trip_delivers_each_frame_exactly_once() {
        let queues = CanQueues::new();
        let log = LogChannel::new();
        let mut ctl = MockCan::new();

        for raw in 0x300..0x308 {
            ctl.inject_rx(frame(raw));
        }

        let mut task = CanTask::new(ctl, &queues, &log);
        task.poll(5).unwrap();

        for raw in 0x300u16..0x308 {
            let got = queues.receive().expect("frame lost");
            assert_eq!(raw_id(got.id()), u32::from(raw));
            assert_eq!(got.timestamp, 5);
        }
        assert_eq!(queues.receive(), None);
        assert_eq!(task.stats().rx_accepted, 8);
    }

    #[test]
    fn overfull_tx_queue_rejects_exactly_one_frame() {
        let queues = CanQueues::new();
        let log = LogChannel::new();

        let mut rejections = 0;
        for raw in 0..=CFG_CAN_TX_QUEUE_SIZE {
            if queues.submit_transmit(frame(raw as u16)) == Err(Error::QueueFull) {
                rejections += 1;
            }
        }
        assert_eq!(rejections, 1);
        assert_eq!(queues.tx_dropped(), 1);

        // The accepted frames are all delivered.
        let mut task = CanTask::new(MockCan::new(), &queues, &log);
        task.poll(0).unwrap();
        assert_eq!(
            task.controller().transmitted().len(),
            CFG_CAN_TX_QUEUE_SIZE
        );
        assert_eq!(queues.tx_pending(), 0);
    }

    #[test]
    fn bus_off_entry_is_reported_to_the_log_channel() {
        let queues = CanQueues::new();
        let log = LogChannel::new();
        let mut ctl = MockCan::new();
        ctl.set_bus_state(BusState::BusOff);

        let mut task = CanTask::new(ctl, &queues, &log);
        task.poll(0).unwrap();

        let msg = log.pop().expect("no diagnostic queued");
        assert_eq!(msg.level, cotask::LogLevel::Warn);
        assert!(msg.text.as_str().contains("bus-off"));
    }
}

#[cfg(test)]
mod logger_tests {
    use cotask::hal::mock::MockSerial;
    use cotask::tasks::{LogChannel, LoggerTask};
    use cotask::{Task, CFG_LOG_BURST, CFG_LOG_QUEUE_SIZE};

    #[test]
    fn messages_drain_in_fifo_order() {
        let channel = LogChannel::new();
        let labels = ["m00", "m01", "m02", "m03", "m04", "m05", "m06", "m07"];
        for label in labels {
            channel.info(label).unwrap();
        }

        let mut task = LoggerTask::new(&channel, MockSerial::new());
        let mut now = 0;
        while channel.pending() > 0 {
            task.poll(now).unwrap();
            now += 1;
        }

        let output = String::from_utf8(task.serial().output().to_vec()).unwrap();
        let mut last = 0;
        for label in labels {
            let pos = output.find(label).expect("message missing");
            assert!(pos >= last, "message out of order: {label}");
            last = pos;
        }
        assert_eq!(task.written(), labels.len() as u32);
    }

    #[test]
    fn draining_is_bounded_per_pass() {
        let channel = LogChannel::new();
        for _ in 0..CFG_LOG_QUEUE_SIZE {
            channel.debug("tick").unwrap();
        }

        let mut task = LoggerTask::new(&channel, MockSerial::new());
        task.poll(0).unwrap();
        assert_eq!(
            channel.pending(),
            CFG_LOG_QUEUE_SIZE - CFG_LOG_BURST
        );
    }
}

#[cfg(test)]
mod app_tests {
    use embedded_can::StandardId;

    use cotask::can::CanQueues;
    use cotask::hal::mock::{MockCan, MockPin, MockSerial};
    use cotask::tasks::{BlinkTask, CanTask, LogChannel, LoggerTask};
    use cotask::{CanFrame, Scheduler};

    /// The original application shape: blink, logger and CAN tasks
    /// registered together and driven by one clock.
    #[test]
    fn three_task_application_runs() {
        let queues = CanQueues::new();
        let channel = LogChannel::new();

        let mut ctl = MockCan::new();
        ctl.inject_rx(
            CanFrame::new(StandardId::new(0x42).unwrap(), &[1, 2, 3]).unwrap(),
        );

        let mut can = CanTask::new(ctl, &queues, &channel);
        let mut logger = LoggerTask::new(&channel, MockSerial::new());
        let mut blink = BlinkTask::with_interval(MockPin::new(), 100);

        channel.info("app started").unwrap();
        queues
            .submit_transmit(CanFrame::new(StandardId::new(0x55).unwrap(), &[9]).unwrap())
            .unwrap();

        let mut sched: Scheduler = Scheduler::new();
        sched.register(&mut can, 0).unwrap();
        sched.register(&mut logger, 1).unwrap();
        sched.register(&mut blink, 2).unwrap();
        sched.begin().unwrap();

        for now in 1..=500 {
            sched.run_pass(now).unwrap();
        }
        drop(sched);

        // CAN: the queued frame went out, the injected frame came through.
        assert_eq!(can.stats().tx_sent, 1);
        assert_eq!(queues.receive().map(|f| f.data().to_vec()), Some(vec![1, 2, 3]));

        // Logger: the startup message reached the transport.
        let output = String::from_utf8(logger.serial().output().to_vec()).unwrap();
        assert!(output.contains("[INFO ] app started"));

        // Blink: 500 ticks at interval 100 gives 5 toggles.
        assert_eq!(blink.toggles(), 5);
    }
}
