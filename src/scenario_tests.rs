/// End-to-end acquisition scenarios on a hand-driven clock.
/// Interrupts are simulated by calling the context's handlers between loop
/// iterations, which is exactly where a real edge would preempt the loop.

#[cfg(test)]
mod scenario_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::drivers::status_led::StatusIndicator;
    use crate::events::{AcquisitionState, Indication, Reading, ReportEvent};
    use crate::report::Reporter;
    use crate::signals::AcquisitionContext;
    use crate::sim::SimulatedSensor;
    use crate::tasks::acquisition::{Acquisition, Timing};
    use crate::timer::ManualClock;

    #[derive(Default)]
    struct Recorder {
        events: Vec<ReportEvent>,
    }

    impl Reporter for Recorder {
        fn report(&mut self, event: ReportEvent) -> anyhow::Result<()> {
            self.events.push(event);
            Ok(())
        }
    }

    #[derive(Default)]
    struct Lights {
        shown: Vec<Indication>,
    }

    impl StatusIndicator for Lights {
        fn show(&mut self, indication: Indication) -> anyhow::Result<()> {
            self.shown.push(indication);
            Ok(())
        }
    }

    struct Bench {
        clock: ManualClock,
        ctx: Arc<AcquisitionContext<ManualClock>>,
        sensor: SimulatedSensor,
        recorder: Recorder,
        lights: Lights,
    }

    type Machine<'a> = Acquisition<&'a mut SimulatedSensor, &'a mut Recorder, &'a mut Lights, ManualClock>;

    impl Bench {
        fn new() -> Self {
            let clock = ManualClock::new();
            let ctx = Arc::new(AcquisitionContext::new(clock.clone()));
            Self {
                clock,
                ctx,
                sensor: SimulatedSensor::new(),
                recorder: Recorder::default(),
                lights: Lights::default(),
            }
        }

        fn machine(&mut self, timing: Timing) -> (Machine<'_>, &ManualClock) {
            let acq = Acquisition::new(
                &mut self.sensor,
                &mut self.recorder,
                &mut self.lights,
                Arc::clone(&self.ctx),
                timing,
            );
            (acq, &self.clock)
        }

        /// Readings reported after the collection window opened.
        fn collected(&self) -> Vec<Reading> {
            self.recorder
                .events
                .iter()
                .skip_while(|e| !matches!(e, ReportEvent::CollectionStarted { .. }))
                .filter_map(|e| match e {
                    ReportEvent::Reading(r) => Some(*r),
                    _ => None,
                })
                .collect()
        }

        fn count(&self, wanted: ReportEvent) -> usize {
            self.recorder.events.iter().filter(|e| **e == wanted).count()
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// Startup, then an arm edge at clock zero.
    fn armed(acq: &mut Machine<'_>) {
        acq.startup().unwrap();
        acq.context().on_arm_edge();
        acq.step().unwrap();
        assert_eq!(acq.state(), AcquisitionState::Collecting);
    }

    #[test]
    fn arm_edge_in_idle_starts_collection_at_time_zero() {
        let mut bench = Bench::new();
        let (mut acq, clock) = bench.machine(Timing::default());
        clock.set(ms(0));
        acq.startup().unwrap();
        assert_eq!(acq.state(), AcquisitionState::Idle);

        acq.context().on_arm_edge();
        acq.step().unwrap();

        assert_eq!(acq.state(), AcquisitionState::Collecting);
        assert!(acq.context().timer().is_running());
        assert_eq!(acq.context().timer().read(), Duration::ZERO);
        drop(acq);
        assert_eq!(bench.count(ReportEvent::CollectionStarted { full_scale_g: 4 }), 1);
        assert_eq!(
            bench.lights.shown,
            vec![Indication::Off, Indication::Waiting, Indication::Busy, Indication::Busy]
        );
    }

    #[test]
    fn every_edge_inside_the_window_yields_one_reading_in_order() {
        let mut bench = Bench::new();
        let (mut acq, clock) = bench.machine(Timing::default());
        armed(&mut acq);

        for k in 1..=199u64 {
            clock.set(ms(5 * k));
            acq.context().on_data_ready_edge();
            clock.advance(Duration::from_micros(200));
            acq.step().unwrap();
            assert_eq!(acq.state(), AcquisitionState::Collecting);
        }

        // Past the window: the edge is ignored and the machine is done.
        clock.set(ms(1005));
        acq.context().on_data_ready_edge();
        acq.step().unwrap();
        assert_eq!(acq.state(), AcquisitionState::Done);
        acq.step().unwrap();
        acq.step().unwrap();
        drop(acq);

        let readings = bench.collected();
        assert_eq!(readings.len(), 199);
        for (k, reading) in (1..=199u32).zip(&readings) {
            assert_eq!(reading.timestamp_us, 5_000 * k);
        }
        assert_eq!(bench.count(ReportEvent::CollectionComplete), 1);
        assert_eq!(bench.count(ReportEvent::Heartbeat), 2);
        assert_eq!(bench.lights.shown.last(), Some(&Indication::Complete));
        // startup diagnostic + arm drain + one per edge
        assert_eq!(bench.sensor.reads(), 2 + 199);
    }

    #[test]
    fn two_edges_between_iterations_report_one_sample_with_the_later_time() {
        let mut bench = Bench::new();
        let (mut acq, clock) = bench.machine(Timing::default());
        armed(&mut acq);

        clock.set(ms(100));
        acq.context().on_data_ready_edge();
        clock.set(Duration::from_micros(100_100));
        acq.context().on_data_ready_edge();
        clock.set(Duration::from_micros(100_400));
        acq.step().unwrap();
        acq.step().unwrap();
        drop(acq);

        let readings = bench.collected();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].timestamp_us, 100_100);
    }

    #[test]
    fn without_an_arm_edge_the_machine_stays_idle() {
        let mut bench = Bench::new();
        let (mut acq, clock) = bench.machine(Timing::default());
        acq.startup().unwrap();

        for _ in 0..1_000 {
            acq.context().on_data_ready_edge();
            let wait = acq.step().unwrap();
            clock.advance(wait);
            assert_eq!(acq.state(), AcquisitionState::Idle);
        }
        assert!(!acq.context().timer().is_running());
        drop(acq);

        assert_eq!(bench.sensor.reads(), 1);
        assert!(bench.collected().is_empty());
        assert_eq!(bench.lights.shown, vec![Indication::Off, Indication::Waiting]);
    }

    #[test]
    fn several_arm_edges_in_idle_start_one_collection() {
        let mut bench = Bench::new();
        let (mut acq, clock) = bench.machine(Timing::default());
        acq.startup().unwrap();

        // Contact bounce: a burst of edges before the loop next looks.
        for us in [0, 80, 150, 900] {
            clock.set_us(us);
            acq.context().on_arm_edge();
        }
        acq.step().unwrap();
        assert_eq!(acq.state(), AcquisitionState::Collecting);
        assert!(!acq.context().take_arm());

        clock.set(ms(20));
        acq.step().unwrap();
        assert_eq!(acq.state(), AcquisitionState::Collecting);
        assert_eq!(acq.context().timer().read(), ms(20) - Duration::from_micros(900));
        drop(acq);

        assert_eq!(bench.count(ReportEvent::CollectionStarted { full_scale_g: 4 }), 1);
        // startup diagnostic + one arm drain
        assert_eq!(bench.sensor.reads(), 2);
        assert_eq!(
            bench.lights.shown,
            vec![Indication::Off, Indication::Waiting, Indication::Busy, Indication::Busy]
        );
    }

    #[test]
    fn arm_edges_after_idle_are_ignored() {
        let mut bench = Bench::new();
        let (mut acq, clock) = bench.machine(Timing::default());
        armed(&mut acq);

        clock.set(ms(400));
        acq.context().on_arm_edge();
        acq.step().unwrap();
        assert_eq!(acq.state(), AcquisitionState::Collecting);
        assert!(acq.context().timer().read() >= ms(400));

        clock.set(ms(1200));
        acq.step().unwrap();
        assert_eq!(acq.state(), AcquisitionState::Done);

        acq.context().on_arm_edge();
        for _ in 0..5 {
            acq.step().unwrap();
            assert_eq!(acq.state(), AcquisitionState::Done);
        }
        drop(acq);

        assert_eq!(bench.count(ReportEvent::CollectionStarted { full_scale_g: 4 }), 1);
        assert_eq!(bench.count(ReportEvent::CollectionComplete), 1);
    }

    #[test]
    fn window_boundary_is_inclusive_and_expiry_is_prompt() {
        let mut bench = Bench::new();
        let (mut acq, clock) = bench.machine(Timing::default());
        armed(&mut acq);

        // Edge and loop iteration exactly at the window length.
        clock.set(ms(1000));
        acq.context().on_data_ready_edge();
        acq.step().unwrap();
        assert_eq!(acq.state(), AcquisitionState::Collecting);

        // First iteration strictly past it.
        clock.advance(Duration::from_micros(1));
        acq.step().unwrap();
        assert_eq!(acq.state(), AcquisitionState::Done);
        drop(acq);

        let readings = bench.collected();
        assert!(readings.len() <= 1);
        assert!(readings.iter().all(|r| r.timestamp_us == 1_000_000));
    }

    #[test]
    fn irregular_edges_give_non_decreasing_timestamps() {
        let mut bench = Bench::new();
        let (mut acq, clock) = bench.machine(Timing::default());
        armed(&mut acq);

        // Deterministic LCG: gaps between 0 and ~1.3 ms, one or two edges per
        // iteration.
        let mut seed: u32 = 0x2545_F491;
        let mut next = || {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            seed >> 16
        };
        let mut now_us = 0u64;
        let mut edges = 0;
        while now_us < 990_000 {
            for _ in 0..=(next() % 2) {
                now_us += u64::from(next() % 1_300);
                clock.set_us(now_us);
                acq.context().on_data_ready_edge();
                edges += 1;
            }
            now_us += 500;
            clock.set_us(now_us);
            acq.step().unwrap();
        }
        drop(acq);

        let readings = bench.collected();
        assert!(!readings.is_empty());
        assert!(readings.len() <= edges);
        assert!(readings.windows(2).all(|w| w[0].timestamp_us <= w[1].timestamp_us));
    }

    /// Drive `run` with a pace that advances the clock and fires data-ready
    /// edges at 200 Hz, stopping after a few heartbeats.
    fn run_at_200hz(timing: Timing) -> Bench {
        let mut bench = Bench::new();
        let period = ms(5);
        let (mut acq, clock) = bench.machine(timing);
        let clock = clock.clone();
        let ctx = Arc::clone(acq.context());
        acq.startup().unwrap();
        ctx.on_arm_edge();

        let mut next_edge = period;
        let mut now = Duration::ZERO;
        let mut heartbeats = 0;
        let stopped = acq.run(|wait| {
            if wait == timing.heartbeat {
                heartbeats += 1;
                if heartbeats == 3 {
                    anyhow::bail!("stop");
                }
            }
            let target = now + wait;
            while next_edge <= target {
                clock.set(next_edge);
                ctx.on_data_ready_edge();
                next_edge += period;
            }
            now = target;
            clock.set(now);
            Ok(())
        });
        assert_eq!(stopped.unwrap_err().to_string(), "stop");
        assert_eq!(acq.state(), AcquisitionState::Done);
        drop(acq);
        bench
    }

    #[test]
    fn run_within_timing_margin_reports_every_edge() {
        let bench = run_at_200hz(Timing::default());
        let readings = bench.collected();

        assert_eq!(readings.len(), 200);
        for (k, reading) in (1..=200u32).zip(&readings) {
            assert_eq!(reading.timestamp_us, 5_000 * k);
        }
    }

    #[test]
    fn run_violating_timing_margin_drops_but_never_reorders() {
        let timing = Timing { collect_poll: ms(12), ..Timing::default() };
        let bench = run_at_200hz(timing);
        let readings = bench.collected();

        assert!(!readings.is_empty());
        assert!(readings.len() < 200);
        assert!(readings.windows(2).all(|w| w[0].timestamp_us < w[1].timestamp_us));
        assert!(readings.iter().all(|r| r.timestamp_us % 5_000 == 0));
        assert!(readings.iter().all(|r| r.timestamp_us <= 1_000_000));
    }
}
