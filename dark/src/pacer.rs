use std::time::{Duration, Instant};

/// Used when the monitor does not report a usable refresh rate.
pub const DEFAULT_REFRESH_HZ: u32 = 120;

/// Portion of the frame budget left to the spin loop. OS sleep wakes late by
/// up to its scheduling granularity, so the last stretch is spun instead.
const SPIN_MARGIN: Duration = Duration::from_millis(1);

/// Target frame duration for a refresh rate, guarding against a zero or
/// otherwise unusable detection result.
pub fn target_frame_time(refresh_hz: u32) -> Duration {
    let hz = if refresh_hz < 1 {
        DEFAULT_REFRESH_HZ
    } else {
        refresh_hz
    };

    Duration::from_secs(1) / hz
}

pub trait Clock {
    fn now(&self) -> Instant;
}

pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

pub trait CoarseSleep {
    fn sleep(&mut self, duration: Duration);
}

pub struct ThreadSleep;

impl CoarseSleep for ThreadSleep {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// What one `pace` call observed about the frame that just ended.
#[derive(Debug, Copy, Clone)]
pub struct FrameReport {
    /// Total frame time including the wait, never negative.
    pub elapsed: Duration,
    /// How far past the target the frame ran, if it overran.
    pub overrun: Option<Duration>,
}

/// Hybrid frame pacer: coarse sleep for most of the remaining budget, then a
/// spin wait on a high-resolution clock for the residual.
///
/// Overruns are absorbed, not caught up; the next frame simply starts late.
pub struct FramePacer<C = MonotonicClock, S = ThreadSleep> {
    target: Duration,
    granular: bool,
    clock: C,
    sleep: S,
    frame_start: Instant,
}

impl FramePacer {
    pub fn new(target: Duration) -> Self {
        Self::with_parts(target, true, MonotonicClock, ThreadSleep)
    }
}

impl<C: Clock, S: CoarseSleep> FramePacer<C, S> {
    /// `granular` controls whether the coarse sleep may be used at all; with
    /// it off the pacer spins the whole remainder.
    pub fn with_parts(target: Duration, granular: bool, clock: C, sleep: S) -> Self {
        let frame_start = clock.now();

        Self {
            target,
            granular,
            clock,
            sleep,
            frame_start,
        }
    }

    pub fn target(&self) -> Duration {
        self.target
    }

    /// Blocks until the current frame has used up its full time slot, or
    /// returns immediately if it already has.
    pub fn pace(&mut self) -> FrameReport {
        let mut elapsed = self.clock.now().saturating_duration_since(self.frame_start);

        let overrun = if elapsed < self.target {
            if self.granular {
                let remaining = self.target - elapsed;
                if remaining > SPIN_MARGIN {
                    self.sleep.sleep(remaining - SPIN_MARGIN);
                }
            }

            while elapsed < self.target {
                elapsed = self.clock.now().saturating_duration_since(self.frame_start);
            }

            None
        } else {
            Some(elapsed - self.target)
        };

        self.frame_start = self.clock.now();

        FrameReport { elapsed, overrun }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Deterministic time source shared between the test clock and sleep.
    /// Each `now` call advances it a little so spin loops terminate.
    #[derive(Clone)]
    struct TestTime {
        base: Instant,
        offset: Rc<Cell<Duration>>,
        tick: Duration,
    }

    impl TestTime {
        fn new(tick: Duration) -> Self {
            Self {
                base: Instant::now(),
                offset: Rc::new(Cell::new(Duration::ZERO)),
                tick,
            }
        }

        fn advance(&self, by: Duration) {
            self.offset.set(self.offset.get() + by);
        }
    }

    impl Clock for TestTime {
        fn now(&self) -> Instant {
            let now = self.offset.get();
            self.offset.set(now + self.tick);

            self.base + now
        }
    }

    struct TestSleep {
        time: TestTime,
        calls: Rc<RefCell<Vec<Duration>>>,
    }

    impl CoarseSleep for TestSleep {
        fn sleep(&mut self, duration: Duration) {
            self.calls.borrow_mut().push(duration);
            self.time.advance(duration);
        }
    }

    fn test_pacer(
        target: Duration,
        granular: bool,
        tick: Duration,
    ) -> (FramePacer<TestTime, TestSleep>, TestTime, Rc<RefCell<Vec<Duration>>>) {
        let time = TestTime::new(tick);
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sleep = TestSleep {
            time: time.clone(),
            calls: Rc::clone(&calls),
        };

        let pacer = FramePacer::with_parts(target, granular, time.clone(), sleep);

        (pacer, time, calls)
    }

    #[test]
    fn waits_out_a_short_frame() {
        let target = Duration::from_micros(8333);
        let (mut pacer, time, calls) = test_pacer(target, true, Duration::from_micros(100));

        // Simulated render work well under the budget.
        time.advance(Duration::from_millis(5));

        let report = pacer.pace();

        assert!(report.elapsed >= target);
        assert!(report.overrun.is_none());

        // One coarse sleep covering the remainder up to the spin margin.
        let calls = calls.borrow();
        assert_eq!(calls.len(), 1);
        assert!(calls[0] <= target - Duration::from_millis(5));
        assert!(calls[0] >= target - Duration::from_millis(5) - Duration::from_millis(2));
    }

    #[test]
    fn overrun_returns_immediately_without_sleeping() {
        let target = Duration::from_micros(8333);
        let (mut pacer, time, calls) = test_pacer(target, true, Duration::from_micros(100));

        time.advance(Duration::from_millis(12));

        let report = pacer.pace();

        let overrun = report.overrun.expect("frame overran the target");
        assert_eq!(overrun, report.elapsed - target);
        assert!(report.elapsed >= Duration::from_millis(12));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn spin_only_pacer_never_sleeps() {
        let target = Duration::from_millis(8);
        let (mut pacer, _time, calls) = test_pacer(target, false, Duration::from_micros(500));

        let report = pacer.pace();

        assert!(report.elapsed >= target);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn residual_under_margin_is_spun_not_slept() {
        let target = Duration::from_millis(8);
        let (mut pacer, time, calls) = test_pacer(target, true, Duration::from_micros(100));

        // Leave less than the 1ms spin margin remaining.
        time.advance(Duration::from_micros(7500));

        let report = pacer.pace();

        assert!(report.elapsed >= target);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn consecutive_frames_restart_the_budget() {
        let target = Duration::from_millis(8);
        let (mut pacer, time, _calls) = test_pacer(target, true, Duration::from_micros(100));

        time.advance(Duration::from_millis(2));
        let first = pacer.pace();
        assert!(first.overrun.is_none());

        // The second frame overruns on its own budget, not the first one's.
        time.advance(Duration::from_millis(9));
        let second = pacer.pace();
        assert!(second.overrun.is_some());
    }

    #[test]
    fn refresh_fallback_guards_division() {
        assert_eq!(target_frame_time(0), Duration::from_secs(1) / 120);
        assert_eq!(target_frame_time(60), Duration::from_secs(1) / 60);
        assert_eq!(target_frame_time(120), Duration::from_secs(1) / 120);
    }

    #[test]
    fn real_clock_smoke() {
        let target = Duration::from_millis(20);
        let mut pacer = FramePacer::new(target);

        let report = pacer.pace();

        assert!(report.elapsed >= target);
    }
}
