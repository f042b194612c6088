use serde::Serialize;
use std::fmt::Debug;
use std::time::{Duration, Instant};

/// Source of monotonic time for elapsed-time accounting
pub trait Clock: Debug + Send + 'static {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Read-only copy of the counters of a session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScoreState {
    pub keystrokes: u64,
    pub characters_typed: u64,
    pub backspace_count: u64,
    pub enter_count: u64,
    /// Reserved; nothing accumulates errors yet.
    pub error_count: u64,
    pub elapsed: Duration,
}

impl ScoreState {
    /// Characters typed per minute of active time
    pub fn chars_per_minute(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.characters_typed as f64 * 60.0 / secs
        } else {
            0.0
        }
    }

    /// Average keystrokes spent per character typed
    pub fn keystrokes_per_char(&self) -> f64 {
        if self.characters_typed > 0 {
            self.keystrokes as f64 / self.characters_typed as f64
        } else {
            0.0
        }
    }
}

/// Cumulative counters and active-time accounting for one session.
///
/// The tracker never gates its own increments; callers only feed it while the
/// session is active.
#[derive(Debug)]
pub struct ScoreTracker<C: Clock = SystemClock> {
    counters: ScoreState,
    running_since: Option<Instant>,
    clock: C,
}

impl Default for ScoreTracker<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreTracker<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock> ScoreTracker<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            counters: ScoreState::default(),
            running_since: None,
            clock,
        }
    }

    /// Begin or resume elapsed-time accrual
    pub fn start(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(self.clock.now());
        }
    }

    /// Zero every counter and stop the clock
    pub fn re_init(&mut self) {
        self.counters = ScoreState::default();
        self.running_since = None;
    }

    /// Stop elapsed-time accrual, keeping the counters
    pub fn suspend(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.counters.elapsed += self.clock.now().saturating_duration_since(since);
        }
    }

    pub fn inc_keystrokes(&mut self) {
        self.counters.keystrokes += 1;
    }

    pub fn inc_backspace_count(&mut self) {
        self.counters.backspace_count += 1;
    }

    pub fn inc_enter_count(&mut self) {
        self.counters.enter_count += 1;
    }

    pub fn add_characters(&mut self, n: usize) {
        self.counters.characters_typed += n as u64;
    }

    pub fn is_active(&self) -> bool {
        self.running_since.is_some()
    }

    /// Counters as of now, including time accrued in the current stretch
    pub fn snapshot(&self) -> ScoreState {
        let mut state = self.counters;
        if let Some(since) = self.running_since {
            state.elapsed += self.clock.now().saturating_duration_since(since);
        }
        state
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Clock that only moves when told to
    #[derive(Clone, Debug)]
    pub(crate) struct ManualClock {
        base: Instant,
        offset: Arc<Mutex<Duration>>,
    }

    impl ManualClock {
        pub(crate) fn new() -> Self {
            Self {
                base: Instant::now(),
                offset: Arc::new(Mutex::new(Duration::ZERO)),
            }
        }

        pub(crate) fn advance(&self, by: Duration) {
            *self.offset.lock() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.base + *self.offset.lock()
        }
    }

    #[test]
    fn test_new_tracker_is_zeroed_and_inactive() {
        let tracker = ScoreTracker::new();
        assert!(!tracker.is_active());
        assert_eq!(tracker.snapshot(), ScoreState::default());
    }

    #[test]
    fn test_counters_increment() {
        let mut tracker = ScoreTracker::new();
        tracker.start();
        tracker.inc_keystrokes();
        tracker.inc_keystrokes();
        tracker.inc_backspace_count();
        tracker.inc_enter_count();
        tracker.add_characters(3);

        let s = tracker.snapshot();
        assert_eq!(s.keystrokes, 2);
        assert_eq!(s.backspace_count, 1);
        assert_eq!(s.enter_count, 1);
        assert_eq!(s.characters_typed, 3);
        assert_eq!(s.error_count, 0);
    }

    #[test]
    fn test_increments_do_not_fail_while_inactive() {
        let mut tracker = ScoreTracker::new();
        tracker.inc_keystrokes();
        tracker.add_characters(0);
        assert_eq!(tracker.snapshot().keystrokes, 1);
        assert!(!tracker.is_active());
    }

    #[test]
    fn test_elapsed_accrues_only_while_running() {
        let clock = ManualClock::new();
        let mut tracker = ScoreTracker::with_clock(clock.clone());

        clock.advance(Duration::from_secs(5));
        assert_eq!(tracker.snapshot().elapsed, Duration::ZERO);

        tracker.start();
        clock.advance(Duration::from_secs(2));
        assert_eq!(tracker.snapshot().elapsed, Duration::from_secs(2));

        tracker.suspend();
        clock.advance(Duration::from_secs(10));
        assert_eq!(tracker.snapshot().elapsed, Duration::from_secs(2));

        tracker.start();
        clock.advance(Duration::from_secs(1));
        assert_eq!(tracker.snapshot().elapsed, Duration::from_secs(3));
    }

    #[test]
    fn test_start_is_idempotent() {
        let clock = ManualClock::new();
        let mut tracker = ScoreTracker::with_clock(clock.clone());

        tracker.start();
        clock.advance(Duration::from_secs(1));
        tracker.start();
        clock.advance(Duration::from_secs(1));

        assert_eq!(tracker.snapshot().elapsed, Duration::from_secs(2));
    }

    #[test]
    fn test_suspend_when_idle_is_noop() {
        let mut tracker = ScoreTracker::new();
        tracker.suspend();
        tracker.suspend();
        assert!(!tracker.is_active());
        assert_eq!(tracker.snapshot(), ScoreState::default());
    }

    #[test]
    fn test_re_init_zeroes_everything() {
        let clock = ManualClock::new();
        let mut tracker = ScoreTracker::with_clock(clock.clone());
        tracker.start();
        tracker.inc_keystrokes();
        tracker.inc_enter_count();
        tracker.add_characters(7);
        clock.advance(Duration::from_secs(4));

        tracker.re_init();

        assert!(!tracker.is_active());
        assert_eq!(tracker.snapshot(), ScoreState::default());
    }

    #[test]
    fn test_derived_metrics() {
        let state = ScoreState {
            keystrokes: 30,
            characters_typed: 20,
            elapsed: Duration::from_secs(30),
            ..ScoreState::default()
        };

        assert_eq!(state.chars_per_minute(), 40.0);
        assert_eq!(state.keystrokes_per_char(), 1.5);
    }

    #[test]
    fn test_derived_metrics_zero_denominators() {
        let state = ScoreState::default();
        assert_eq!(state.chars_per_minute(), 0.0);
        assert_eq!(state.keystrokes_per_char(), 0.0);
    }
}
