use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, trace};

use crate::diff::{self, Classification};
use crate::score::{Clock, ScoreState, ScoreTracker, SystemClock};
use crate::splitter::Passage;

/// Lifecycle of a typing session
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum SessionStatus {
    Idle,
    Active,
    Suspended,
    Completed,
}

/// The key that produced an input-changed event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Backspace,
    Enter,
    Other,
}

/// What a single input-changed event produced
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputOutcome {
    pub classifications: Vec<Classification>,
    pub completed: bool,
    pub full_reset: bool,
    /// Set exactly once, on the event that completes the session
    pub final_score: Option<ScoreState>,
}

/// Session shared between the input path and the focus probe
pub type SharedSession<C = SystemClock> = Arc<Mutex<Session<C>>>;

/// Owns the passage, the confirmed input length, the score tracker and the
/// session status, and routes every input event through them.
#[derive(Debug)]
pub struct Session<C: Clock = SystemClock> {
    passage: Passage,
    confirmed_len: usize,
    status: SessionStatus,
    editable: bool,
    tracker: ScoreTracker<C>,
}

impl Default for Session<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl Session<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock> Session<C> {
    /// A session with no passage loaded; input is ignored until one is
    pub fn with_clock(clock: C) -> Self {
        Self {
            passage: Passage::default(),
            confirmed_len: 0,
            status: SessionStatus::Idle,
            editable: false,
            tracker: ScoreTracker::with_clock(clock),
        }
    }

    pub fn into_shared(self) -> SharedSession<C> {
        Arc::new(Mutex::new(self))
    }

    pub fn load_passage(&mut self, text: impl Into<String>) {
        self.passage = Passage::new(text);
        info!(units = self.passage.len(), "passage loaded");
        self.reset();
    }

    /// Start the current passage over
    pub fn restart(&mut self) {
        info!("session restarted");
        self.reset();
    }

    fn reset(&mut self) {
        self.editable = true;
        self.confirmed_len = 0;
        self.status = SessionStatus::Idle;
        self.tracker.re_init();
    }

    pub fn on_input_changed(&mut self, current_input: &str, key: KeyAction) -> InputOutcome {
        if !self.editable || self.status == SessionStatus::Completed {
            trace!(status = %self.status, "input ignored");
            return InputOutcome::default();
        }

        debug_assert!(
            self.status != SessionStatus::Idle || self.confirmed_len == 0,
            "idle session with confirmed input"
        );

        if self.status != SessionStatus::Active {
            debug!(from = %self.status, "scoring started");
            self.tracker.start();
            self.status = SessionStatus::Active;
        }

        self.account_key(key);

        let diff = diff::classify(&self.passage, self.confirmed_len, current_input);
        debug!(
            previous_len = diff.previous_len,
            new_len = diff.new_len,
            "input length changed"
        );

        if diff.is_unchanged() {
            return InputOutcome::default();
        }

        self.tracker.add_characters(diff.added());

        let mut outcome = InputOutcome {
            classifications: diff.results,
            ..InputOutcome::default()
        };

        if diff.full_reset {
            info!("input cleared, session reset");
            self.reset();
            outcome.full_reset = true;
            return outcome;
        }

        self.confirmed_len = diff.new_len;
        if diff.completed {
            let score = self.finish();
            outcome.completed = true;
            outcome.final_score = Some(score);
        }
        outcome
    }

    fn account_key(&mut self, key: KeyAction) {
        self.tracker.inc_keystrokes();
        match key {
            KeyAction::Backspace => self.tracker.inc_backspace_count(),
            KeyAction::Enter => self.tracker.inc_enter_count(),
            KeyAction::Other => {}
        }
    }

    fn finish(&mut self) -> ScoreState {
        self.tracker.suspend();
        self.status = SessionStatus::Completed;
        self.editable = false;

        let score = self.tracker.snapshot();
        info!(
            keystrokes = score.keystrokes,
            characters = score.characters_typed,
            elapsed_ms = score.elapsed.as_millis() as u64,
            "session completed"
        );
        score
    }

    /// Pause scoring while the user is away from the input
    pub fn on_focus_lost(&mut self) {
        if self.status == SessionStatus::Active {
            self.tracker.suspend();
            self.status = SessionStatus::Suspended;
            info!("focus lost, scoring suspended");
        }
    }

    /// Focus coming back does not resume scoring; the next input event does.
    /// Returns whether the session is waiting on that input.
    pub fn on_focus_regained(&self) -> bool {
        let waiting = self.status == SessionStatus::Suspended;
        if waiting {
            debug!("focus regained, waiting for input to resume");
        }
        waiting
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn passage(&self) -> &Passage {
        &self.passage
    }

    pub fn confirmed_len(&self) -> usize {
        self.confirmed_len
    }

    pub fn snapshot(&self) -> ScoreState {
        self.tracker.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::Outcome;
    use crate::score::tests::ManualClock;
    use assert_matches::assert_matches;
    use std::time::Duration;

    fn loaded(text: &str) -> Session {
        let mut session = Session::new();
        session.load_passage(text);
        session
    }

    fn outcomes(outcome: &InputOutcome) -> Vec<(usize, Outcome)> {
        outcome
            .classifications
            .iter()
            .map(|c| (c.index, c.outcome))
            .collect()
    }

    #[test]
    fn test_new_session_ignores_input() {
        let mut session = Session::new();
        let outcome = session.on_input_changed("a", KeyAction::Other);

        assert_eq!(outcome, InputOutcome::default());
        assert_eq!(session.status(), SessionStatus::Idle);
        assert!(!session.is_editable());
        assert_eq!(session.snapshot().keystrokes, 0);
    }

    #[test]
    fn test_load_passage_is_idle_and_editable() {
        let session = loaded("cat");
        assert_eq!(session.status(), SessionStatus::Idle);
        assert!(session.is_editable());
        assert_eq!(session.passage().len(), 3);
        assert_eq!(session.confirmed_len(), 0);
    }

    #[test]
    fn test_cat_scenario() {
        let mut session = loaded("cat");

        let o = session.on_input_changed("c", KeyAction::Other);
        assert_eq!(outcomes(&o), vec![(0, Outcome::Correct)]);
        assert_eq!(session.snapshot().characters_typed, 1);
        assert_eq!(session.status(), SessionStatus::Active);

        let o = session.on_input_changed("ca", KeyAction::Other);
        assert_eq!(outcomes(&o), vec![(1, Outcome::Correct)]);
        assert_eq!(session.snapshot().characters_typed, 2);

        let o = session.on_input_changed("cat", KeyAction::Other);
        assert_eq!(outcomes(&o), vec![(2, Outcome::Correct)]);
        assert!(o.completed);
        assert_eq!(session.status(), SessionStatus::Completed);
        assert_matches!(o.final_score, Some(score) if score.characters_typed == 3 && score.keystrokes == 3);
    }

    #[test]
    fn test_typo_at_passage_end_still_completes() {
        let mut session = loaded("cat");
        session.on_input_changed("c", KeyAction::Other);
        session.on_input_changed("ca", KeyAction::Other);

        let o = session.on_input_changed("cax", KeyAction::Other);
        assert_eq!(outcomes(&o), vec![(2, Outcome::Incorrect)]);
        // reaching the passage length completes even with a typo
        assert!(o.completed);
        assert_eq!(session.confirmed_len(), 3);
    }

    #[test]
    fn test_backspace_resets_position_and_stays_active() {
        let mut session = loaded("cats");
        session.on_input_changed("cax", KeyAction::Other);

        let o = session.on_input_changed("ca", KeyAction::Backspace);
        assert_eq!(outcomes(&o), vec![(2, Outcome::Reset)]);
        assert_eq!(session.status(), SessionStatus::Active);
        assert_eq!(session.confirmed_len(), 2);

        let score = session.snapshot();
        assert_eq!(score.backspace_count, 1);
        assert_eq!(score.keystrokes, 2);
        assert_eq!(score.characters_typed, 3);
    }

    #[test]
    fn test_enter_is_counted() {
        let mut session = loaded("a\nb");
        session.on_input_changed("a", KeyAction::Other);
        let o = session.on_input_changed("a\n", KeyAction::Enter);

        assert_eq!(outcomes(&o), vec![(1, Outcome::Correct)]);
        assert_eq!(session.snapshot().enter_count, 1);
    }

    #[test]
    fn test_unchanged_length_still_counts_keystroke() {
        let mut session = loaded("你好");
        session.on_input_changed("", KeyAction::Other);

        assert_eq!(session.status(), SessionStatus::Active);
        assert_eq!(session.snapshot().keystrokes, 1);
        assert_eq!(session.snapshot().characters_typed, 0);
    }

    #[test]
    fn test_clearing_input_resets_session() {
        let mut session = loaded("cat");
        session.on_input_changed("c", KeyAction::Other);
        session.on_input_changed("cx", KeyAction::Other);

        let o = session.on_input_changed("", KeyAction::Backspace);

        assert!(o.full_reset);
        assert!(!o.completed);
        assert_eq!(outcomes(&o), vec![(0, Outcome::Reset), (1, Outcome::Reset)]);
        assert_eq!(session.status(), SessionStatus::Idle);
        assert_eq!(session.confirmed_len(), 0);
        assert_eq!(session.snapshot(), ScoreState::default());
        assert!(session.is_editable());

        let o = session.on_input_changed("c", KeyAction::Other);
        assert_eq!(outcomes(&o), vec![(0, Outcome::Correct)]);
        assert_eq!(session.status(), SessionStatus::Active);
    }

    #[test]
    fn test_completed_session_ignores_input() {
        let mut session = loaded("hi");
        session.on_input_changed("hi", KeyAction::Other);
        let before = session.snapshot();

        let o = session.on_input_changed("hi!", KeyAction::Other);

        assert_eq!(o, InputOutcome::default());
        assert_eq!(session.confirmed_len(), 2);
        assert_eq!(session.snapshot(), before);
        assert_eq!(session.status(), SessionStatus::Completed);
        assert!(!session.is_editable());
    }

    #[test]
    fn test_empty_passage_completes_on_first_input() {
        let mut session = loaded("");
        let o = session.on_input_changed("x", KeyAction::Other);

        assert!(o.completed);
        assert_eq!(outcomes(&o), vec![(0, Outcome::Incorrect)]);
        assert_eq!(session.status(), SessionStatus::Completed);
    }

    #[test]
    fn test_focus_lost_suspends_then_input_resumes() {
        let mut session = loaded("cats");
        session.on_input_changed("c", KeyAction::Other);
        session.on_input_changed("ca", KeyAction::Other);

        session.on_focus_lost();
        assert_eq!(session.status(), SessionStatus::Suspended);
        assert!(session.on_focus_regained());
        assert_eq!(session.status(), SessionStatus::Suspended);

        session.on_input_changed("cat", KeyAction::Other);
        assert_eq!(session.status(), SessionStatus::Active);

        let score = session.snapshot();
        assert_eq!(score.keystrokes, 3);
        assert_eq!(score.characters_typed, 3);
    }

    #[test]
    fn test_focus_lost_outside_active_is_noop() {
        let mut session = loaded("cat");
        session.on_focus_lost();
        assert_eq!(session.status(), SessionStatus::Idle);
        assert!(!session.on_focus_regained());

        session.on_input_changed("cat", KeyAction::Other);
        session.on_focus_lost();
        assert_eq!(session.status(), SessionStatus::Completed);
    }

    #[test]
    fn test_suspended_time_is_not_scored() {
        let clock = ManualClock::new();
        let mut session = Session::with_clock(clock.clone());
        session.load_passage("cats");

        session.on_input_changed("c", KeyAction::Other);
        clock.advance(Duration::from_secs(2));
        session.on_focus_lost();
        clock.advance(Duration::from_secs(60));
        session.on_input_changed("ca", KeyAction::Other);
        clock.advance(Duration::from_secs(1));

        assert_eq!(session.snapshot().elapsed, Duration::from_secs(3));
    }

    #[test]
    fn test_final_score_freezes_elapsed() {
        let clock = ManualClock::new();
        let mut session = Session::with_clock(clock.clone());
        session.load_passage("ab");

        session.on_input_changed("a", KeyAction::Other);
        clock.advance(Duration::from_secs(5));
        let o = session.on_input_changed("ab", KeyAction::Other);
        clock.advance(Duration::from_secs(30));

        assert_eq!(o.final_score.map(|s| s.elapsed), Some(Duration::from_secs(5)));
        assert_eq!(session.snapshot().elapsed, Duration::from_secs(5));
    }

    #[test]
    fn test_restart_keeps_passage() {
        let mut session = loaded("hi");
        session.on_input_changed("hi", KeyAction::Other);

        session.restart();

        assert_eq!(session.status(), SessionStatus::Idle);
        assert_eq!(session.passage().as_str(), "hi");
        assert_eq!(session.snapshot(), ScoreState::default());
        assert!(session.is_editable());
    }

    #[test]
    fn test_load_passage_from_any_state() {
        let mut session = loaded("abc");
        session.on_input_changed("a", KeyAction::Other);
        session.on_focus_lost();

        session.load_passage("xyz");

        assert_eq!(session.status(), SessionStatus::Idle);
        assert_eq!(session.passage().as_str(), "xyz");
        assert_eq!(session.snapshot().keystrokes, 0);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(SessionStatus::Suspended.to_string(), "Suspended");
    }
}
