use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::config::Config;
use crate::diff::Outcome;
use crate::passages::PassageSource;
use crate::probe::FocusFlag;
use crate::runtime::AppEvent;
use crate::score::ScoreState;
use crate::session::{InputOutcome, KeyAction, Session, SharedSession};

/// Render state of one passage position
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mark {
    Pending,
    Correct,
    Incorrect,
}

/// What the event loop should do after an event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// The typing surface: owns the input buffer and the per-position marks the
/// renderer paints, and feeds every edit to the shared session.
#[derive(Debug)]
pub struct App {
    pub session: SharedSession,
    pub input: String,
    pub marks: Vec<Mark>,
    pub focus: FocusFlag,
    pub config: Config,
    source: PassageSource,
    finished: Vec<ScoreState>,
    /// Focus is back on a suspended session that has not seen input yet
    awaiting_resume: bool,
}

impl App {
    pub fn new(source: PassageSource, config: Config) -> Self {
        let mut app = Self {
            session: Session::new().into_shared(),
            input: String::new(),
            marks: Vec::new(),
            focus: FocusFlag::default(),
            config,
            source,
            finished: Vec::new(),
            awaiting_resume: false,
        };
        app.next_passage();
        app
    }

    pub fn load(&mut self, text: impl Into<String>) {
        let mut session = self.session.lock();
        session.load_passage(text);
        self.input.clear();
        self.marks = vec![Mark::Pending; session.passage().len()];
        self.awaiting_resume = false;
    }

    pub fn restart(&mut self) {
        self.session.lock().restart();
        self.input.clear();
        self.marks.fill(Mark::Pending);
        self.awaiting_resume = false;
    }

    pub fn next_passage(&mut self) {
        let current = self.session.lock().passage().as_str().to_string();
        let text = self
            .source
            .next_passage(&mut rand::thread_rng(), Some(current.as_str()));
        self.load(text);
    }

    pub fn awaiting_resume(&self) -> bool {
        self.awaiting_resume
    }

    /// Scores of every session completed so far, oldest first
    pub fn finished(&self) -> &[ScoreState] {
        &self.finished
    }

    pub fn type_char(&mut self, c: char) -> InputOutcome {
        self.edit(KeyAction::Other, |input| input.push(c))
    }

    /// Several codepoints arriving in one event
    pub fn commit_text(&mut self, text: &str) -> InputOutcome {
        self.edit(KeyAction::Other, |input| input.push_str(text))
    }

    pub fn backspace(&mut self) -> InputOutcome {
        self.edit(KeyAction::Backspace, |input| {
            input.pop();
        })
    }

    pub fn enter(&mut self) -> InputOutcome {
        self.edit(KeyAction::Enter, |input| input.push('\n'))
    }

    /// A key that leaves the input as it is (arrows, Home, Delete) still
    /// counts as a keystroke
    pub fn other_key(&mut self) -> InputOutcome {
        self.edit(KeyAction::Other, |_| {})
    }

    fn edit(&mut self, action: KeyAction, change: impl FnOnce(&mut String)) -> InputOutcome {
        let outcome = {
            let mut session = self.session.lock();
            if !session.is_editable() {
                return InputOutcome::default();
            }
            change(&mut self.input);
            session.on_input_changed(&self.input, action)
        };
        self.awaiting_resume = false;
        self.apply(&outcome);
        outcome
    }

    fn apply(&mut self, outcome: &InputOutcome) {
        for c in &outcome.classifications {
            // positions past the passage end have nothing to paint
            if let Some(mark) = self.marks.get_mut(c.index) {
                *mark = match c.outcome {
                    Outcome::Correct => Mark::Correct,
                    Outcome::Incorrect => Mark::Incorrect,
                    Outcome::Reset => Mark::Pending,
                };
            }
        }

        if outcome.full_reset {
            self.input.clear();
            self.marks.fill(Mark::Pending);
        }

        if let Some(score) = outcome.final_score {
            debug!(sessions = self.finished.len() + 1, "score recorded");
            self.finished.push(score);
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Control {
        match event {
            AppEvent::Key(key) => return self.on_key(key),
            AppEvent::Paste(text) => {
                self.commit_text(&text);
            }
            AppEvent::FocusGained => {
                self.focus.set(true);
                self.awaiting_resume = self.session.lock().on_focus_regained();
            }
            AppEvent::FocusLost => {
                self.focus.set(false);
                self.awaiting_resume = false;
            }
            AppEvent::Resize | AppEvent::Tick => {}
        }
        Control::Continue
    }

    fn on_key(&mut self, key: KeyEvent) -> Control {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => return Control::Quit,
                KeyCode::Char('r') => self.restart(),
                KeyCode::Char('n') => self.next_passage(),
                _ => {}
            }
            return Control::Continue;
        }

        match key.code {
            KeyCode::Esc => return Control::Quit,
            KeyCode::Backspace => {
                self.backspace();
            }
            KeyCode::Enter => {
                self.enter();
            }
            KeyCode::Tab => {
                self.type_char('\t');
            }
            KeyCode::Char(c) => {
                self.type_char(c);
            }
            _ => {
                self.other_key();
            }
        }
        Control::Continue
    }
}
